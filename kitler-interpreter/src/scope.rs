use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::value::ValueRef;

/// A lexical scope: a binding table plus an owning link to its parent.
/// Cloning a `Scope` clones the handle, not the table, so function values
/// can capture their defining scope and keep the whole chain alive.
#[derive(Debug, Clone, PartialEq)]
pub struct Scope {
    inner: Rc<RefCell<ScopeCore>>,
}

#[derive(Debug, PartialEq)]
struct ScopeCore {
    bindings: HashMap<Rc<str>, ValueRef>,
    parent: Option<Scope>,
}

impl Scope {
    pub fn new() -> Self {
        Scope {
            inner: Rc::new(RefCell::new(ScopeCore {
                bindings: HashMap::new(),
                parent: None,
            })),
        }
    }

    pub fn new_enclosed(parent: &Scope) -> Self {
        Scope {
            inner: Rc::new(RefCell::new(ScopeCore {
                bindings: HashMap::new(),
                parent: Some(parent.clone()),
            })),
        }
    }

    /// Binds `name` in this scope, shadowing any outer binding. Redeclaring
    /// a name in the same scope overwrites it in place.
    pub fn define(&self, name: Rc<str>, value: ValueRef) {
        self.inner.borrow_mut().bindings.insert(name, value);
    }

    pub fn get(&self, name: &str) -> Option<ValueRef> {
        let core = self.inner.borrow();
        match core.bindings.get(name) {
            Some(value) => Some(*value),
            None => core.parent.as_ref().and_then(|parent| parent.get(name)),
        }
    }

    /// Rebinds the nearest existing binding of `name`, walking outward.
    /// Returns false when the name is bound nowhere on the chain, in which
    /// case nothing happens.
    pub fn assign(&self, name: &str, value: ValueRef) -> bool {
        let mut core = self.inner.borrow_mut();
        if let Some(slot) = core.bindings.get_mut(name) {
            *slot = value;
            return true;
        }
        match &core.parent {
            Some(parent) => parent.assign(name, value),
            None => false,
        }
    }

    pub fn parent(&self) -> Option<Scope> {
        self.inner.borrow().parent.clone()
    }

    /// Snapshot of every value bound directly in this scope, for GC root
    /// marking.
    pub fn bindings(&self) -> Vec<ValueRef> {
        self.inner.borrow().bindings.values().copied().collect()
    }

    pub fn same_scope(&self, other: &Scope) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Default for Scope {
    fn default() -> Self {
        Scope::new()
    }
}
