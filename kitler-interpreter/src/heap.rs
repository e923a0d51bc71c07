use crate::scope::Scope;
use crate::value::{Value, ValueRef};

#[derive(Debug)]
struct Slot {
    value: Option<Value>,
    marked: bool,
}

/// Slab of runtime values with a free list and explicit mark-and-sweep
/// collection. Slots 0 through 2 hold interned null, true, and false; they
/// are permanent and handed out by the accessor methods instead of being
/// reallocated on every use.
#[derive(Debug)]
pub struct Heap {
    slots: Vec<Slot>,
    free: Vec<usize>,
    null: ValueRef,
    true_: ValueRef,
    false_: ValueRef,
}

impl Heap {
    pub fn new() -> Self {
        let mut heap = Heap {
            slots: Vec::new(),
            free: Vec::new(),
            null: ValueRef(0),
            true_: ValueRef(1),
            false_: ValueRef(2),
        };
        heap.null = heap.alloc(Value::Null);
        heap.true_ = heap.alloc(Value::Bool(true));
        heap.false_ = heap.alloc(Value::Bool(false));
        heap
    }

    pub fn alloc(&mut self, value: Value) -> ValueRef {
        match self.free.pop() {
            Some(index) => {
                self.slots[index] = Slot {
                    value: Some(value),
                    marked: false,
                };
                ValueRef(index)
            }
            None => {
                self.slots.push(Slot {
                    value: Some(value),
                    marked: false,
                });
                ValueRef(self.slots.len() - 1)
            }
        }
    }

    pub fn null(&self) -> ValueRef {
        self.null
    }

    pub fn bool(&self, value: bool) -> ValueRef {
        if value {
            self.true_
        } else {
            self.false_
        }
    }

    pub fn number(&mut self, value: f64) -> ValueRef {
        self.alloc(Value::Number(value))
    }

    pub fn string(&mut self, value: String) -> ValueRef {
        self.alloc(Value::Str(value))
    }

    /// Reads through a handle. A handle whose slot was swept reads as null;
    /// stale handles are possible because collection does not trace function
    /// closures.
    pub fn get(&self, value_ref: ValueRef) -> &Value {
        match self.slots[value_ref.0].value.as_ref() {
            Some(value) => value,
            None => self.slots[self.null.0]
                .value
                .as_ref()
                .expect("null singleton is never swept"),
        }
    }

    /// Number of occupied slots, interned singletons included.
    pub fn live_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.value.is_some()).count()
    }

    /// Marks everything reachable from `root`'s scope chain, then frees
    /// every unmarked slot. Callers pass the innermost live scope; parent
    /// links cover the rest of the chain.
    pub fn collect(&mut self, root: &Scope) {
        self.mark(self.null);
        self.mark(self.true_);
        self.mark(self.false_);

        let mut scope = Some(root.clone());
        while let Some(current) = scope {
            for value_ref in current.bindings() {
                self.mark(value_ref);
            }
            scope = current.parent();
        }

        for (index, slot) in self.slots.iter_mut().enumerate() {
            if slot.marked {
                slot.marked = false;
            } else if slot.value.take().is_some() {
                self.free.push(index);
            }
        }
    }

    /// Container values are traced through their elements. Function closures
    /// are deliberately not traced; values reachable only through a captured
    /// scope are reclaimed, and reading them later yields null.
    fn mark(&mut self, value_ref: ValueRef) {
        let slot = &mut self.slots[value_ref.0];
        if slot.marked || slot.value.is_none() {
            return;
        }
        slot.marked = true;

        let children: Vec<ValueRef> = match slot.value.as_ref() {
            Some(Value::List(elements)) => elements.clone(),
            Some(Value::Map(entries)) => entries.values().copied().collect(),
            _ => return,
        };
        for child in children {
            self.mark(child);
        }
    }
}

impl Default for Heap {
    fn default() -> Self {
        Heap::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interned_singletons() {
        let heap = Heap::new();
        assert_eq!(heap.get(heap.null()), &Value::Null);
        assert_eq!(heap.get(heap.bool(true)), &Value::Bool(true));
        assert_eq!(heap.get(heap.bool(false)), &Value::Bool(false));
        assert_eq!(heap.bool(true), heap.bool(true));
        assert_eq!(heap.live_count(), 3);
    }

    #[test]
    fn test_reachable_values_survive_collection() {
        let mut heap = Heap::new();
        let scope = Scope::new();
        let kept = heap.number(42.0);
        scope.define("kept".into(), kept);

        heap.collect(&scope);
        assert_eq!(heap.get(kept), &Value::Number(42.0));
    }

    #[test]
    fn test_unreachable_values_are_freed() {
        let mut heap = Heap::new();
        let scope = Scope::new();
        let lost = heap.string("garbage".to_owned());
        let before = heap.live_count();

        heap.collect(&scope);
        assert_eq!(heap.live_count(), before - 1);
        // swept slots read as null
        assert_eq!(heap.get(lost), &Value::Null);
    }

    #[test]
    fn test_collection_walks_the_scope_chain() {
        let mut heap = Heap::new();
        let outer = Scope::new();
        let inner = Scope::new_enclosed(&outer);
        let in_outer = heap.number(1.0);
        outer.define("a".into(), in_outer);
        let in_inner = heap.number(2.0);
        inner.define("b".into(), in_inner);

        heap.collect(&inner);
        assert_eq!(heap.get(in_outer), &Value::Number(1.0));
        assert_eq!(heap.get(in_inner), &Value::Number(2.0));
    }

    #[test]
    fn test_marking_traces_lists_and_maps() {
        let mut heap = Heap::new();
        let scope = Scope::new();

        let element = heap.number(7.0);
        let list = heap.alloc(Value::List(vec![element]));
        let entry = heap.string("deep".to_owned());
        let map = heap.alloc(Value::Map(
            [("key".to_owned(), entry)].into_iter().collect(),
        ));
        scope.define("list".into(), list);
        scope.define("map".into(), map);

        heap.collect(&scope);
        assert_eq!(heap.get(element), &Value::Number(7.0));
        assert_eq!(heap.get(entry), &Value::Str("deep".to_owned()));
    }

    #[test]
    fn test_freed_slots_are_reused() {
        let mut heap = Heap::new();
        let scope = Scope::new();
        let lost = heap.number(1.0);

        heap.collect(&scope);
        let reused = heap.number(2.0);
        assert_eq!(lost, reused);
        assert_eq!(heap.get(reused), &Value::Number(2.0));
    }
}
