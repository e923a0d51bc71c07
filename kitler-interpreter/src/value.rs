use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use kitler_core::ast;

use crate::evaluator::Interpreter;
use crate::scope::Scope;

/// Handle into the [`crate::heap::Heap`]. All runtime values live in heap
/// slots; the evaluator only ever passes these indices around.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub struct ValueRef(pub(crate) usize);

#[derive(Debug, PartialEq, Clone)]
pub enum Value {
    Number(f64),
    Str(String),
    Bool(bool),
    Null,
    List(Vec<ValueRef>),
    Map(HashMap<String, ValueRef>),
    Function(Function),
    NativeFunction(NativeFunction),
    Sprite(SpriteData),
    Component(ComponentData),
}

#[derive(Clone)]
pub struct Function {
    pub name: Rc<str>,
    pub params: Rc<[Rc<str>]>,
    pub body: Rc<ast::Block>,
    pub closure: Scope,
}

impl PartialEq for Function {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.params, &other.params)
            && Rc::ptr_eq(&self.body, &other.body)
            && self.closure.same_scope(&other.closure)
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("name", &self.name)
            .field("params", &self.params)
            .field("body", &Rc::as_ptr(&self.body))
            .finish()
    }
}

pub type NativeFn = fn(&mut Interpreter, &[ValueRef]) -> ValueRef;

#[derive(Clone, Copy)]
pub struct NativeFunction {
    pub name: &'static str,
    pub func: NativeFn,
}

impl PartialEq for NativeFunction {
    fn eq(&self, other: &Self) -> bool {
        self.func as usize == other.func as usize
    }
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NativeFunction({})", self.name)
    }
}

/// Game-facing value payloads. No operation constructs these yet; they are
/// the runtime side of the reserved declaration forms.
#[derive(Debug, PartialEq, Clone, Default)]
pub struct SpriteData {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub velocity_x: f64,
    pub velocity_y: f64,
}

#[derive(Debug, PartialEq, Clone, Default)]
pub struct ComponentData {
    pub component_type: String,
}

impl Value {
    /// Numeric view used by arithmetic and comparisons. Values with no
    /// numeric representation read as zero.
    pub fn numeric_field(&self) -> f64 {
        match self {
            Value::Number(n) => *n,
            Value::Bool(b) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
            _ => 0.0,
        }
    }

    /// Boolean view used by conditions and logical operators. Only booleans
    /// and nonzero numbers read as true.
    pub fn boolean_field(&self) -> bool {
        match self {
            Value::Bool(b) => *b,
            Value::Number(n) => *n != 0.0,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_field() {
        assert_eq!(Value::Number(3.5).numeric_field(), 3.5);
        assert_eq!(Value::Bool(true).numeric_field(), 1.0);
        assert_eq!(Value::Bool(false).numeric_field(), 0.0);
        assert_eq!(Value::Str("7".to_owned()).numeric_field(), 0.0);
        assert_eq!(Value::Null.numeric_field(), 0.0);
    }

    #[test]
    fn test_boolean_field() {
        assert!(Value::Bool(true).boolean_field());
        assert!(!Value::Bool(false).boolean_field());
        assert!(Value::Number(2.0).boolean_field());
        assert!(!Value::Number(0.0).boolean_field());
        assert!(!Value::Str("true".to_owned()).boolean_field());
        assert!(!Value::Null.boolean_field());
    }
}
