pub mod builtins;
pub mod evaluator;
pub mod heap;
pub mod scope;
pub mod value;
