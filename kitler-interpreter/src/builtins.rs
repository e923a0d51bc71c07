use crate::evaluator::Interpreter;
use crate::value::{NativeFunction, Value, ValueRef};

pub(crate) const BUILTINS: &[NativeFunction] = &[
    NativeFunction {
        name: "Console.Write",
        func: console_write,
    },
    NativeFunction {
        name: "Max",
        func: max,
    },
    NativeFunction {
        name: "Min",
        func: min,
    },
];

pub(crate) fn register_builtins(interpreter: &mut Interpreter) {
    for builtin in BUILTINS {
        let value_ref = interpreter.heap.alloc(Value::NativeFunction(*builtin));
        interpreter.globals.define(builtin.name.into(), value_ref);
    }
}

/// Writes its arguments separated by single spaces, followed by a newline.
fn console_write(interpreter: &mut Interpreter, args: &[ValueRef]) -> ValueRef {
    let rendered: Vec<String> = args
        .iter()
        .map(|arg| interpreter.display_value(*arg))
        .collect();
    interpreter.write_output(&rendered.join(" "));
    interpreter.heap.null()
}

fn max(interpreter: &mut Interpreter, args: &[ValueRef]) -> ValueRef {
    fold_numeric(interpreter, args, f64::max)
}

fn min(interpreter: &mut Interpreter, args: &[ValueRef]) -> ValueRef {
    fold_numeric(interpreter, args, f64::min)
}

/// Variadic numeric fold over the arguments' numeric views. No arguments
/// yields null.
fn fold_numeric(
    interpreter: &mut Interpreter,
    args: &[ValueRef],
    combine: fn(f64, f64) -> f64,
) -> ValueRef {
    let mut best: Option<f64> = None;
    for arg in args {
        let n = interpreter.heap.get(*arg).numeric_field();
        best = Some(match best {
            Some(current) => combine(current, n),
            None => n,
        });
    }
    match best {
        Some(n) => interpreter.heap.number(n),
        None => interpreter.heap.null(),
    }
}
