use std::io::Write;
use std::mem;
use std::rc::Rc;

use thiserror::Error;

use kitler_core::ast::{
    BinaryOp, Block, Expression, ExpressionKind, Literal, Program, Statement, StatementKind,
};
use kitler_core::diagnostics::Diagnostic;
use kitler_core::lexer::tokenize;
use kitler_core::parser::Parser;

use crate::builtins::register_builtins;
use crate::heap::Heap;
use crate::scope::Scope;
use crate::value::{Function, Value, ValueRef};

#[derive(Debug, PartialEq, Error)]
pub enum EvalError {
    #[error("Undefined variable: {0}")]
    UndefinedVariable(Rc<str>),
}

/// Tree-walking evaluator. Runtime errors are reported to the error sink
/// and evaluation continues with null, except in strict mode where the
/// current program is abandoned at the next statement boundary.
pub struct Interpreter {
    pub(crate) heap: Heap,
    pub(crate) globals: Scope,
    current: Scope,
    return_value: Option<ValueRef>,
    aborted: bool,
    strict: bool,
    output: Box<dyn Write>,
    errors: Box<dyn Write>,
}

impl Interpreter {
    pub fn new() -> Self {
        Interpreter::with_sinks(Box::new(std::io::stdout()), Box::new(std::io::stderr()))
    }

    pub fn with_sinks(output: Box<dyn Write>, errors: Box<dyn Write>) -> Self {
        let globals = Scope::new();
        let mut interpreter = Interpreter {
            heap: Heap::new(),
            globals: globals.clone(),
            current: globals,
            return_value: None,
            aborted: false,
            strict: false,
            output,
            errors,
        };
        register_builtins(&mut interpreter);
        interpreter
    }

    /// In strict mode the first runtime error abandons the rest of the
    /// program and `run_source` returns false.
    pub fn strict(mut self) -> Self {
        self.strict = true;
        self
    }

    /// Parses and evaluates `source`. Returns false when parse diagnostics
    /// were produced (nothing is evaluated) or, in strict mode, when a
    /// runtime error aborted evaluation.
    pub fn run_source(&mut self, source: &str) -> bool {
        let mut parser = Parser::new(tokenize(source));
        let program = parser.parse_program();
        if parser.had_error {
            for diagnostic in parser.diagnostics() {
                let _ = writeln!(self.errors, "Parse error at {diagnostic}");
            }
            return false;
        }

        self.eval_program(&program);
        if self.strict {
            let ok = !self.aborted;
            self.aborted = false;
            ok
        } else {
            true
        }
    }

    pub fn eval_program(&mut self, program: &Program) {
        for statement in &program.statements {
            self.eval_statement(statement);
            if self.return_value.is_some() || self.aborted {
                break;
            }
        }
        // a top-level return ends the program; the value goes nowhere
        self.return_value = None;
    }

    fn eval_statement(&mut self, statement: &Statement) {
        match &statement.kind {
            StatementKind::VarDecl { name, initializer } => {
                let value = match initializer {
                    Some(expression) => self.eval_expression(expression),
                    None => self.heap.null(),
                };
                self.current.define(name.clone(), value);
            }
            StatementKind::FuncDecl {
                name,
                params,
                body,
                is_async: _,
            } => {
                let function = Value::Function(Function {
                    name: name.clone(),
                    params: params.clone(),
                    body: body.clone(),
                    closure: self.current.clone(),
                });
                let value_ref = self.heap.alloc(function);
                self.current.define(name.clone(), value_ref);
            }
            StatementKind::If {
                condition,
                then_branch,
                else_branch,
            } => {
                let condition = self.eval_expression(condition);
                if self.heap.get(condition).boolean_field() {
                    self.eval_block_scoped(then_branch);
                } else if let Some(else_branch) = else_branch {
                    self.eval_block_scoped(else_branch);
                }
            }
            StatementKind::While { condition, body } => loop {
                let value = self.eval_expression(condition);
                if !self.heap.get(value).boolean_field() {
                    break;
                }
                // fresh scope per iteration
                self.eval_block_scoped(body);
                if self.return_value.is_some() || self.aborted {
                    break;
                }
            },
            StatementKind::Assign { target, value } => {
                let value = self.eval_expression(value);
                if let ExpressionKind::Identifier(name) = &target.kind {
                    // assignment to an unbound name is a silent no-op
                    self.current.assign(name, value);
                }
            }
            StatementKind::Return(expression) => {
                let value = match expression {
                    Some(expression) => self.eval_expression(expression),
                    None => self.heap.null(),
                };
                self.return_value = Some(value);
            }
            StatementKind::Expression(expression) => {
                self.eval_expression(expression);
            }
            // parsed but not interpreted
            StatementKind::Including { .. }
            | StatementKind::For { .. }
            | StatementKind::Break
            | StatementKind::ProjectSpace { .. }
            | StatementKind::ClassDecl { .. }
            | StatementKind::EventDecl { .. }
            | StatementKind::Switch { .. } => {}
        }
    }

    /// Runs `block` in a fresh child of the current scope.
    fn eval_block_scoped(&mut self, block: &Block) {
        let scope = Scope::new_enclosed(&self.current);
        self.eval_block_in(scope, block);
    }

    fn eval_block_in(&mut self, scope: Scope, block: &Block) {
        let saved = mem::replace(&mut self.current, scope);
        for statement in &block.statements {
            self.eval_statement(statement);
            if self.return_value.is_some() || self.aborted {
                break;
            }
        }
        self.current = saved;
    }

    fn eval_expression(&mut self, expression: &Expression) -> ValueRef {
        match &expression.kind {
            ExpressionKind::Literal(Literal::Number(value)) => self.heap.number(*value),
            ExpressionKind::Literal(Literal::Str(value)) => self.heap.string(value.to_string()),
            ExpressionKind::Literal(Literal::Bool(value)) => self.heap.bool(*value),
            ExpressionKind::Literal(Literal::Null) => self.heap.null(),
            ExpressionKind::Identifier(name) => match self.current.get(name) {
                Some(value) => value,
                None => {
                    self.report(
                        expression.line,
                        expression.column,
                        EvalError::UndefinedVariable(name.clone()),
                    );
                    self.heap.null()
                }
            },
            ExpressionKind::Binary { op, left, right } => {
                // both operands are evaluated; `and` and `or` do not
                // short-circuit
                let left = self.eval_expression(left);
                let right = self.eval_expression(right);
                self.eval_binary(*op, left, right)
            }
            ExpressionKind::Call { callee, args } => self.eval_call(callee, args),
            ExpressionKind::Unary { .. }
            | ExpressionKind::MemberAccess { .. }
            | ExpressionKind::IndexAccess { .. }
            | ExpressionKind::ListLiteral(_)
            | ExpressionKind::MapLiteral(_)
            | ExpressionKind::NewInstance { .. } => self.heap.null(),
        }
    }

    fn eval_binary(&mut self, op: BinaryOp, left: ValueRef, right: ValueRef) -> ValueRef {
        let left = self.heap.get(left).clone();
        let right = self.heap.get(right).clone();

        match op {
            BinaryOp::Add => {
                // `+` concatenates when either side is a string; the
                // non-string side contributes nothing
                if matches!(left, Value::Str(_)) || matches!(right, Value::Str(_)) {
                    let mut result = String::new();
                    if let Value::Str(s) = &left {
                        result.push_str(s);
                    }
                    if let Value::Str(s) = &right {
                        result.push_str(s);
                    }
                    self.heap.string(result)
                } else {
                    self.heap.number(left.numeric_field() + right.numeric_field())
                }
            }
            BinaryOp::Subtract => self
                .heap
                .number(left.numeric_field() - right.numeric_field()),
            BinaryOp::Multiply => self
                .heap
                .number(left.numeric_field() * right.numeric_field()),
            BinaryOp::Divide => self
                .heap
                .number(left.numeric_field() / right.numeric_field()),
            BinaryOp::Modulo => self
                .heap
                .number(left.numeric_field() % right.numeric_field()),
            // comparisons go through the numeric view for every type, so
            // two strings always compare equal
            BinaryOp::Equal => self
                .heap
                .bool(left.numeric_field() == right.numeric_field()),
            BinaryOp::NotEqual => self
                .heap
                .bool(left.numeric_field() != right.numeric_field()),
            BinaryOp::Less => self.heap.bool(left.numeric_field() < right.numeric_field()),
            BinaryOp::LessEqual => self
                .heap
                .bool(left.numeric_field() <= right.numeric_field()),
            BinaryOp::Greater => self
                .heap
                .bool(left.numeric_field() > right.numeric_field()),
            BinaryOp::GreaterEqual => self
                .heap
                .bool(left.numeric_field() >= right.numeric_field()),
            BinaryOp::And => self
                .heap
                .bool(left.boolean_field() && right.boolean_field()),
            BinaryOp::Or => self
                .heap
                .bool(left.boolean_field() || right.boolean_field()),
        }
    }

    fn eval_call(&mut self, callee: &Expression, args: &[Expression]) -> ValueRef {
        let callee_ref = self.eval_expression(callee);
        let arg_refs: Vec<ValueRef> = args
            .iter()
            .map(|arg| self.eval_expression(arg))
            .collect();

        match self.heap.get(callee_ref).clone() {
            Value::NativeFunction(native) => (native.func)(self, &arg_refs),
            Value::Function(function) => self.call_function(&function, &arg_refs),
            // calling anything else quietly yields null
            _ => self.heap.null(),
        }
    }

    fn call_function(&mut self, function: &Function, args: &[ValueRef]) -> ValueRef {
        let scope = Scope::new_enclosed(&function.closure);
        // missing arguments stay unbound, extra arguments are dropped
        for (param, arg) in function.params.iter().zip(args) {
            scope.define(param.clone(), *arg);
        }
        self.eval_block_in(scope, &function.body);
        self.return_value.take().unwrap_or_else(|| self.heap.null())
    }

    /// Explicit mark-and-sweep pass rooted at the current scope chain.
    pub fn collect(&mut self) {
        let root = self.current.clone();
        self.heap.collect(&root);
    }

    pub fn live_values(&self) -> usize {
        self.heap.live_count()
    }

    pub(crate) fn report(&mut self, line: u32, column: u32, error: EvalError) {
        let diagnostic = Diagnostic::new(line, column, error.to_string());
        let _ = writeln!(self.errors, "Runtime error at {diagnostic}");
        if self.strict {
            self.aborted = true;
        }
    }

    pub(crate) fn display_value(&self, value_ref: ValueRef) -> String {
        match self.heap.get(value_ref) {
            Value::Number(n) => format_number(*n),
            Value::Str(s) => s.clone(),
            Value::Bool(true) => "true".to_owned(),
            Value::Bool(false) => "false".to_owned(),
            Value::Null => "null".to_owned(),
            _ => "<object>".to_owned(),
        }
    }

    pub(crate) fn write_output(&mut self, line: &str) {
        let _ = writeln!(self.output, "{line}");
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Interpreter::new()
    }
}

/// `%g`-style formatting with six significant digits: fixed notation for
/// moderate magnitudes, exponent notation otherwise, trailing zeros
/// trimmed. Numbers with no fractional part print without one.
fn format_number(n: f64) -> String {
    if n == 0.0 {
        return "0".to_owned();
    }
    if !n.is_finite() {
        return format!("{n}");
    }
    let exponent = n.abs().log10().floor() as i32;
    if (-4..6).contains(&exponent) {
        let precision = (5 - exponent) as usize;
        trim_trailing_zeros(format!("{n:.precision$}"))
    } else {
        let mantissa = trim_trailing_zeros(format!("{:.5}", n / 10f64.powi(exponent)));
        let sign = if exponent < 0 { "-" } else { "+" };
        format!("{mantissa}e{sign}{:02}", exponent.abs())
    }
}

fn trim_trailing_zeros(mut s: String) -> String {
    if s.contains('.') {
        while s.ends_with('0') {
            s.pop();
        }
        if s.ends_with('.') {
            s.pop();
        }
    }
    s
}
