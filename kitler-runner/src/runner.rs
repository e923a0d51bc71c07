use kitler_interpreter::evaluator::Interpreter;

/// Runs a whole source text in a fresh interpreter with strict error
/// handling, so a script that hits a runtime error exits nonzero.
pub fn execute(source: &str) -> bool {
    Interpreter::new().strict().run_source(source)
}
