use kitler_interpreter::evaluator::Interpreter;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

const PROMPT: &str = "kt> ";

/// Interactive loop. One interpreter lives for the whole session, so
/// variables and functions persist across lines.
pub fn start() {
    let mut rl = match DefaultEditor::new() {
        Ok(rl) => rl,
        Err(error) => {
            eprintln!("Error: {error}");
            return;
        }
    };

    println!("Kitler (KT) REPL v1.0");
    println!("Type 'exit' to quit\n");

    let mut interpreter = Interpreter::new();

    loop {
        match rl.readline(PROMPT) {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                if line == "exit" || line == "quit" {
                    break;
                }
                let _ = rl.add_history_entry(line);
                interpreter.run_source(line);
            }
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => break,
            Err(error) => {
                eprintln!("Error: {error}");
                break;
            }
        }
    }

    println!("Goodbye!");
}
