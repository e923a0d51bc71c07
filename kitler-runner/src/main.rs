mod repl;
mod runner;
mod scaffold;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run a KT source file
    Run {
        #[arg(short, long)]
        file: PathBuf,
    },
    /// Create a new project skeleton
    New { name: String },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.command {
        None => {
            repl::start();
            ExitCode::SUCCESS
        }
        Some(Command::Run { file }) => match std::fs::read_to_string(&file) {
            Ok(source) => {
                if runner::execute(&source) {
                    ExitCode::SUCCESS
                } else {
                    ExitCode::FAILURE
                }
            }
            Err(_) => {
                eprintln!("Error: Could not open file '{}'", file.display());
                ExitCode::FAILURE
            }
        },
        Some(Command::New { name }) => match scaffold::create_project(&name) {
            Ok(()) => ExitCode::SUCCESS,
            Err(error) => {
                eprintln!("Error: Could not create project '{name}': {error}");
                ExitCode::FAILURE
            }
        },
    }
}
