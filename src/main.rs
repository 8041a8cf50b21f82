mod errors;
mod parser;
mod repl;
mod storage;

use clap::Parser;
use std::fs::OpenOptions;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "tinytable", version = VERSION, about = "Tiny single-file relational table engine.")]
struct Cli {
    /// Path to the database file. Created if it doesn't exist.
    filename: String,
    /// Don't read or append to the persisted command history.
    #[arg(long)]
    no_history: bool,
    /// Path to the log file.
    #[arg(long, default_value = "tinytable.log")]
    log_file: String,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_file = match OpenOptions::new()
        .append(true)
        .create(true)
        .open(&cli.log_file)
    {
        Ok(file) => file,
        Err(e) => {
            eprintln!("Failed to open log file {}: {}", cli.log_file, e);
            return ExitCode::FAILURE;
        }
    };

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let repl = match repl::Repl::open(&cli.filename, !cli.no_history) {
        Ok(repl) => repl,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    match repl.run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(errors::FatalError::Eof) => {
            println!("{}", errors::FatalError::Eof);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}
