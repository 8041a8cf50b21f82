//! The interactive loop: print a prompt, read one line, dispatch it, repeat.
//! Plain blocking stdio rather than a raw-mode terminal so scripted input
//! (piped stdin in tests) behaves exactly like a human typing line by line.
pub mod history;

use crate::errors::FatalError;
use crate::parser::{self, Command, MetaCommand, Statement};
use crate::storage::node::{
    COMMON_NODE_HEADER_SIZE, LEAF_NODE_CELL_SIZE, LEAF_NODE_HEADER_SIZE, LEAF_NODE_MAX_CELLS,
    LEAF_NODE_SPACE_FOR_CELLS,
};
use crate::storage::row::ROW_SIZE;
use crate::storage::{FileStorage, Table};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing::info;

const PROMPT: &str = "db > ";

pub struct Repl {
    table: Table<FileStorage>,
    history_path: Option<PathBuf>,
}

impl Repl {
    pub fn open(db_path: &str, record_history: bool) -> Result<Repl, FatalError> {
        let table = Table::open(db_path)?;
        let history_path = if record_history {
            history::history_file_path()
        } else {
            None
        };
        Ok(Repl { table, history_path })
    }

    /// Runs until `.exit` or stdin closes. A closed stdin is treated as
    /// fatal, matching the historical REPL's refusal to fall back to a
    /// default statement on a failed read.
    pub fn run(mut self) -> Result<(), FatalError> {
        let stdin = io::stdin();
        loop {
            print_prompt();
            let mut line = String::new();
            let bytes_read = stdin.lock().read_line(&mut line)?;
            if bytes_read == 0 {
                return Err(FatalError::Eof);
            }
            let line = line.trim_end_matches(['\n', '\r']);
            if line.is_empty() {
                continue;
            }

            if let Some(path) = &self.history_path {
                if let Err(e) = history::append_history(line, path) {
                    tracing::warn!("failed to append history: {}", e);
                }
            }

            match self.dispatch(line)? {
                Dispatch::Continue => {}
                Dispatch::Exit => {
                    info!("exiting");
                    self.table.close()?;
                    return Ok(());
                }
            }
        }
    }

    fn dispatch(&mut self, line: &str) -> Result<Dispatch, FatalError> {
        match parser::parse(line) {
            Ok(Command::Meta(meta)) => self.run_meta(meta),
            Ok(Command::Statement(stmt)) => self.run_statement(stmt),
            Err(err) => {
                println!("{}", err);
                Ok(Dispatch::Continue)
            }
        }
    }

    fn run_meta(&mut self, meta: MetaCommand) -> Result<Dispatch, FatalError> {
        match meta {
            MetaCommand::Exit => Ok(Dispatch::Exit),
            MetaCommand::PrintTree => {
                println!("Tree:");
                print!("{}", self.table.print_tree()?);
                Ok(Dispatch::Continue)
            }
            MetaCommand::PrintConstants => {
                println!("Constants:");
                print_constants();
                Ok(Dispatch::Continue)
            }
        }
    }

    fn run_statement(&mut self, stmt: Statement) -> Result<Dispatch, FatalError> {
        match stmt {
            Statement::Insert(row) => match self.table.insert(row)? {
                Ok(()) => println!("Executed."),
                Err(exec_err) => println!("{}", exec_err),
            },
            Statement::Select => {
                for row in self.table.select()? {
                    println!("{}", row);
                }
                println!("Executed.");
            }
        }
        Ok(Dispatch::Continue)
    }
}

enum Dispatch {
    Continue,
    Exit,
}

fn print_prompt() {
    print!("{}", PROMPT);
    io::stdout().flush().expect("failed to flush stdout");
}

fn print_constants() {
    println!("ROW_SIZE: {}", ROW_SIZE);
    println!("COMMON_NODE_HEADER_SIZE: {}", COMMON_NODE_HEADER_SIZE);
    println!("LEAF_NODE_HEADER_SIZE: {}", LEAF_NODE_HEADER_SIZE);
    println!("LEAF_NODE_CELL_SIZE: {}", LEAF_NODE_CELL_SIZE);
    println!("LEAF_NODE_SPACE_FOR_CELLS: {}", LEAF_NODE_SPACE_FOR_CELLS);
    println!("LEAF_NODE_MAX_CELLS: {}", LEAF_NODE_MAX_CELLS);
}
