//! Error taxonomies for the three layers that can fail: pager/btree faults
//! that abort the process, and two recoverable taxonomies surfaced by the
//! parser and the executor back to the REPL loop.
use std::fmt;

/// A condition that leaves the pager or tree in a state nothing can recover
/// from. Printed once, logged, then the process exits with a nonzero code.
#[derive(Debug)]
pub enum FatalError {
    Io(std::io::Error),
    CorruptFile,
    PageOutOfRange { page_num: u32, max_pages: u32 },
    InvalidChildAccess { child_num: u32 },
    FlushEmptySlot { page_num: u32 },
    Eof,
}

impl fmt::Display for FatalError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FatalError::Io(e) => write!(f, "I/O error: {}", e),
            FatalError::CorruptFile => {
                write!(f, "Db file is not a whole number of pages. Corrupt file.")
            }
            FatalError::PageOutOfRange { page_num, max_pages } => write!(
                f,
                "Tried to fetch page number out of bounds. {} > {}",
                page_num, max_pages
            ),
            FatalError::InvalidChildAccess { child_num } => write!(
                f,
                "Tried to access child {} of node, but was invalid page",
                child_num
            ),
            FatalError::FlushEmptySlot { page_num } => {
                write!(f, "Tried to flush null page {}.", page_num)
            }
            FatalError::Eof => write!(f, "Error, please try again"),
        }
    }
}

impl std::error::Error for FatalError {}

impl From<std::io::Error> for FatalError {
    fn from(err: std::io::Error) -> FatalError {
        FatalError::Io(err)
    }
}

/// Errors raised while turning a REPL line into a `Statement`. Always
/// recovered locally: the caller prints a message and returns to the prompt.
#[derive(Debug, PartialEq, Eq)]
pub enum ParseError {
    NegativeId,
    StringTooLong,
    SyntaxError,
    UnrecognizedKeyword(String),
    UnrecognizedMeta(String),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ParseError::NegativeId => write!(f, "ID must be positive."),
            ParseError::StringTooLong => write!(f, "String is too long."),
            ParseError::SyntaxError => write!(f, "Syntax error. Could not parse statement."),
            ParseError::UnrecognizedKeyword(input) => {
                write!(f, "Unrecognized keyword at start of '{}'.", input)
            }
            ParseError::UnrecognizedMeta(input) => {
                write!(f, "Unrecognized command '{}'.", input)
            }
        }
    }
}

/// Errors raised while executing an already-parsed `Statement`.
#[derive(Debug, PartialEq, Eq)]
pub enum ExecuteError {
    DuplicateKey,
    /// Declared because the historical interface exposes it; `MAX_PAGES`
    /// bounds the tree long before any insert path could actually return it.
    TableFull,
}

impl fmt::Display for ExecuteError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ExecuteError::DuplicateKey => write!(f, "Error: Duplicate key."),
            ExecuteError::TableFull => write!(f, "Error: Table is full"),
        }
    }
}
