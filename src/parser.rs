//! Turns one REPL line into a `Command`: a meta-command (`.exit`, `.btree`,
//! `.constants`) or a statement (`insert`, `select`). Statement keywords are
//! recognized by exact prefix match, matching the historical dispatcher;
//! `insert`'s three arguments are validated against shape regexes before the
//! id is parsed and the strings are measured against the column widths.
use crate::errors::ParseError;
use crate::storage::row::{Row, COLUMN_EMAIL_SIZE, COLUMN_USERNAME_SIZE};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref USERNAME_SHAPE: Regex = Regex::new(r"^[^\s]+$").unwrap();
    static ref EMAIL_SHAPE: Regex = Regex::new(r"^[^\s]+@[^\s]+$").unwrap();
}

#[derive(Debug, PartialEq, Eq)]
pub enum MetaCommand {
    Exit,
    PrintTree,
    PrintConstants,
}

#[derive(Debug, PartialEq, Eq)]
pub enum Statement {
    Insert(Row),
    Select,
}

#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    Meta(MetaCommand),
    Statement(Statement),
}

pub fn parse(line: &str) -> Result<Command, ParseError> {
    let line = line.trim();
    if let Some(meta) = line.strip_prefix('.') {
        return parse_meta(meta).map(Command::Meta);
    }
    parse_statement(line).map(Command::Statement)
}

fn parse_meta(meta: &str) -> Result<MetaCommand, ParseError> {
    match meta {
        "exit" => Ok(MetaCommand::Exit),
        "btree" => Ok(MetaCommand::PrintTree),
        "constants" => Ok(MetaCommand::PrintConstants),
        other => Err(ParseError::UnrecognizedMeta(format!(".{}", other))),
    }
}

fn parse_statement(line: &str) -> Result<Statement, ParseError> {
    if line.starts_with("insert") {
        return parse_insert(line);
    }
    if line == "select" {
        return Ok(Statement::Select);
    }
    if line.starts_with("select") {
        return Err(ParseError::SyntaxError);
    }
    Err(ParseError::UnrecognizedKeyword(line.to_string()))
}

fn parse_insert(line: &str) -> Result<Statement, ParseError> {
    let mut parts = line.split_whitespace();
    let _keyword = parts.next();
    let id_str = parts.next().ok_or(ParseError::SyntaxError)?;
    let username = parts.next().ok_or(ParseError::SyntaxError)?;
    let email = parts.next().ok_or(ParseError::SyntaxError)?;
    if parts.next().is_some() {
        return Err(ParseError::SyntaxError);
    }

    let id: i64 = id_str.parse().map_err(|_| ParseError::SyntaxError)?;
    if id < 0 {
        return Err(ParseError::NegativeId);
    }

    if !USERNAME_SHAPE.is_match(username) || !EMAIL_SHAPE.is_match(email) {
        return Err(ParseError::SyntaxError);
    }
    if username.len() > COLUMN_USERNAME_SIZE || email.len() > COLUMN_EMAIL_SIZE {
        return Err(ParseError::StringTooLong);
    }

    Ok(Statement::Insert(Row::new(id as u32, username, email)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_well_formed_insert() {
        let cmd = parse("insert 1 alice alice@example.com").unwrap();
        assert_eq!(
            cmd,
            Command::Statement(Statement::Insert(Row::new(1, "alice", "alice@example.com")))
        );
    }

    #[test]
    fn parses_select() {
        assert_eq!(parse("select").unwrap(), Command::Statement(Statement::Select));
    }

    #[test]
    fn rejects_negative_id() {
        assert_eq!(
            parse("insert -1 alice alice@example.com"),
            Err(ParseError::NegativeId)
        );
    }

    #[test]
    fn rejects_oversized_username() {
        let long = "a".repeat(COLUMN_USERNAME_SIZE + 1);
        assert_eq!(
            parse(&format!("insert 1 {} alice@example.com", long)),
            Err(ParseError::StringTooLong)
        );
    }

    #[test]
    fn rejects_missing_arguments() {
        assert_eq!(parse("insert 1 alice"), Err(ParseError::SyntaxError));
    }

    #[test]
    fn recognizes_meta_commands() {
        assert_eq!(parse(".exit").unwrap(), Command::Meta(MetaCommand::Exit));
        assert_eq!(parse(".btree").unwrap(), Command::Meta(MetaCommand::PrintTree));
        assert_eq!(
            parse(".constants").unwrap(),
            Command::Meta(MetaCommand::PrintConstants)
        );
    }

    #[test]
    fn rejects_unrecognized_meta_command() {
        assert_eq!(
            parse(".frobnicate"),
            Err(ParseError::UnrecognizedMeta(".frobnicate".to_string()))
        );
    }

    #[test]
    fn rejects_unrecognized_keyword() {
        assert_eq!(
            parse("delete 1"),
            Err(ParseError::UnrecognizedKeyword("delete 1".to_string()))
        );
    }
}
