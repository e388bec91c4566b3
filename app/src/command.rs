//! Parsing of REPL input lines.

use tasklist::TodoId;
use thiserror::Error;

/// One line of user input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Show the list
    List,
    /// Add an item; text is validated by the store
    Add(String),
    /// Toggle an item
    Toggle(TodoId),
    /// Delete an item
    Delete(TodoId),
    /// Erase everything (asks first)
    Clear,
    /// Replace the list with the remote one (asks first)
    Reload,
    /// Load again after a failed start
    Retry,
    /// Show persistence warnings
    Warnings,
    /// Forget persistence warnings
    Dismiss,
    /// Show usage
    Help,
    /// Leave
    Quit,
}

/// Input that is not a command
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Nothing but whitespace
    #[error("empty input")]
    Empty,

    /// First word is not a command
    #[error("unknown command `{0}`; type `help` for a list")]
    Unknown(String),

    /// Command needs an id
    #[error("`{0}` needs a todo id, e.g. `{0} 3`")]
    MissingId(&'static str),

    /// Id is not a number
    #[error("`{0}` is not a todo id")]
    InvalidId(String),
}

/// Usage text for `help`
pub const HELP: &str = "\
Commands:
  list                 show todos
  add <text>           add a todo at the top
  toggle <id>          mark done / not done
  delete <id>          remove a todo
  clear                remove every todo (asks first)
  reload               replace todos with the remote list (asks first)
  retry                load again after a failed start
  warnings             show save failures
  dismiss              forget save failures
  help                 show this text
  quit                 exit";

impl std::str::FromStr for Command {
    type Err = ParseError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (word, rest) = line
            .split_once(char::is_whitespace)
            .map_or((line, ""), |(w, r)| (w, r.trim()));

        match word.to_ascii_lowercase().as_str() {
            "" => Err(ParseError::Empty),
            "list" | "ls" => Ok(Self::List),
            "add" | "a" => Ok(Self::Add(rest.to_string())),
            "toggle" | "t" | "done" => parse_id("toggle", rest).map(Self::Toggle),
            "delete" | "del" | "rm" => parse_id("delete", rest).map(Self::Delete),
            "clear" => Ok(Self::Clear),
            "reload" => Ok(Self::Reload),
            "retry" => Ok(Self::Retry),
            "warnings" => Ok(Self::Warnings),
            "dismiss" => Ok(Self::Dismiss),
            "help" | "?" => Ok(Self::Help),
            "quit" | "exit" | "q" => Ok(Self::Quit),
            _ => Err(ParseError::Unknown(word.to_string())),
        }
    }
}

fn parse_id(command: &'static str, rest: &str) -> Result<TodoId, ParseError> {
    if rest.is_empty() {
        return Err(ParseError::MissingId(command));
    }
    rest.parse()
        .map_err(|_| ParseError::InvalidId(rest.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> Result<Command, ParseError> {
        line.parse()
    }

    #[test]
    fn add_keeps_inner_spacing() {
        assert_eq!(
            parse("add   Walk the  dog "),
            Ok(Command::Add("Walk the  dog".to_string()))
        );
        assert_eq!(parse("add"), Ok(Command::Add(String::new())));
    }

    #[test]
    fn ids_accept_hash_prefix() {
        assert_eq!(parse("toggle 1"), Ok(Command::Toggle(TodoId::new(1))));
        assert_eq!(parse("rm #42"), Ok(Command::Delete(TodoId::new(42))));
    }

    #[test]
    fn id_errors() {
        assert_eq!(parse("toggle"), Err(ParseError::MissingId("toggle")));
        assert_eq!(
            parse("delete first"),
            Err(ParseError::InvalidId("first".to_string()))
        );
    }

    #[test]
    fn keywords_are_case_insensitive() {
        assert_eq!(parse("LIST"), Ok(Command::List));
        assert_eq!(parse("Quit"), Ok(Command::Quit));
    }

    #[test]
    fn blank_and_unknown() {
        assert_eq!(parse("   "), Err(ParseError::Empty));
        assert_eq!(
            parse("frobnicate now"),
            Err(ParseError::Unknown("frobnicate".to_string()))
        );
    }
}
