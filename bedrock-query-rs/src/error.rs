//! Error types and exit codes for bedrock-query.

use std::path::PathBuf;
use thiserror::Error;

/// Process exit codes used by the CLI.
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL_ERROR: i32 = 1;
    pub const QUERY_ERROR: i32 = 2;
    pub const INPUT_NOT_FOUND: i32 = 3;
    pub const NO_MATCHES: i32 = 4;
}

/// Errors raised while turning a search string into a compiled query.
///
/// The `Display` output of each variant is the user-facing message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("Unknown operator symbol '{symbol}' before filter '{keyword}'")]
    UnknownOperatorSymbol { symbol: String, keyword: String },

    #[error("Unknown search filter '{keyword}'. Valid filters are: {}", .valid.join(", "))]
    UnknownFilterKeyword { keyword: String, valid: Vec<String> },

    #[error("The '{symbol}' operator is not supported for the '{keyword}' filter")]
    UnsupportedOperatorForKeyword { symbol: String, keyword: String },

    #[error("Invalid NBT query '{literal}': {reason}")]
    InvalidNbtQueryLiteral { literal: String, reason: String },

    #[error("Unknown content type \"{value}\".{}", format_suggestions(.suggestions))]
    UnknownContentType {
        value: String,
        suggestions: Vec<String>,
    },
}

fn format_suggestions(suggestions: &[String]) -> String {
    let quoted: Vec<String> = suggestions.iter().map(|s| format!("\"{}\"", s)).collect();
    match quoted.as_slice() {
        [] => String::new(),
        [only] => format!(" Did you mean {}?", only),
        [first, second] => format!(" Did you mean {} or {}?", first, second),
        [init @ .., last] => format!(" Did you mean {}, or {}?", init.join(", "), last),
    }
}

/// Errors raised while decoding a record payload into a tag tree.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Unexpected end of NBT data at offset {offset}")]
    UnexpectedEof { offset: usize },

    #[error("Unknown NBT tag id {id} at offset {offset}")]
    UnknownTagId { id: u8, offset: usize },

    #[error("Negative length {length} at offset {offset}")]
    NegativeLength { length: i32, offset: usize },

    #[error("NBT root must be a compound or list, found {0}")]
    InvalidRoot(String),

    #[error("Invalid UTF-8 in NBT string at offset {offset}")]
    InvalidString { offset: usize },

    #[error("NBT nesting deeper than {limit} levels at offset {offset}")]
    TooDeep { limit: usize, offset: usize },

    #[error("JSON decode error: {0}")]
    Json(String),

    #[error("Empty payload")]
    Empty,
}

/// Main error type for bedrock-query operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Query(#[from] QueryError),

    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("Dump file not found: {0}")]
    DumpNotFound(PathBuf),

    #[error("Invalid dump record on line {line}: {message}")]
    InvalidDumpRecord { line: usize, message: String },

    #[error("Unknown screen '{0}'")]
    UnknownScreen(String),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("No records matched the query")]
    NoMatches,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Base64 error: {0}")]
    Base64(#[from] base64::DecodeError),
}

impl Error {
    /// Returns the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Query(_) | Error::UnknownScreen(_) => exit_code::QUERY_ERROR,
            Error::DumpNotFound(_) => exit_code::INPUT_NOT_FOUND,
            Error::NoMatches => exit_code::NO_MATCHES,
            _ => exit_code::GENERAL_ERROR,
        }
    }
}

/// Result type alias for bedrock-query operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_suggestion_message() {
        let err = QueryError::UnknownContentType {
            value: "Dat3D".to_string(),
            suggestions: vec!["Data3D".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Unknown content type \"Dat3D\". Did you mean \"Data3D\"?"
        );
    }

    #[test]
    fn test_two_suggestions_message() {
        let err = QueryError::UnknownContentType {
            value: "x".to_string(),
            suggestions: vec!["A".to_string(), "B".to_string()],
        };
        assert!(err.to_string().ends_with("Did you mean \"A\" or \"B\"?"));
    }

    #[test]
    fn test_three_suggestions_message() {
        let err = QueryError::UnknownContentType {
            value: "x".to_string(),
            suggestions: vec!["A".to_string(), "B".to_string(), "C".to_string()],
        };
        assert!(err.to_string().ends_with("Did you mean \"A\", \"B\", or \"C\"?"));
    }

    #[test]
    fn test_no_suggestions_message() {
        let err = QueryError::UnknownContentType {
            value: "".to_string(),
            suggestions: vec![],
        };
        assert_eq!(err.to_string(), "Unknown content type \"\".");
    }

    #[test]
    fn test_exit_codes() {
        let query = Error::Query(QueryError::UnknownFilterKeyword {
            keyword: "foo".to_string(),
            valid: vec![],
        });
        assert_eq!(query.exit_code(), exit_code::QUERY_ERROR);
        assert_eq!(Error::NoMatches.exit_code(), exit_code::NO_MATCHES);
        assert_eq!(
            Error::DumpNotFound(PathBuf::from("x")).exit_code(),
            exit_code::INPUT_NOT_FOUND
        );
    }
}
