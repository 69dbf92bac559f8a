//! Error types for expression parsing.
//!
//! Parsing is all-or-nothing: there is no recovery and no partial AST.
//! Exactly two structural kinds exist — a byte sequence that matches no
//! token rule ([`LexError`]) and a well-tokenized sequence that fails the
//! grammar ([`SyntaxError`]).

use std::{error, fmt};

use thiserror::Error;

/// Lexer error with position information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexError {
    /// Error message.
    pub message: String,
    /// Byte position in the input where the error occurred.
    pub position: usize,
    /// The original input string.
    pub input: String,
}

impl LexError {
    /// Creates a new lexer error.
    pub fn new(message: impl Into<String>, position: usize, input: &str) -> Self {
        Self {
            message: message.into(),
            position,
            input: input.to_string(),
        }
    }

    /// Formats the error with a caret indicating where it occurred.
    pub fn format_with_context(&self) -> String {
        let mut result = String::new();
        result.push_str(&format!("invalid path expression: {}\n", self.message));
        result.push_str(&format!("  {}\n", self.input));
        result.push_str(&format!("  {}^", " ".repeat(self.position.min(self.input.len()))));
        result
    }
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_with_context())
    }
}

impl error::Error for LexError {}

/// Grammar error with an optional byte position.
///
/// The position is absent when the input ended before the expression was
/// complete (there is no offending token to point at).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    /// Error message.
    pub message: String,
    /// Byte position of the offending token, if known.
    pub position: Option<usize>,
}

impl SyntaxError {
    /// Creates a new syntax error.
    pub fn new(message: impl Into<String>, position: Option<usize>) -> Self {
        Self {
            message: message.into(),
            position,
        }
    }
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.position {
            Some(pos) => write!(f, "invalid path expression at offset {}: {}", pos, self.message),
            None => write!(f, "invalid path expression: {}", self.message),
        }
    }
}

impl error::Error for SyntaxError {}

/// Any failure [`parse`](crate::parse) can produce.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The input contained a byte sequence matching no token rule.
    #[error(transparent)]
    Lex(#[from] LexError),
    /// The token sequence did not match the grammar.
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
}

impl Error {
    /// Byte position of the failure in the input, if known.
    pub fn position(&self) -> Option<usize> {
        match self {
            Self::Lex(err) => Some(err.position),
            Self::Syntax(err) => err.position,
        }
    }
}
