//! XPath 1.0 expression parsing and serialization for the xmb XML
//! data-binding toolkit.
//!
//! This crate turns a path-query string into a structured AST and renders
//! the AST back into canonical text:
//!
//! - **Steps**: `author`, `ancestor::lib:book`, `@xml:lang` - axis, node
//!   test, predicates
//! - **Paths**: `book//author/first-name`, `/catalog/book` - strictly
//!   left-associative chains
//! - **Predicates**: `a[b][1]`, `(book or article)[author]` - filters in
//!   source order
//! - **Operators**: the full precedence ladder, `or` down through `|`,
//!   `/`, `//`
//! - **Primaries**: function calls, `$variable` references, quoted
//!   literals, numbers
//!
//! Lexically ambiguous spellings (`*`, `and`, `or`, `div`, `mod`) are
//! resolved from one token of history, so `div div div` parses as a
//! division of two elements named `div`.
//!
//! All operations are pure functions: no I/O, no shared state, and the
//! returned AST is immutable, so parsing and serializing are safe to call
//! from any number of threads.
//!
//! # Example
//!
//! ```
//! use xmb_xpath::{parse, serialize};
//!
//! let expr = parse("ancestor::lib:book[@xml:lang='en']").unwrap();
//! assert_eq!(serialize(&expr), "ancestor::lib:book[@xml:lang='en']");
//! ```

#![warn(missing_docs)]

mod ast;
mod error;
mod lexer;
mod parser;
mod serializer;

pub use ast::{
    AbbreviatedStep, Axis, BinaryOp, Expr, Literal, NodeTest, PathOp, Quote, Step,
};
pub use error::{Error, LexError, SyntaxError};
pub use lexer::{SpannedToken, Token, tokenize};
pub use parser::{DEFAULT_MAX_DEPTH, parse, parse_with_limit};
pub use serializer::serialize;
