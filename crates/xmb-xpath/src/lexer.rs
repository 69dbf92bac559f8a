//! XPath expression lexer (tokenizer).
//!
//! Converts an expression string into a flat token sequence for the parser.
//!
//! XPath 1.0 has genuinely ambiguous lexemes: `*` is either a wildcard name
//! test or the multiplication operator, and `and`, `or`, `div`, `mod` are
//! either operators or ordinary element names. The rules in
//! <http://www.w3.org/TR/xpath/#exprlex> resolve every case with one bit of
//! history: whether the previously emitted token completed an operand. That
//! bit is threaded through the lexer loop as [`LexState`]; it never leaks
//! across calls.

use crate::{ast::Quote, error::LexError};

/// A token in an XPath expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// An unprefixed name: element name or function name.
    NCName(String),
    /// A prefixed name, `prefix:local`. The local part may be `*`.
    QName {
        /// Namespace prefix.
        prefix: String,
        /// Local name, or `*`.
        local: String,
    },
    /// An axis name fused with its `::` separator, e.g. the `ancestor` in
    /// `ancestor::book`.
    AxisName(String),
    /// A reserved node-type name followed by `(`: `node`, `text`,
    /// `comment`, or `processing-instruction`. The `(` is emitted
    /// separately.
    NodeType(String),
    /// The wildcard name test `*`.
    Wildcard,
    /// A quoted string constant; the quote character is recorded.
    Literal {
        /// Content without the enclosing quotes.
        value: String,
        /// The quote character used in the source.
        quote: Quote,
    },
    /// A numeric constant, kept as its original source text.
    Number(String),

    /// The `or` operator keyword.
    Or,
    /// The `and` operator keyword.
    And,
    /// The `div` operator keyword.
    Div,
    /// The `mod` operator keyword.
    Mod,

    /// `/`
    Slash,
    /// `//`
    DoubleSlash,
    /// `|`
    Pipe,
    /// `=`
    Eq,
    /// `!=`
    NotEq,
    /// `<`
    Lt,
    /// `<=`
    LtEq,
    /// `>`
    Gt,
    /// `>=`
    GtEq,
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*` as the multiplication operator.
    Star,
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `[`
    LBracket,
    /// `]`
    RBracket,
    /// `,`
    Comma,
    /// `@`
    At,
    /// `$`
    Dollar,
    /// `.`
    Dot,
    /// `..`
    DotDot,
}

impl Token {
    /// True if this token completes an operand, meaning an operator may
    /// legitimately follow it.
    fn completes_operand(&self) -> bool {
        matches!(
            self,
            Self::NCName(_)
                | Self::QName { .. }
                | Self::Wildcard
                | Self::Literal { .. }
                | Self::Number(_)
                | Self::RParen
                | Self::RBracket
                | Self::Dot
                | Self::DotDot
        )
    }
}

/// A token plus the byte offset where it begins in the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpannedToken {
    /// The token.
    pub token: Token,
    /// Byte offset of the token's first character.
    pub offset: usize,
}

/// The reserved node-type names.
const NODE_TYPES: [&str; 4] = ["node", "text", "comment", "processing-instruction"];

/// The one bit of history the disambiguation rules need.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LexState {
    /// The previous token completed an operand, so `*` and the four
    /// operator keywords read as operators here.
    AfterOperand,
    /// Start of input, or the previous token did not complete an operand;
    /// an operand is expected, so `*` is a wildcard and `div` is a name.
    ExpectOperand,
}

/// Tokenizes an expression string.
struct Lexer<'a> {
    /// The original input string.
    input: &'a str,
    /// Current byte position in input.
    position: usize,
    /// Operand/operator context for the next token.
    state: LexState,
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer for the given input.
    fn new(input: &'a str) -> Self {
        Self {
            input,
            position: 0,
            state: LexState::ExpectOperand,
        }
    }

    /// The unconsumed remainder of the input.
    fn rest(&self) -> &str {
        &self.input[self.position..]
    }

    /// Returns the current character without consuming it.
    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    /// Advances past the current character.
    fn advance(&mut self) {
        if let Some(ch) = self.peek() {
            self.position += ch.len_utf8();
        }
    }

    /// Creates an error at a specific position.
    fn error_at(&self, message: impl Into<String>, position: usize) -> LexError {
        LexError::new(message, position, self.input)
    }

    /// Tokenizes the entire input, returning all tokens or an error.
    fn tokenize(mut self) -> Result<Vec<SpannedToken>, LexError> {
        let mut tokens = Vec::new();

        loop {
            self.skip_whitespace();
            let offset = self.position;
            let Some(ch) = self.peek() else {
                break;
            };

            let token = self.next_token(ch)?;
            self.state = if token.completes_operand() {
                LexState::AfterOperand
            } else {
                LexState::ExpectOperand
            };
            tokens.push(SpannedToken { token, offset });
        }

        Ok(tokens)
    }

    /// Reads the next token, starting at the given character.
    fn next_token(&mut self, ch: char) -> Result<Token, LexError> {
        match ch {
            '\'' | '"' => self.read_literal(ch),
            '0'..='9' => Ok(self.read_number()),
            '.' => {
                if self.rest().starts_with("..") {
                    self.advance();
                    self.advance();
                    Ok(Token::DotDot)
                } else if self.rest()[1..]
                    .chars()
                    .next()
                    .is_some_and(|c| c.is_ascii_digit())
                {
                    Ok(self.read_number())
                } else {
                    self.advance();
                    Ok(Token::Dot)
                }
            }
            '/' => {
                self.advance();
                if self.peek() == Some('/') {
                    self.advance();
                    Ok(Token::DoubleSlash)
                } else {
                    Ok(Token::Slash)
                }
            }
            '*' => {
                self.advance();
                match self.state {
                    LexState::AfterOperand => Ok(Token::Star),
                    LexState::ExpectOperand => Ok(Token::Wildcard),
                }
            }
            '|' => self.single(Token::Pipe),
            '=' => self.single(Token::Eq),
            '!' => {
                if self.rest().starts_with("!=") {
                    self.advance();
                    self.advance();
                    Ok(Token::NotEq)
                } else {
                    Err(self.error_at("unexpected character '!'", self.position))
                }
            }
            '<' => self.single_or_eq(Token::Lt, Token::LtEq),
            '>' => self.single_or_eq(Token::Gt, Token::GtEq),
            '+' => self.single(Token::Plus),
            '-' => self.single(Token::Minus),
            '(' => self.single(Token::LParen),
            ')' => self.single(Token::RParen),
            '[' => self.single(Token::LBracket),
            ']' => self.single(Token::RBracket),
            ',' => self.single(Token::Comma),
            '@' => self.single(Token::At),
            '$' => self.single(Token::Dollar),
            ':' => Err(self.error_at(
                "':' must follow a name with no intervening whitespace",
                self.position,
            )),
            c if is_name_start(c) => self.read_name(),
            c => Err(self.error_at(format!("unexpected character '{c}'"), self.position)),
        }
    }

    /// Consumes one character and returns the given token.
    fn single(&mut self, token: Token) -> Result<Token, LexError> {
        self.advance();
        Ok(token)
    }

    /// Consumes `<` or `>`, fusing a trailing `=` if present.
    fn single_or_eq(&mut self, bare: Token, with_eq: Token) -> Result<Token, LexError> {
        self.advance();
        if self.peek() == Some('=') {
            self.advance();
            Ok(with_eq)
        } else {
            Ok(bare)
        }
    }

    /// Reads a quoted literal. XPath 1.0 literals have no escape sequences;
    /// the content is everything up to the matching quote.
    fn read_literal(&mut self, quote_char: char) -> Result<Token, LexError> {
        let start = self.position;
        self.advance(); // consume opening quote

        let quote = if quote_char == '\'' {
            Quote::Single
        } else {
            Quote::Double
        };
        let mut value = String::new();

        loop {
            match self.peek() {
                Some(ch) if ch == quote_char => {
                    self.advance();
                    return Ok(Token::Literal { value, quote });
                }
                Some(ch) => {
                    value.push(ch);
                    self.advance();
                }
                None => {
                    return Err(self.error_at("unterminated string literal", start));
                }
            }
        }
    }

    /// Reads a number: `Digits ('.' Digits?)? | '.' Digits`. The source
    /// text is kept verbatim so serialization never re-formats it.
    fn read_number(&mut self) -> Token {
        let start = self.position;

        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
        }
        if self.peek() == Some('.') {
            self.advance();
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.advance();
            }
        }

        Token::Number(self.input[start..self.position].to_string())
    }

    /// Reads a name and classifies it: axis name (fused `::`), qualified
    /// name (fused `:`), operator keyword (operand context only), node-type
    /// name (followed by `(`), or plain NCName.
    fn read_name(&mut self) -> Result<Token, LexError> {
        let name = self.read_ncname();

        // `name::` with no intervening whitespace is an axis, never a QName.
        if self.rest().starts_with("::") {
            self.advance();
            self.advance();
            return Ok(Token::AxisName(name));
        }

        // `prefix:local` (single colon) fuses into one QName token.
        if self.rest().starts_with(':') {
            let colon_pos = self.position;
            self.advance();
            return match self.peek() {
                Some('*') => {
                    self.advance();
                    Ok(Token::QName {
                        prefix: name,
                        local: "*".to_string(),
                    })
                }
                Some(c) if is_name_start(c) => Ok(Token::QName {
                    prefix: name,
                    local: self.read_ncname(),
                }),
                _ => Err(self.error_at("expected a name after ':'", colon_pos)),
            };
        }

        // Where an operator is expected, these spellings are operators.
        if self.state == LexState::AfterOperand {
            match name.as_str() {
                "and" => return Ok(Token::And),
                "or" => return Ok(Token::Or),
                "div" => return Ok(Token::Div),
                "mod" => return Ok(Token::Mod),
                _ => {}
            }
        }

        // A reserved name whose next significant character is `(` is a
        // node-type test; any other name before `(` stays an NCName and the
        // parser reads it as a function call.
        if NODE_TYPES.contains(&name.as_str()) && self.rest().trim_start().starts_with('(') {
            return Ok(Token::NodeType(name));
        }

        Ok(Token::NCName(name))
    }

    /// Consumes an NCName: leading letter or `_`, then letters, digits,
    /// `-`, `.`, `_`.
    fn read_ncname(&mut self) -> String {
        let start = self.position;
        while self.peek().is_some_and(is_name_char) {
            self.advance();
        }
        self.input[start..self.position].to_string()
    }

    /// Skips whitespace characters.
    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.advance();
        }
    }
}

/// True if the character can start an NCName.
fn is_name_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

/// True if the character can continue an NCName.
fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '-' | '.' | '_')
}

/// Tokenizes an XPath expression string.
///
/// Returns the token sequence with byte offsets, or a [`LexError`] if some
/// byte sequence matches no token rule.
pub fn tokenize(input: &str) -> Result<Vec<SpannedToken>, LexError> {
    Lexer::new(input).tokenize()
}
