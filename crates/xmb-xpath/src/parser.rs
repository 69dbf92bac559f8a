//! XPath expression parser.
//!
//! Parses a token stream into an AST using recursive descent, one method
//! per precedence level.
//!
//! # Grammar
//!
//! ```text
//! expr           → or_expr
//! or_expr        → and_expr ("or" and_expr)*
//! and_expr       → equality ("and" equality)*
//! equality       → relational (("=" | "!=") relational)*
//! relational     → additive (("<" | "<=" | ">" | ">=") additive)*
//! additive       → multiplicative (("+" | "-") multiplicative)*
//! multiplicative → unary (("*" | "div" | "mod") unary)*
//! unary          → "-"* union
//! union          → path ("|" path)*
//! path           → ("/" | "//") relative_path?
//!                | relative_path
//! relative_path  → step (("/" | "//") step)*
//! step           → "." | ".."
//!                | (axis "::" | "@")? node_test predicate*
//!                | primary
//! node_test      → NCNAME | QNAME | "*" | node_type "(" LITERAL? ")"
//! predicate      → "[" expr "]"
//! primary        → ("$" name | "(" expr ")" | LITERAL | NUMBER
//!                | NCNAME "(" (expr ("," expr)*)? ")") predicate*
//! ```
//!
//! Every binary level builds a strictly left-associative chain. A leading
//! `/` or `//` has no left operand and becomes an [`Expr::AbsolutePath`]
//! instead of a binary node.

use std::mem;

use crate::{
    ast::{AbbreviatedStep, Axis, BinaryOp, Expr, Literal, NodeTest, PathOp, Step},
    error::{Error, SyntaxError},
    lexer::{SpannedToken, Token, tokenize},
};

/// Default bound on expression nesting depth.
///
/// Parenthesized groups, predicates, and function arguments all recurse;
/// the bound turns a pathological input into an error instead of a stack
/// overflow.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Recursive descent parser for XPath expressions.
struct Parser {
    /// Token stream to parse.
    tokens: Vec<SpannedToken>,
    /// Current position in the token stream.
    position: usize,
    /// Current nesting depth.
    depth: usize,
    /// Maximum permitted nesting depth.
    max_depth: usize,
}

impl Parser {
    /// Creates a new parser from a token stream.
    fn new(tokens: Vec<SpannedToken>, max_depth: usize) -> Self {
        Self {
            tokens,
            position: 0,
            depth: 0,
            max_depth,
        }
    }

    /// Parses the token stream into a single expression.
    fn parse(mut self) -> Result<Expr, SyntaxError> {
        if self.tokens.is_empty() {
            return Err(SyntaxError::new("empty expression", None));
        }

        let expr = self.parse_expr()?;

        if let Some(token) = self.peek() {
            return Err(SyntaxError::new(
                format!("unexpected token {token:?} after complete expression"),
                self.current_offset(),
            ));
        }

        Ok(expr)
    }

    /// Parses one full expression, guarding recursion depth.
    fn parse_expr(&mut self) -> Result<Expr, SyntaxError> {
        if self.depth >= self.max_depth {
            return Err(SyntaxError::new(
                "expression nesting too deep",
                self.current_offset(),
            ));
        }
        self.depth += 1;
        let result = self.parse_or();
        self.depth -= 1;
        result
    }

    /// Parses: or_expr → and_expr ("or" and_expr)*
    fn parse_or(&mut self) -> Result<Expr, SyntaxError> {
        let mut left = self.parse_and()?;

        while self.check(&Token::Or) {
            self.advance();
            let right = self.parse_and()?;
            left = Expr::binary(BinaryOp::Or, left, right);
        }

        Ok(left)
    }

    /// Parses: and_expr → equality ("and" equality)*
    fn parse_and(&mut self) -> Result<Expr, SyntaxError> {
        let mut left = self.parse_equality()?;

        while self.check(&Token::And) {
            self.advance();
            let right = self.parse_equality()?;
            left = Expr::binary(BinaryOp::And, left, right);
        }

        Ok(left)
    }

    /// Parses: equality → relational (("=" | "!=") relational)*
    fn parse_equality(&mut self) -> Result<Expr, SyntaxError> {
        let mut left = self.parse_relational()?;

        loop {
            let op = match self.peek() {
                Some(Token::Eq) => BinaryOp::Eq,
                Some(Token::NotEq) => BinaryOp::Ne,
                _ => break,
            };
            self.advance();
            let right = self.parse_relational()?;
            left = Expr::binary(op, left, right);
        }

        Ok(left)
    }

    /// Parses: relational → additive (("<" | "<=" | ">" | ">=") additive)*
    fn parse_relational(&mut self) -> Result<Expr, SyntaxError> {
        let mut left = self.parse_additive()?;

        loop {
            let op = match self.peek() {
                Some(Token::Lt) => BinaryOp::Lt,
                Some(Token::LtEq) => BinaryOp::Le,
                Some(Token::Gt) => BinaryOp::Gt,
                Some(Token::GtEq) => BinaryOp::Ge,
                _ => break,
            };
            self.advance();
            let right = self.parse_additive()?;
            left = Expr::binary(op, left, right);
        }

        Ok(left)
    }

    /// Parses: additive → multiplicative (("+" | "-") multiplicative)*
    fn parse_additive(&mut self) -> Result<Expr, SyntaxError> {
        let mut left = self.parse_multiplicative()?;

        loop {
            let op = match self.peek() {
                Some(Token::Plus) => BinaryOp::Add,
                Some(Token::Minus) => BinaryOp::Sub,
                _ => break,
            };
            self.advance();
            let right = self.parse_multiplicative()?;
            left = Expr::binary(op, left, right);
        }

        Ok(left)
    }

    /// Parses: multiplicative → unary (("*" | "div" | "mod") unary)*
    fn parse_multiplicative(&mut self) -> Result<Expr, SyntaxError> {
        let mut left = self.parse_unary()?;

        loop {
            let op = match self.peek() {
                Some(Token::Star) => BinaryOp::Mul,
                Some(Token::Div) => BinaryOp::Div,
                Some(Token::Mod) => BinaryOp::Mod,
                _ => break,
            };
            self.advance();
            let right = self.parse_unary()?;
            left = Expr::binary(op, left, right);
        }

        Ok(left)
    }

    /// Parses: unary → "-"* union
    ///
    /// Iterative so a run of minus signs cannot exhaust the call stack.
    fn parse_unary(&mut self) -> Result<Expr, SyntaxError> {
        let mut negations = 0usize;
        while self.check(&Token::Minus) {
            self.advance();
            negations += 1;
        }

        let mut expr = self.parse_union()?;
        for _ in 0..negations {
            expr = Expr::Negate(Box::new(expr));
        }
        Ok(expr)
    }

    /// Parses: union → path ("|" path)*
    fn parse_union(&mut self) -> Result<Expr, SyntaxError> {
        let mut left = self.parse_path()?;

        while self.check(&Token::Pipe) {
            self.advance();
            let right = self.parse_path()?;
            left = Expr::binary(BinaryOp::Union, left, right);
        }

        Ok(left)
    }

    /// Parses a path, handling the absolute form where a leading `/` or
    /// `//` has no left operand.
    fn parse_path(&mut self) -> Result<Expr, SyntaxError> {
        if let Some(op) = self.peek_path_op() {
            self.advance();

            let relative = if self.at_step_start() {
                Some(Box::new(self.parse_relative_path()?))
            } else if op == PathOp::Slash {
                // The bare root path `/` is the only legal empty-relative
                // case.
                None
            } else {
                return Err(self.error("expected a step after '//'"));
            };

            return Ok(Expr::AbsolutePath { op, relative });
        }

        self.parse_relative_path()
    }

    /// Parses: relative_path → step (("/" | "//") step)*
    fn parse_relative_path(&mut self) -> Result<Expr, SyntaxError> {
        let mut left = self.parse_step()?;

        while let Some(op) = self.peek_path_op() {
            self.advance();
            let right = self.parse_step()?;
            left = Expr::binary(op.into(), left, right);
        }

        Ok(left)
    }

    /// Returns the path operator at the current position, if any.
    fn peek_path_op(&self) -> Option<PathOp> {
        match self.peek() {
            Some(Token::Slash) => Some(PathOp::Slash),
            Some(Token::DoubleSlash) => Some(PathOp::DoubleSlash),
            _ => None,
        }
    }

    /// True if the current token can begin a location step.
    fn at_step_start(&self) -> bool {
        matches!(
            self.peek(),
            Some(
                Token::NCName(_)
                    | Token::QName { .. }
                    | Token::AxisName(_)
                    | Token::NodeType(_)
                    | Token::Wildcard
                    | Token::At
                    | Token::Dot
                    | Token::DotDot
            )
        )
    }

    /// Parses one location step, falling through to a primary expression
    /// where no step form matches.
    fn parse_step(&mut self) -> Result<Expr, SyntaxError> {
        match self.peek() {
            Some(Token::Dot) => {
                self.advance();
                Ok(Expr::Abbreviated(AbbreviatedStep::Current))
            }
            Some(Token::DotDot) => {
                self.advance();
                Ok(Expr::Abbreviated(AbbreviatedStep::Parent))
            }
            Some(Token::At) => {
                self.advance();
                self.parse_step_body(Some(Axis::Attr))
            }
            Some(Token::AxisName(_)) => {
                let Some(Token::AxisName(name)) = self.take() else {
                    unreachable!("peeked an axis name");
                };
                self.parse_step_body(Some(Axis::Named(name)))
            }
            // A name directly before `(` is a function call, not a step.
            Some(Token::NCName(_)) if self.next_is(&Token::LParen) => self.parse_primary(),
            Some(
                Token::NCName(_) | Token::QName { .. } | Token::Wildcard | Token::NodeType(_),
            ) => self.parse_step_body(None),
            _ => self.parse_primary(),
        }
    }

    /// Parses a node test and predicates for a step on the given axis.
    fn parse_step_body(&mut self, axis: Option<Axis>) -> Result<Expr, SyntaxError> {
        let node_test = self.parse_node_test()?;
        let predicates = self.parse_predicates()?;
        Ok(Expr::Step(Step {
            axis,
            node_test,
            predicates,
        }))
    }

    /// Parses a node test: a (possibly prefixed or wildcard) name, or a
    /// node-type test with its parentheses.
    fn parse_node_test(&mut self) -> Result<NodeTest, SyntaxError> {
        match self.take() {
            Some(Token::NCName(name)) => Ok(NodeTest::Name { prefix: None, name }),
            Some(Token::QName { prefix, local }) => Ok(NodeTest::Name {
                prefix: Some(prefix),
                name: local,
            }),
            Some(Token::Wildcard) => Ok(NodeTest::Name {
                prefix: None,
                name: "*".to_string(),
            }),
            Some(Token::NodeType(name)) => {
                self.expect(&Token::LParen, "expected '(' after node type")?;

                let literal = match self.peek() {
                    Some(Token::Literal { .. }) => {
                        let Some(Token::Literal { value, quote }) = self.take() else {
                            unreachable!("peeked a literal");
                        };
                        Some(Literal { value, quote })
                    }
                    _ => None,
                };

                // Only processing-instruction() takes a target literal.
                if literal.is_some() && name != "processing-instruction" {
                    return Err(SyntaxError::new(
                        format!("node type '{name}()' takes no argument"),
                        self.current_offset(),
                    ));
                }

                self.expect(&Token::RParen, "expected ')' to close node type test")?;
                Ok(NodeTest::NodeType { name, literal })
            }
            Some(token) => Err(SyntaxError::new(
                format!("expected a node test, found {token:?}"),
                self.previous_offset(),
            )),
            None => Err(SyntaxError::new(
                "expected a node test, found end of expression",
                None,
            )),
        }
    }

    /// Parses zero or more `[expr]` predicates.
    fn parse_predicates(&mut self) -> Result<Vec<Expr>, SyntaxError> {
        let mut predicates = Vec::new();

        while self.check(&Token::LBracket) {
            self.advance();
            let expr = self.parse_expr()?;
            self.expect(&Token::RBracket, "expected ']' to close predicate")?;
            predicates.push(expr);
        }

        Ok(predicates)
    }

    /// Parses a primary expression, then attaches any trailing predicates
    /// as an [`Expr::Predicated`].
    fn parse_primary(&mut self) -> Result<Expr, SyntaxError> {
        let base = match self.peek() {
            Some(Token::Dollar) => {
                self.advance();
                self.parse_variable()?
            }
            Some(Token::LParen) => {
                self.advance();
                let inner = self.parse_expr()?;
                self.expect(&Token::RParen, "expected ')' to close group")?;
                inner
            }
            Some(Token::Literal { .. }) => {
                let Some(Token::Literal { value, quote }) = self.take() else {
                    unreachable!("peeked a literal");
                };
                Expr::Literal(Literal { value, quote })
            }
            Some(Token::Number(_)) => {
                let Some(Token::Number(text)) = self.take() else {
                    unreachable!("peeked a number");
                };
                Expr::Number(text)
            }
            Some(Token::NCName(_)) if self.next_is(&Token::LParen) => {
                self.parse_function_call()?
            }
            Some(token) => {
                return Err(SyntaxError::new(
                    format!("expected an operand, found {token:?}"),
                    self.current_offset(),
                ));
            }
            None => {
                return Err(SyntaxError::new(
                    "unexpected end of expression",
                    None,
                ));
            }
        };

        let predicates = self.parse_predicates()?;
        if predicates.is_empty() {
            Ok(base)
        } else {
            Ok(Expr::Predicated {
                base: Box::new(base),
                predicates,
            })
        }
    }

    /// Parses the name of a variable reference; the `$` is already
    /// consumed.
    fn parse_variable(&mut self) -> Result<Expr, SyntaxError> {
        match self.take() {
            Some(Token::NCName(name)) => Ok(Expr::Variable { prefix: None, name }),
            Some(Token::QName { prefix, local }) => Ok(Expr::Variable {
                prefix: Some(prefix),
                name: local,
            }),
            Some(token) => Err(SyntaxError::new(
                format!("expected a variable name after '$', found {token:?}"),
                self.previous_offset(),
            )),
            None => Err(SyntaxError::new(
                "expected a variable name after '$'",
                None,
            )),
        }
    }

    /// Parses: NCNAME "(" (expr ("," expr)*)? ")"
    fn parse_function_call(&mut self) -> Result<Expr, SyntaxError> {
        let Some(Token::NCName(name)) = self.take() else {
            unreachable!("caller checked for a name before '('");
        };
        self.expect(&Token::LParen, "expected '(' after function name")?;

        let mut args = Vec::new();
        if !self.check(&Token::RParen) {
            loop {
                args.push(self.parse_expr()?);
                if self.check(&Token::Comma) {
                    self.advance();
                } else {
                    break;
                }
            }
        }

        self.expect(&Token::RParen, "expected ')' to close function call")?;
        Ok(Expr::FunctionCall { name, args })
    }

    /// Returns the current token without consuming it.
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.position).map(|t| &t.token)
    }

    /// Returns the token after the current one without consuming anything.
    fn next_is(&self, token: &Token) -> bool {
        self.tokens
            .get(self.position + 1)
            .is_some_and(|t| mem::discriminant(&t.token) == mem::discriminant(token))
    }

    /// Checks if the current token matches the given token kind.
    fn check(&self, token: &Token) -> bool {
        self.peek()
            .is_some_and(|t| mem::discriminant(t) == mem::discriminant(token))
    }

    /// Consumes and returns the current token.
    fn take(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.position).map(|t| t.token.clone());
        if token.is_some() {
            self.position += 1;
        }
        token
    }

    /// Advances past the current token.
    fn advance(&mut self) {
        if self.position < self.tokens.len() {
            self.position += 1;
        }
    }

    /// Consumes the expected token or fails with the given message.
    fn expect(&mut self, token: &Token, message: &str) -> Result<(), SyntaxError> {
        if !self.check(token) {
            return Err(self.error(message));
        }
        self.advance();
        Ok(())
    }

    /// Byte offset of the current token, if any.
    fn current_offset(&self) -> Option<usize> {
        self.tokens.get(self.position).map(|t| t.offset)
    }

    /// Byte offset of the most recently consumed token.
    fn previous_offset(&self) -> Option<usize> {
        self.position
            .checked_sub(1)
            .and_then(|i| self.tokens.get(i))
            .map(|t| t.offset)
    }

    /// Creates an error at the current token.
    fn error(&self, message: impl Into<String>) -> SyntaxError {
        SyntaxError::new(message, self.current_offset())
    }
}

/// Parses an XPath expression string into an AST.
///
/// Parsing is all-or-nothing: any lexical or structural problem fails the
/// whole call and no partial AST is returned.
pub fn parse(input: &str) -> Result<Expr, Error> {
    parse_with_limit(input, DEFAULT_MAX_DEPTH)
}

/// Parses with an explicit bound on expression nesting depth.
///
/// Nesting past `max_depth` levels of parentheses, predicates, or function
/// arguments fails fast with a syntax error instead of overflowing the
/// call stack.
pub fn parse_with_limit(input: &str, max_depth: usize) -> Result<Expr, Error> {
    let tokens = tokenize(input)?;
    Parser::new(tokens, max_depth).parse().map_err(Error::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Quote;

    fn name_test(name: &str) -> Expr {
        Expr::Step(Step {
            axis: None,
            node_test: NodeTest::Name {
                prefix: None,
                name: name.into(),
            },
            predicates: vec![],
        })
    }

    fn step(axis: Option<Axis>, node_test: NodeTest, predicates: Vec<Expr>) -> Expr {
        Expr::Step(Step {
            axis,
            node_test,
            predicates,
        })
    }

    fn nt_name(prefix: Option<&str>, name: &str) -> NodeTest {
        NodeTest::Name {
            prefix: prefix.map(Into::into),
            name: name.into(),
        }
    }

    fn binary(op: BinaryOp, left: Expr, right: Expr) -> Expr {
        Expr::binary(op, left, right)
    }

    fn number(text: &str) -> Expr {
        Expr::Number(text.into())
    }

    #[test]
    fn nametest_step() {
        assert_eq!(parse("author").unwrap(), name_test("author"));
    }

    #[test]
    fn nodetype_step() {
        assert_eq!(
            parse("text()").unwrap(),
            step(
                None,
                NodeTest::NodeType {
                    name: "text".into(),
                    literal: None
                },
                vec![]
            )
        );
    }

    #[test]
    fn axis_step() {
        assert_eq!(
            parse("ancestor::lib:book").unwrap(),
            step(
                Some(Axis::Named("ancestor".into())),
                nt_name(Some("lib"), "book"),
                vec![]
            )
        );
    }

    #[test]
    fn attribute_shorthand() {
        assert_eq!(
            parse("@xml:lang").unwrap(),
            step(Some(Axis::Attr), nt_name(Some("xml"), "lang"), vec![])
        );
    }

    #[test]
    fn relative_path_is_left_associative() {
        // book//author/first-name parses as (book//author)/first-name.
        assert_eq!(
            parse("book//author/first-name").unwrap(),
            binary(
                BinaryOp::Slash,
                binary(
                    BinaryOp::DoubleSlash,
                    name_test("book"),
                    name_test("author")
                ),
                name_test("first-name")
            )
        );
    }

    #[test]
    fn absolute_path() {
        assert_eq!(
            parse("/book//author").unwrap(),
            Expr::AbsolutePath {
                op: PathOp::Slash,
                relative: Some(Box::new(binary(
                    BinaryOp::DoubleSlash,
                    name_test("book"),
                    name_test("author")
                ))),
            }
        );
    }

    #[test]
    fn bare_root_path() {
        assert_eq!(
            parse("/").unwrap(),
            Expr::AbsolutePath {
                op: PathOp::Slash,
                relative: None,
            }
        );
    }

    #[test]
    fn bare_descendant_path_is_an_error() {
        assert!(parse("//").is_err());
    }

    #[test]
    fn step_predicate() {
        assert_eq!(
            parse("book[author]").unwrap(),
            step(None, nt_name(None, "book"), vec![name_test("author")])
        );
    }

    #[test]
    fn chained_predicates_preserve_order() {
        assert_eq!(
            parse("a[b][1]").unwrap(),
            step(
                None,
                nt_name(None, "a"),
                vec![name_test("b"), number("1")]
            )
        );
    }

    #[test]
    fn function_in_predicate() {
        // author[position() = 1]
        let expr = parse("author[position() = 1]").unwrap();
        assert_eq!(
            expr,
            step(
                None,
                nt_name(None, "author"),
                vec![binary(
                    BinaryOp::Eq,
                    Expr::FunctionCall {
                        name: "position".into(),
                        args: vec![]
                    },
                    number("1")
                )]
            )
        );
    }

    #[test]
    fn function_with_variable_argument() {
        let expr = parse(r#"title[substring-after(text(), $pre:separator) = "world"]"#).unwrap();
        assert_eq!(
            expr,
            step(
                None,
                nt_name(None, "title"),
                vec![binary(
                    BinaryOp::Eq,
                    Expr::FunctionCall {
                        name: "substring-after".into(),
                        args: vec![
                            step(
                                None,
                                NodeTest::NodeType {
                                    name: "text".into(),
                                    literal: None
                                },
                                vec![]
                            ),
                            Expr::Variable {
                                prefix: Some("pre".into()),
                                name: "separator".into()
                            },
                        ]
                    },
                    Expr::Literal(Literal::new("world", Quote::Double))
                )]
            )
        );
    }

    #[test]
    fn predicated_expression() {
        // (book or article)[author]
        assert_eq!(
            parse("(book or article)[author]").unwrap(),
            Expr::Predicated {
                base: Box::new(binary(
                    BinaryOp::Or,
                    name_test("book"),
                    name_test("article")
                )),
                predicates: vec![name_test("author")],
            }
        );
    }

    #[test]
    fn group_without_predicates_is_transparent() {
        assert_eq!(
            parse("(a or b)").unwrap(),
            binary(BinaryOp::Or, name_test("a"), name_test("b"))
        );
    }

    #[test]
    fn triple_star_is_wildcard_times_wildcard() {
        let wildcard = || name_test("*");
        assert_eq!(
            parse("***").unwrap(),
            binary(BinaryOp::Mul, wildcard(), wildcard())
        );
    }

    #[test]
    fn div_div_div() {
        assert_eq!(
            parse("div div div").unwrap(),
            binary(BinaryOp::Div, name_test("div"), name_test("div"))
        );
    }

    #[test]
    fn div_prefixed_div() {
        assert_eq!(
            parse("div:div").unwrap(),
            step(None, nt_name(Some("div"), "div"), vec![])
        );
    }

    #[test]
    fn node_name_vs_node_type() {
        assert_eq!(
            parse("node/node()").unwrap(),
            binary(
                BinaryOp::Slash,
                name_test("node"),
                step(
                    None,
                    NodeTest::NodeType {
                        name: "node".into(),
                        literal: None
                    },
                    vec![]
                )
            )
        );
    }

    #[test]
    fn function_name_shadows_argument_name() {
        // boolean(boolean): a call whose argument is a plain step.
        assert_eq!(
            parse("boolean(boolean)").unwrap(),
            Expr::FunctionCall {
                name: "boolean".into(),
                args: vec![name_test("boolean")],
            }
        );
    }

    #[test]
    fn axis_vs_qname_with_same_spelling() {
        assert_eq!(
            parse("parent::parent/parent:parent").unwrap(),
            binary(
                BinaryOp::Slash,
                step(
                    Some(Axis::Named("parent".into())),
                    nt_name(None, "parent"),
                    vec![]
                ),
                step(None, nt_name(Some("parent"), "parent"), vec![])
            )
        );
    }

    #[test]
    fn unary_minus_binds_tighter_than_multiplication() {
        // .//a/@val[0]*-5
        let path = binary(
            BinaryOp::Slash,
            binary(
                BinaryOp::DoubleSlash,
                Expr::Abbreviated(AbbreviatedStep::Current),
                name_test("a"),
            ),
            step(Some(Axis::Attr), nt_name(None, "val"), vec![number("0")]),
        );
        assert_eq!(
            parse(".//a/@val[0]*-5").unwrap(),
            binary(
                BinaryOp::Mul,
                path,
                Expr::Negate(Box::new(number("5")))
            )
        );
    }

    #[test]
    fn repeated_negation_nests() {
        assert_eq!(
            parse("--5").unwrap(),
            Expr::Negate(Box::new(Expr::Negate(Box::new(number("5")))))
        );
    }

    #[test]
    fn union_of_paths() {
        assert_eq!(
            parse("a|/b").unwrap(),
            binary(
                BinaryOp::Union,
                name_test("a"),
                Expr::AbsolutePath {
                    op: PathOp::Slash,
                    relative: Some(Box::new(name_test("b"))),
                }
            )
        );
    }

    #[test]
    fn variable_comparison_in_predicate() {
        assert_eq!(
            parse("a[@b<$threshold]").unwrap(),
            step(
                None,
                nt_name(None, "a"),
                vec![binary(
                    BinaryOp::Lt,
                    step(Some(Axis::Attr), nt_name(None, "b"), vec![]),
                    Expr::Variable {
                        prefix: None,
                        name: "threshold".into()
                    }
                )]
            )
        );
    }

    #[test]
    fn keyword_operator_precedence() {
        // *[position() mod 2=1]: mod binds tighter than =.
        assert_eq!(
            parse("*[position() mod 2=1]").unwrap(),
            step(
                None,
                nt_name(None, "*"),
                vec![binary(
                    BinaryOp::Eq,
                    binary(
                        BinaryOp::Mod,
                        Expr::FunctionCall {
                            name: "position".into(),
                            args: vec![]
                        },
                        number("2")
                    ),
                    number("1")
                )]
            )
        );
    }

    #[test]
    fn processing_instruction_with_target() {
        assert_eq!(
            parse("processing-instruction('target')").unwrap(),
            step(
                None,
                NodeTest::NodeType {
                    name: "processing-instruction".into(),
                    literal: Some(Literal::new("target", Quote::Single)),
                },
                vec![]
            )
        );
    }

    #[test]
    fn literal_argument_rejected_for_other_node_types() {
        let err = parse("text('x')").unwrap_err();
        assert!(err.to_string().contains("takes no argument"));
    }

    #[test]
    fn incomplete_function_call_fails() {
        assert!(parse("bogus-(").is_err());
        assert!(parse("/bogus-(").is_err());
    }

    #[test]
    fn empty_expression_fails() {
        assert!(parse("").is_err());
        assert!(parse("   ").is_err());
    }

    #[test]
    fn trailing_operator_fails() {
        assert!(parse("a or").is_err());
        assert!(parse("a/").is_err());
        assert!(parse("a |").is_err());
    }

    #[test]
    fn unbalanced_brackets_fail() {
        assert!(parse("(a").is_err());
        assert!(parse("a)").is_err());
        assert!(parse("a[b").is_err());
        assert!(parse("a]").is_err());
    }

    #[test]
    fn leftover_tokens_fail() {
        let err = parse("a b").unwrap_err();
        assert!(err.to_string().contains("after complete expression"));
    }

    #[test]
    fn dollar_without_name_fails() {
        let err = parse("$1").unwrap_err();
        assert!(err.to_string().contains("variable name"));
    }

    #[test]
    fn error_positions_are_byte_offsets() {
        let err = parse("a[]").unwrap_err();
        assert_eq!(err.position(), Some(2));
    }

    #[test]
    fn depth_limit_is_enforced() {
        assert!(parse_with_limit("((((a))))", 3).is_err());
        assert!(parse_with_limit("((((a))))", 16).is_ok());
    }

    #[test]
    fn default_depth_limit_rejects_pathological_nesting() {
        let deep = format!("{}a{}", "(".repeat(10_000), ")".repeat(10_000));
        let err = parse(&deep).unwrap_err();
        assert!(err.to_string().contains("nesting too deep"));
    }
}
