//! XPath expression abstract syntax tree.
//!
//! A closed set of node variants covering every construct the grammar can
//! produce. Nodes are pure data: immutable once constructed, no
//! back-references, no shared mutable substructure, safe to walk from any
//! number of threads.

use std::fmt;

use serde::Serialize;

/// The quote character that enclosed a string literal in the source.
///
/// Recorded so re-serialization reproduces the literal exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Quote {
    /// `'`
    Single,
    /// `"`
    Double,
}

impl Quote {
    /// Returns the quote character itself.
    pub fn as_char(self) -> char {
        match self {
            Self::Single => '\'',
            Self::Double => '"',
        }
    }
}

/// A string constant together with its original quote character.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Literal {
    /// The literal's content, without the enclosing quotes.
    pub value: String,
    /// The quote character used in the source.
    pub quote: Quote,
}

impl Literal {
    /// Creates a literal with the given content and quote character.
    pub fn new(value: impl Into<String>, quote: Quote) -> Self {
        Self {
            value: value.into(),
            quote,
        }
    }
}

/// The axis of a step.
///
/// `Named` covers the explicit `axis::` form; `Attr` is the `@` shorthand
/// for the attribute axis. The two serialize differently, so they are kept
/// distinct rather than normalized to one another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Axis {
    /// An explicit axis written as `name::`, e.g. `ancestor::`.
    Named(String),
    /// The `@` attribute-axis shorthand.
    Attr,
}

/// The node test of a step: select by name or by node category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum NodeTest {
    /// A name test, optionally prefixed. The name may be the wildcard `*`.
    Name {
        /// Namespace prefix, if the test was written `prefix:name`.
        prefix: Option<String>,
        /// Local name, or `*` for the wildcard.
        name: String,
    },
    /// A node-type test such as `text()` or `processing-instruction('a')`.
    NodeType {
        /// One of `node`, `text`, `comment`, `processing-instruction`.
        name: String,
        /// Literal argument; only `processing-instruction` may carry one.
        literal: Option<Literal>,
    },
}

/// One traversal step: optional axis, a node test, and its predicates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Step {
    /// The axis, or `None` for the default (child) axis.
    pub axis: Option<Axis>,
    /// What the step selects.
    pub node_test: NodeTest,
    /// Bracketed filters, in source order.
    pub predicates: Vec<Expr>,
}

/// The `.` and `..` step shorthands.
///
/// These are shorthands for `self::node()` and `parent::node()` but must
/// round-trip back to their abbreviated spellings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AbbreviatedStep {
    /// `.` (the context node).
    Current,
    /// `..` (the parent of the context node).
    Parent,
}

/// The operator introducing an absolute path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PathOp {
    /// `/`
    Slash,
    /// `//`
    DoubleSlash,
}

impl PathOp {
    /// The operator's source spelling.
    pub fn lexeme(self) -> &'static str {
        match self {
            Self::Slash => "/",
            Self::DoubleSlash => "//",
        }
    }
}

/// A binary operator, from any level of the precedence ladder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BinaryOp {
    /// `or`
    Or,
    /// `and`
    And,
    /// `=`
    Eq,
    /// `!=`
    Ne,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `div`
    Div,
    /// `mod`
    Mod,
    /// `|`
    Union,
    /// `/`
    Slash,
    /// `//`
    DoubleSlash,
}

impl BinaryOp {
    /// The operator's source spelling.
    pub fn lexeme(self) -> &'static str {
        match self {
            Self::Or => "or",
            Self::And => "and",
            Self::Eq => "=",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "div",
            Self::Mod => "mod",
            Self::Union => "|",
            Self::Slash => "/",
            Self::DoubleSlash => "//",
        }
    }

    /// True for the alphabetic operators, which need surrounding spaces so
    /// they do not fuse with adjacent names.
    pub fn is_keyword(self) -> bool {
        matches!(self, Self::Or | Self::And | Self::Div | Self::Mod)
    }
}

impl From<PathOp> for BinaryOp {
    fn from(op: PathOp) -> Self {
        match op {
            PathOp::Slash => Self::Slash,
            PathOp::DoubleSlash => Self::DoubleSlash,
        }
    }
}

/// A parsed XPath expression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Expr {
    /// A single step, e.g. `author` or `ancestor::lib:book[1]`.
    Step(Step),

    /// The `.` or `..` shorthand.
    Abbreviated(AbbreviatedStep),

    /// A path anchored at the document root: `/...` or `//...`.
    ///
    /// `relative` is `None` only for the bare root path `/`.
    AbsolutePath {
        /// The leading path operator.
        op: PathOp,
        /// The rest of the path, if any.
        relative: Option<Box<Expr>>,
    },

    /// A binary expression. Chains are strictly left-associative for every
    /// operator, path operators included: `a/b/c` is `(a/b)/c`.
    Binary {
        /// The operator.
        op: BinaryOp,
        /// Left operand.
        left: Box<Expr>,
        /// Right operand.
        right: Box<Expr>,
    },

    /// Unary negation, `-expr`.
    Negate(Box<Expr>),

    /// A non-step primary followed by one or more predicates, e.g.
    /// `(book or article)[author]`.
    Predicated {
        /// The filtered expression.
        base: Box<Expr>,
        /// Bracketed filters, in source order.
        predicates: Vec<Expr>,
    },

    /// A function call, e.g. `substring-after(., ':')`.
    FunctionCall {
        /// The function name.
        name: String,
        /// Arguments, in source order.
        args: Vec<Expr>,
    },

    /// A variable reference, `$name` or `$prefix:name`.
    Variable {
        /// Namespace prefix, if any.
        prefix: Option<String>,
        /// Variable name.
        name: String,
    },

    /// A quoted string constant.
    Literal(Literal),

    /// A numeric constant, kept as its original source text.
    Number(String),
}

impl Expr {
    /// Creates a binary expression node.
    pub fn binary(op: BinaryOp, left: Self, right: Self) -> Self {
        Self::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Formats the expression as an indented tree at the given depth.
    fn fmt_tree(&self, f: &mut fmt::Formatter<'_>, indent: usize) -> fmt::Result {
        let prefix = "  ".repeat(indent);
        match self {
            Self::Step(step) => {
                let axis = match &step.axis {
                    Some(Axis::Named(name)) => format!("{name}::"),
                    Some(Axis::Attr) => "@".to_string(),
                    None => String::new(),
                };
                match &step.node_test {
                    NodeTest::Name { prefix: p, name } => {
                        let qualified = match p {
                            Some(p) => format!("{p}:{name}"),
                            None => name.clone(),
                        };
                        writeln!(f, "{prefix}Step({axis}{qualified})")?;
                    }
                    NodeTest::NodeType { name, literal } => {
                        let arg = match literal {
                            Some(lit) => format!("{:?}", lit.value),
                            None => String::new(),
                        };
                        writeln!(f, "{prefix}Step({axis}{name}({arg}))")?;
                    }
                }
                for pred in &step.predicates {
                    writeln!(f, "{prefix}  Predicate")?;
                    pred.fmt_tree(f, indent + 2)?;
                }
                Ok(())
            }
            Self::Abbreviated(AbbreviatedStep::Current) => writeln!(f, "{prefix}Step(.)"),
            Self::Abbreviated(AbbreviatedStep::Parent) => writeln!(f, "{prefix}Step(..)"),
            Self::AbsolutePath { op, relative } => {
                writeln!(f, "{prefix}AbsolutePath({})", op.lexeme())?;
                if let Some(relative) = relative {
                    relative.fmt_tree(f, indent + 1)?;
                }
                Ok(())
            }
            Self::Binary { op, left, right } => {
                writeln!(f, "{prefix}Binary({})", op.lexeme())?;
                left.fmt_tree(f, indent + 1)?;
                right.fmt_tree(f, indent + 1)
            }
            Self::Negate(inner) => {
                writeln!(f, "{prefix}Negate")?;
                inner.fmt_tree(f, indent + 1)
            }
            Self::Predicated { base, predicates } => {
                writeln!(f, "{prefix}Predicated")?;
                base.fmt_tree(f, indent + 1)?;
                for pred in predicates {
                    writeln!(f, "{prefix}  Predicate")?;
                    pred.fmt_tree(f, indent + 2)?;
                }
                Ok(())
            }
            Self::FunctionCall { name, args } => {
                writeln!(f, "{prefix}FunctionCall({name})")?;
                for arg in args {
                    arg.fmt_tree(f, indent + 1)?;
                }
                Ok(())
            }
            Self::Variable { prefix: p, name } => match p {
                Some(p) => writeln!(f, "{prefix}Variable(${p}:{name})"),
                None => writeln!(f, "{prefix}Variable(${name})"),
            },
            Self::Literal(lit) => writeln!(f, "{prefix}Literal({:?})", lit.value),
            Self::Number(text) => writeln!(f, "{prefix}Number({text})"),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_tree(f, 0)
    }
}
