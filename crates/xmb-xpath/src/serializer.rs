//! Canonical text form of a parsed expression.
//!
//! Total over the closed AST: serialization never fails. For any
//! expression string accepted by [`parse`](crate::parse), serializing the
//! result reproduces the input exactly (modulo insignificant whitespace
//! around symbolic operators, which the canonical form omits).

use crate::ast::{AbbreviatedStep, Axis, Expr, Literal, NodeTest, Step};

/// Renders an expression back to its canonical string form.
pub fn serialize(expr: &Expr) -> String {
    let mut out = String::new();
    write_expr(&mut out, expr);
    out
}

/// Appends one expression node to the output.
fn write_expr(out: &mut String, expr: &Expr) {
    match expr {
        Expr::Step(step) => write_step(out, step),
        Expr::Abbreviated(AbbreviatedStep::Current) => out.push('.'),
        Expr::Abbreviated(AbbreviatedStep::Parent) => out.push_str(".."),
        Expr::AbsolutePath { op, relative } => {
            out.push_str(op.lexeme());
            if let Some(relative) = relative {
                write_expr(out, relative);
            }
        }
        Expr::Binary { op, left, right } => {
            write_expr(out, left);
            // Alphabetic operators must not fuse with adjacent names;
            // symbolic operators take no surrounding whitespace.
            if op.is_keyword() {
                out.push(' ');
                out.push_str(op.lexeme());
                out.push(' ');
            } else {
                out.push_str(op.lexeme());
            }
            write_expr(out, right);
        }
        Expr::Negate(operand) => {
            out.push('-');
            write_expr(out, operand);
        }
        Expr::Predicated { base, predicates } => {
            out.push('(');
            write_expr(out, base);
            out.push(')');
            write_predicates(out, predicates);
        }
        Expr::FunctionCall { name, args } => {
            out.push_str(name);
            out.push('(');
            for (i, arg) in args.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_expr(out, arg);
            }
            out.push(')');
        }
        Expr::Variable { prefix, name } => {
            out.push('$');
            if let Some(prefix) = prefix {
                out.push_str(prefix);
                out.push(':');
            }
            out.push_str(name);
        }
        Expr::Literal(literal) => write_literal(out, literal),
        Expr::Number(text) => out.push_str(text),
    }
}

/// Appends a step: axis, node test, predicates.
fn write_step(out: &mut String, step: &Step) {
    match &step.axis {
        Some(Axis::Named(name)) => {
            out.push_str(name);
            out.push_str("::");
        }
        Some(Axis::Attr) => out.push('@'),
        None => {}
    }

    match &step.node_test {
        NodeTest::Name { prefix, name } => {
            if let Some(prefix) = prefix {
                out.push_str(prefix);
                out.push(':');
            }
            out.push_str(name);
        }
        NodeTest::NodeType { name, literal } => {
            out.push_str(name);
            out.push('(');
            if let Some(literal) = literal {
                write_literal(out, literal);
            }
            out.push(')');
        }
    }

    write_predicates(out, &step.predicates);
}

/// Appends `[...]` for each predicate, in source order.
fn write_predicates(out: &mut String, predicates: &[Expr]) {
    for predicate in predicates {
        out.push('[');
        write_expr(out, predicate);
        out.push(']');
    }
}

/// Appends a literal with its original quote character.
fn write_literal(out: &mut String, literal: &Literal) {
    let quote = literal.quote.as_char();
    out.push(quote);
    out.push_str(&literal.value);
    out.push(quote);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;

    /// Asserts that parsing and re-serializing reproduces the input.
    fn round_trip(input: &str) {
        let expr = parse(input).unwrap();
        assert_eq!(serialize(&expr), input, "round trip failed for {input:?}");
    }

    #[test]
    fn nametest() {
        round_trip("ancestor::lib:book");
    }

    #[test]
    fn attribute_nametest() {
        round_trip("@xml:lang");
    }

    #[test]
    fn nodetype() {
        round_trip("node()");
    }

    #[test]
    fn processing_instruction_target() {
        round_trip("processing-instruction('xml-stylesheet')");
    }

    #[test]
    fn chained_predicates() {
        round_trip("a[b][1]");
    }

    #[test]
    fn relative_path_with_shorthands() {
        round_trip("a/b//c/*/..//@d");
    }

    #[test]
    fn absolute_path() {
        round_trip("//a/b/c");
    }

    #[test]
    fn bare_root() {
        round_trip("/");
    }

    #[test]
    fn unary_with_multiplication() {
        round_trip(".//a/@val[0]*-5");
    }

    #[test]
    fn predicated_expression() {
        round_trip("(a or b)[2]");
    }

    #[test]
    fn variable_comparison() {
        round_trip("a[@b<$threshold]");
    }

    #[test]
    fn keyword_operator_spacing() {
        round_trip("*[position() mod 2=1]");
    }

    #[test]
    fn function_with_literal_argument() {
        round_trip("substring-after(.,':')");
    }

    #[test]
    fn literal_quote_characters_are_preserved() {
        round_trip("a[.='x']");
        round_trip("a[.=\"x\"]");
    }

    #[test]
    fn number_text_is_preserved() {
        round_trip("a[position()=1.0]");
        round_trip("a[.=.5]");
    }

    #[test]
    fn keyword_operators_get_single_spaces() {
        let expr = parse("a  and   b").unwrap();
        assert_eq!(serialize(&expr), "a and b");

        let expr = parse("6div 2").unwrap();
        assert_eq!(serialize(&expr), "6 div 2");
    }

    #[test]
    fn symbolic_operators_get_no_spaces() {
        let expr = parse("a = 1").unwrap();
        assert_eq!(serialize(&expr), "a=1");

        let expr = parse("a / b").unwrap();
        assert_eq!(serialize(&expr), "a/b");
    }

    #[test]
    fn serialization_is_idempotent() {
        let inputs = [
            "ancestor::lib:book",
            "@xml:lang",
            "node()",
            "a[b][1]",
            "a/b//c/*/..//@d",
            "//a/b/c",
            ".//a/@val[0]*-5",
            "(a or b)[2]",
            "a[@b<$threshold]",
            "*[position() mod 2=1]",
            "substring-after(.,':')",
            "a  and   b",
            "(a or b) and c",
            "-  5 * 2",
        ];

        for input in inputs {
            let once = serialize(&parse(input).unwrap());
            let twice = serialize(&parse(&once).unwrap());
            assert_eq!(once, twice, "serialization unstable for {input:?}");
        }
    }
}
