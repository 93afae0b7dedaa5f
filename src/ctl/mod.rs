//! CTL formula surface syntax: lexer, recursive-descent parser, and AST.
//!
//! Grammar (lowest to highest precedence: `OR`, `AND`, unary
//! modalities/`NOT` right-associative, atoms/parens):
//!
//! ```text
//! expr   := or
//! or     := and ( "OR" and )*
//! and    := unary ( "AND" unary )*
//! unary  := "NOT" unary
//!         | "EX" unary | "AX" unary
//!         | "EF" unary | "AF" unary
//!         | "EG" unary | "AG" unary
//!         | "E" "[" expr "U" expr "]"
//!         | "A" "[" expr "U" expr "]"
//!         | "(" expr ")"
//!         | IDENT
//! IDENT  := [A-Za-z_][A-Za-z0-9_]*
//! ```

mod lexer;
mod parser;

use std::fmt;

/// A parsed CTL formula.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ast {
    Atom(String),
    Not(Box<Ast>),
    And(Box<Ast>, Box<Ast>),
    Or(Box<Ast>, Box<Ast>),
    Ex(Box<Ast>),
    Ax(Box<Ast>),
    Ef(Box<Ast>),
    Af(Box<Ast>),
    Eg(Box<Ast>),
    Ag(Box<Ast>),
    Eu(Box<Ast>, Box<Ast>),
    Au(Box<Ast>, Box<Ast>),
}

impl fmt::Display for Ast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ast::Atom(name) => write!(f, "{name}"),
            Ast::Not(a) => write!(f, "NOT {a}"),
            Ast::And(a, b) => write!(f, "({a} AND {b})"),
            Ast::Or(a, b) => write!(f, "({a} OR {b})"),
            Ast::Ex(a) => write!(f, "EX {a}"),
            Ast::Ax(a) => write!(f, "AX {a}"),
            Ast::Ef(a) => write!(f, "EF {a}"),
            Ast::Af(a) => write!(f, "AF {a}"),
            Ast::Eg(a) => write!(f, "EG {a}"),
            Ast::Ag(a) => write!(f, "AG {a}"),
            Ast::Eu(a, b) => write!(f, "E[{a} U {b}]"),
            Ast::Au(a, b) => write!(f, "A[{a} U {b}]"),
        }
    }
}

/// Parses a CTL formula from its concrete syntax.
pub fn parse(input: &str) -> crate::error::Result<Ast> {
    let tokens = lexer::lex(input)?;
    parser::Parser::new(tokens).parse_formula()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn parses_atom() {
        assert_eq!(parse("p").unwrap(), Ast::Atom("p".into()));
    }

    #[test]
    fn parses_precedence() {
        // AND binds tighter than OR.
        let ast = parse("p OR q AND r").unwrap();
        assert_eq!(
            ast,
            Ast::Or(
                Box::new(Ast::Atom("p".into())),
                Box::new(Ast::And(Box::new(Ast::Atom("q".into())), Box::new(Ast::Atom("r".into()))))
            )
        );
    }

    #[test]
    fn parses_nested_modalities_right_associative() {
        let ast = parse("EX AX NOT p").unwrap();
        assert_eq!(
            ast,
            Ast::Ex(Box::new(Ast::Ax(Box::new(Ast::Not(Box::new(Ast::Atom("p".into())))))))
        );
    }

    #[test]
    fn parses_until_operators() {
        let ast = parse("E[q U p]").unwrap();
        assert_eq!(ast, Ast::Eu(Box::new(Ast::Atom("q".into())), Box::new(Ast::Atom("p".into()))));
        let ast = parse("A[q U p]").unwrap();
        assert_eq!(ast, Ast::Au(Box::new(Ast::Atom("q".into())), Box::new(Ast::Atom("p".into()))));
    }

    #[test]
    fn parses_parens() {
        let ast = parse("(p OR q) AND r").unwrap();
        assert_eq!(
            ast,
            Ast::And(
                Box::new(Ast::Or(Box::new(Ast::Atom("p".into())), Box::new(Ast::Atom("q".into())))),
                Box::new(Ast::Atom("r".into()))
            )
        );
    }

    #[test]
    fn whitespace_insensitive() {
        assert_eq!(parse("EF   p").unwrap(), parse("EF p").unwrap());
        assert_eq!(parse("EF\tp\n").unwrap(), parse("EF p").unwrap());
    }

    #[test]
    fn rejects_garbage_with_position() {
        let err = parse("p AND").unwrap_err();
        assert!(matches!(err, Error::SyntaxError { .. }));
    }

    #[test]
    fn rejects_trailing_tokens() {
        let err = parse("p q").unwrap_err();
        assert!(matches!(err, Error::SyntaxError { .. }));
    }

    #[test]
    fn rejects_unclosed_until_bracket() {
        let err = parse("E[p U q").unwrap_err();
        assert!(matches!(err, Error::SyntaxError { .. }));
    }

    #[test]
    fn rejects_empty_input() {
        let err = parse("").unwrap_err();
        assert!(matches!(err, Error::SyntaxError { .. }));
    }
}
