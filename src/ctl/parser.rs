use super::lexer::{Token, TokenKind};
use super::Ast;
use crate::error::{Error, Result};

pub(super) struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    pub(super) fn new(tokens: Vec<Token>) -> Parser {
        Parser { tokens, pos: 0 }
    }

    pub(super) fn parse_formula(mut self) -> Result<Ast> {
        if self.tokens.is_empty() {
            return Err(Error::SyntaxError { position: 0, message: "empty formula".into() });
        }
        let ast = self.parse_or()?;
        if let Some(tok) = self.peek() {
            return Err(Error::SyntaxError {
                position: tok.position,
                message: format!("unexpected trailing token {:?}", tok.kind),
            });
        }
        Ok(ast)
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<&Token> {
        let tok = self.tokens.get(self.pos);
        self.pos += 1;
        tok
    }

    fn end_position(&self) -> usize {
        self.tokens.last().map(|t| t.position + 1).unwrap_or(0)
    }

    fn expect(&mut self, kind: &TokenKind) -> Result<()> {
        match self.advance() {
            Some(tok) if &tok.kind == kind => Ok(()),
            Some(tok) => Err(Error::SyntaxError {
                position: tok.position,
                message: format!("expected {kind:?}, found {:?}", tok.kind),
            }),
            None => Err(Error::SyntaxError {
                position: self.end_position(),
                message: format!("expected {kind:?}, found end of input"),
            }),
        }
    }

    fn parse_or(&mut self) -> Result<Ast> {
        let mut lhs = self.parse_and()?;
        while matches!(self.peek().map(|t| &t.kind), Some(TokenKind::Or)) {
            self.advance();
            let rhs = self.parse_and()?;
            lhs = Ast::Or(Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_and(&mut self) -> Result<Ast> {
        let mut lhs = self.parse_unary()?;
        while matches!(self.peek().map(|t| &t.kind), Some(TokenKind::And)) {
            self.advance();
            let rhs = self.parse_unary()?;
            lhs = Ast::And(Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> Result<Ast> {
        let kind = match self.peek() {
            Some(tok) => tok.kind.clone(),
            None => {
                return Err(Error::SyntaxError {
                    position: self.end_position(),
                    message: "expected a formula, found end of input".into(),
                })
            }
        };
        match kind {
            TokenKind::Not => {
                self.advance();
                Ok(Ast::Not(Box::new(self.parse_unary()?)))
            }
            TokenKind::Ex => {
                self.advance();
                Ok(Ast::Ex(Box::new(self.parse_unary()?)))
            }
            TokenKind::Ax => {
                self.advance();
                Ok(Ast::Ax(Box::new(self.parse_unary()?)))
            }
            TokenKind::Ef => {
                self.advance();
                Ok(Ast::Ef(Box::new(self.parse_unary()?)))
            }
            TokenKind::Af => {
                self.advance();
                Ok(Ast::Af(Box::new(self.parse_unary()?)))
            }
            TokenKind::Eg => {
                self.advance();
                Ok(Ast::Eg(Box::new(self.parse_unary()?)))
            }
            TokenKind::Ag => {
                self.advance();
                Ok(Ast::Ag(Box::new(self.parse_unary()?)))
            }
            TokenKind::E => {
                self.advance();
                let (lhs, rhs) = self.parse_until_bracket()?;
                Ok(Ast::Eu(Box::new(lhs), Box::new(rhs)))
            }
            TokenKind::A => {
                self.advance();
                let (lhs, rhs) = self.parse_until_bracket()?;
                Ok(Ast::Au(Box::new(lhs), Box::new(rhs)))
            }
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_or()?;
                self.expect(&TokenKind::RParen)?;
                Ok(inner)
            }
            TokenKind::Ident(name) => {
                self.advance();
                Ok(Ast::Atom(name))
            }
            other => Err(Error::SyntaxError {
                position: self.peek().unwrap().position,
                message: format!("unexpected token {other:?}"),
            }),
        }
    }

    /// Parses `"[" expr "U" expr "]"` after the leading `E`/`A` has already
    /// been consumed.
    fn parse_until_bracket(&mut self) -> Result<(Ast, Ast)> {
        self.expect(&TokenKind::LBracket)?;
        let lhs = self.parse_or()?;
        self.expect(&TokenKind::U)?;
        let rhs = self.parse_or()?;
        self.expect(&TokenKind::RBracket)?;
        Ok((lhs, rhs))
    }
}
