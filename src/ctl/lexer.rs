use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum TokenKind {
    Ident(String),
    And,
    Or,
    Not,
    Ex,
    Ax,
    Ef,
    Af,
    Eg,
    Ag,
    E,
    A,
    U,
    LParen,
    RParen,
    LBracket,
    RBracket,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct Token {
    pub kind: TokenKind,
    pub position: usize,
}

fn keyword(ident: &str) -> Option<TokenKind> {
    Some(match ident {
        "AND" => TokenKind::And,
        "OR" => TokenKind::Or,
        "NOT" => TokenKind::Not,
        "EX" => TokenKind::Ex,
        "AX" => TokenKind::Ax,
        "EF" => TokenKind::Ef,
        "AF" => TokenKind::Af,
        "EG" => TokenKind::Eg,
        "AG" => TokenKind::Ag,
        "E" => TokenKind::E,
        "A" => TokenKind::A,
        "U" => TokenKind::U,
        _ => return None,
    })
}

pub(super) fn lex(input: &str) -> Result<Vec<Token>> {
    let bytes = input.as_bytes();
    let mut tokens = Vec::new();
    let mut pos = 0;
    while pos < bytes.len() {
        let c = bytes[pos] as char;
        if c.is_whitespace() {
            pos += 1;
            continue;
        }
        match c {
            '(' => {
                tokens.push(Token { kind: TokenKind::LParen, position: pos });
                pos += 1;
            }
            ')' => {
                tokens.push(Token { kind: TokenKind::RParen, position: pos });
                pos += 1;
            }
            '[' => {
                tokens.push(Token { kind: TokenKind::LBracket, position: pos });
                pos += 1;
            }
            ']' => {
                tokens.push(Token { kind: TokenKind::RBracket, position: pos });
                pos += 1;
            }
            _ if c == '_' || c.is_ascii_alphabetic() => {
                let start = pos;
                while pos < bytes.len() {
                    let c = bytes[pos] as char;
                    if c == '_' || c.is_ascii_alphanumeric() {
                        pos += 1;
                    } else {
                        break;
                    }
                }
                let ident = &input[start..pos];
                let kind = keyword(ident).unwrap_or_else(|| TokenKind::Ident(ident.to_string()));
                tokens.push(Token { kind, position: start });
            }
            other => {
                return Err(Error::SyntaxError {
                    position: pos,
                    message: format!("unexpected character '{other}'"),
                });
            }
        }
    }
    Ok(tokens)
}
