//! Tokenizer for custom pricing formulas.
//!
//! Only numbers, identifiers, arithmetic operators, parentheses and commas
//! exist. Any other character (quotes, brackets, braces, dots outside a
//! number, `=`, `:`, `;`, ...) stops tokenizing with an error.

use crate::error::FormulaError;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum TokenKind {
    Number(f64),
    Ident(String),
    Plus,
    Minus,
    Star,
    StarStar,
    Slash,
    SlashSlash,
    Percent,
    Caret,
    LParen,
    RParen,
    Comma,
    End,
}

impl TokenKind {
    /// How the token reads in an error message.
    pub(crate) fn describe(&self) -> String {
        match self {
            TokenKind::Number(n) => format!("number {}", n),
            TokenKind::Ident(name) => format!("name '{}'", name),
            TokenKind::Plus => "'+'".to_string(),
            TokenKind::Minus => "'-'".to_string(),
            TokenKind::Star => "'*'".to_string(),
            TokenKind::StarStar => "'**'".to_string(),
            TokenKind::Slash => "'/'".to_string(),
            TokenKind::SlashSlash => "'//'".to_string(),
            TokenKind::Percent => "'%'".to_string(),
            TokenKind::Caret => "'^'".to_string(),
            TokenKind::LParen => "'('".to_string(),
            TokenKind::RParen => "')'".to_string(),
            TokenKind::Comma => "','".to_string(),
            TokenKind::End => "end of expression".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Token {
    pub kind: TokenKind,
    /// Byte offset into the source.
    pub offset: usize,
}

/// Splits a formula into tokens, ending with [`TokenKind::End`].
pub(crate) fn tokenize(source: &str) -> Result<Vec<Token>, FormulaError> {
    let bytes = source.as_bytes();
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < bytes.len() {
        let offset = pos;
        let b = bytes[pos];

        if b.is_ascii_whitespace() {
            pos += 1;
            continue;
        }

        let next = bytes.get(pos + 1).copied();
        let (kind, len) = match b {
            b'+' => (TokenKind::Plus, 1),
            b'-' => (TokenKind::Minus, 1),
            b'*' if next == Some(b'*') => (TokenKind::StarStar, 2),
            b'*' => (TokenKind::Star, 1),
            b'/' if next == Some(b'/') => (TokenKind::SlashSlash, 2),
            b'/' => (TokenKind::Slash, 1),
            b'%' => (TokenKind::Percent, 1),
            b'^' => (TokenKind::Caret, 1),
            b'(' => (TokenKind::LParen, 1),
            b')' => (TokenKind::RParen, 1),
            b',' => (TokenKind::Comma, 1),
            b'0'..=b'9' => lex_number(source, pos)?,
            b'.' if next.map_or(false, |n| n.is_ascii_digit()) => lex_number(source, pos)?,
            b'a'..=b'z' | b'A'..=b'Z' | b'_' => {
                let len = bytes[pos..]
                    .iter()
                    .take_while(|c| c.is_ascii_alphanumeric() || **c == b'_')
                    .count();
                (TokenKind::Ident(source[pos..pos + len].to_string()), len)
            }
            _ => {
                // Report the full character, not a UTF-8 fragment.
                let ch = source[pos..].chars().next().unwrap_or('\u{FFFD}');
                return Err(FormulaError::UnexpectedChar { ch, offset });
            }
        };

        tokens.push(Token { kind, offset });
        pos += len;
    }

    tokens.push(Token {
        kind: TokenKind::End,
        offset: bytes.len(),
    });
    Ok(tokens)
}

/// Lexes `digits [. digits] [e [+-] digits]` starting at `start`.
fn lex_number(source: &str, start: usize) -> Result<(TokenKind, usize), FormulaError> {
    let bytes = source.as_bytes();
    let digits = |from: usize| bytes[from..].iter().take_while(|c| c.is_ascii_digit()).count();

    let mut end = start + digits(start);
    if bytes.get(end) == Some(&b'.') {
        end += 1;
        end += digits(end);
    }
    if matches!(bytes.get(end), Some(b'e') | Some(b'E')) {
        let mut exp = end + 1;
        if matches!(bytes.get(exp), Some(b'+') | Some(b'-')) {
            exp += 1;
        }
        let exp_digits = digits(exp);
        if exp_digits == 0 {
            return Err(FormulaError::BadNumber {
                text: source[start..exp].to_string(),
                offset: start,
            });
        }
        end = exp + exp_digits;
    }

    let text = &source[start..end];
    let value = text.parse::<f64>().map_err(|_| FormulaError::BadNumber {
        text: text.to_string(),
        offset: start,
    })?;
    Ok((TokenKind::Number(value), end - start))
}
