//! Filter lexer.
//!
//! Splits a filter string into [`Token`]s. The grammar is ASCII apart from
//! the contents of string literals, so the scanner works on bytes and only
//! decodes a full `char` when it has to report one.
//!
//! ```text
//! identifier  = [A-Za-z_][A-Za-z0-9_.]*
//! string      = "'" ( [^'] / "''" )* "'"
//! number      = "-"? digit+ ( "." digit+ )?
//! keyword     = and / or / not / null / true / false        (case-insensitive)
//! function    = contains / startswith / endswith            (case-insensitive)
//! operator    = eq / ne / gt / ge / lt / le                 (case-insensitive)
//!             / "=" / "!=" / ">" / ">=" / "<" / "<="
//!             / "~" / "!~" / "?=" / "?!="
//! ```

use tracing::trace;

use super::token::{Token, TokenKind};
use crate::error::{LexError, LexErrorKind};

/// Tokenizes `input`. The returned stream always ends with an [`TokenKind::Eof`]
/// token whose offset is `input.len()`.
pub fn tokenize(input: &str) -> Result<Vec<Token<'_>>, LexError> {
    let tokens = Lexer::new(input).run()?;
    trace!(count = tokens.len(), tokens = ?tokens, "tokenized filter");
    Ok(tokens)
}

struct Lexer<'a> {
    input: &'a str,
    bytes: &'a [u8],
    pos: usize,
    tokens: Vec<Token<'a>>,
}

impl<'a> Lexer<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            bytes: input.as_bytes(),
            pos: 0,
            tokens: Vec::new(),
        }
    }

    fn run(mut self) -> Result<Vec<Token<'a>>, LexError> {
        loop {
            self.skip_whitespace();
            let Some(b) = self.peek() else {
                break;
            };
            let start = self.pos;
            match b {
                b'(' => self.single(TokenKind::LeftParen),
                b')' => self.single(TokenKind::RightParen),
                b',' => self.single(TokenKind::Comma),
                b'\'' => self.read_string()?,
                b'0'..=b'9' => self.read_number(),
                b'-' if self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) => self.read_number(),
                b'A'..=b'Z' | b'a'..=b'z' | b'_' => self.read_word(),
                b'=' | b'!' | b'>' | b'<' | b'~' | b'?' => self.read_symbol()?,
                _ => return Err(self.unexpected(start)),
            }
        }
        let end = self.input.len();
        self.tokens.push(Token::new(TokenKind::Eof, "", end));
        Ok(self.tokens)
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn peek_at(&self, ahead: usize) -> Option<u8> {
        self.bytes.get(self.pos + ahead).copied()
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.input[self.pos..].chars().next() {
            if c.is_whitespace() {
                self.pos += c.len_utf8();
            } else {
                break;
            }
        }
    }

    fn push(&mut self, kind: TokenKind, start: usize) {
        self.tokens
            .push(Token::new(kind, &self.input[start..self.pos], start));
    }

    fn single(&mut self, kind: TokenKind) {
        let start = self.pos;
        self.pos += 1;
        self.push(kind, start);
    }

    fn unexpected(&self, offset: usize) -> LexError {
        let c = self.input[offset..].chars().next().unwrap_or('\0');
        LexError {
            offset,
            reason: LexErrorKind::UnexpectedCharacter(c),
        }
    }

    /// Reads a single-quoted string. `''` inside the literal is an escaped
    /// quote; the token text keeps the raw form.
    fn read_string(&mut self) -> Result<(), LexError> {
        let start = self.pos;
        self.pos += 1;
        loop {
            match self.peek() {
                None => {
                    return Err(LexError {
                        offset: start,
                        reason: LexErrorKind::UnterminatedString,
                    });
                }
                Some(b'\'') if self.peek_at(1) == Some(b'\'') => self.pos += 2,
                Some(b'\'') => {
                    self.pos += 1;
                    break;
                }
                Some(_) => self.pos += 1,
            }
        }
        self.push(TokenKind::StringLiteral, start);
        Ok(())
    }

    fn read_number(&mut self) {
        let start = self.pos;
        if self.peek() == Some(b'-') {
            self.pos += 1;
        }
        self.skip_digits();
        // A trailing '.' without digits is not part of the number.
        if self.peek() == Some(b'.') && self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) {
            self.pos += 1;
            self.skip_digits();
        }
        self.push(TokenKind::NumberLiteral, start);
    }

    fn skip_digits(&mut self) {
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.pos += 1;
        }
    }

    fn read_word(&mut self) {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == b'_' || c == b'.')
        {
            self.pos += 1;
        }
        let kind = classify_word(&self.input[start..self.pos]);
        self.push(kind, start);
    }

    fn read_symbol(&mut self) -> Result<(), LexError> {
        let start = self.pos;
        let rest = &self.bytes[start..];
        let len = if rest.starts_with(b"?!=") {
            3
        } else if rest.starts_with(b"!=")
            || rest.starts_with(b"!~")
            || rest.starts_with(b">=")
            || rest.starts_with(b"<=")
            || rest.starts_with(b"?=")
        {
            2
        } else if matches!(rest[0], b'=' | b'>' | b'<' | b'~') {
            1
        } else {
            return Err(self.unexpected(start));
        };
        self.pos += len;
        self.push(TokenKind::ComparisonOperator, start);
        Ok(())
    }
}

fn classify_word(word: &str) -> TokenKind {
    match word.to_ascii_lowercase().as_str() {
        "and" => TokenKind::And,
        "or" => TokenKind::Or,
        "not" => TokenKind::Not,
        "null" => TokenKind::NullLiteral,
        "true" | "false" => TokenKind::BooleanLiteral,
        "contains" | "startswith" | "endswith" => TokenKind::FunctionName,
        "eq" | "ne" | "gt" | "ge" | "lt" | "le" => TokenKind::ComparisonOperator,
        _ => TokenKind::Identifier,
    }
}
