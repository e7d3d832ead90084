//! Token types for the filter lexer.

use std::fmt;

/// The kind of a lexical element in a filter expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Literals
    StringLiteral,
    NumberLiteral,
    BooleanLiteral,
    NullLiteral,

    // Identifiers
    Identifier,

    // Operators
    ComparisonOperator,
    And,
    Or,
    Not,
    FunctionName,

    // Delimiters
    LeftParen,  // (
    RightParen, // )
    Comma,      // ,

    // End of input
    Eof,
}

impl TokenKind {
    /// Human readable name used in parse error messages.
    pub fn describe(self) -> &'static str {
        match self {
            TokenKind::StringLiteral => "string literal",
            TokenKind::NumberLiteral => "number literal",
            TokenKind::BooleanLiteral => "boolean literal",
            TokenKind::NullLiteral => "null",
            TokenKind::Identifier => "property name",
            TokenKind::ComparisonOperator => "comparison operator",
            TokenKind::And => "'and'",
            TokenKind::Or => "'or'",
            TokenKind::Not => "'not'",
            TokenKind::FunctionName => "function name",
            TokenKind::LeftParen => "'('",
            TokenKind::RightParen => "')'",
            TokenKind::Comma => "','",
            TokenKind::Eof => "end of input",
        }
    }

    /// Returns true for the kinds that can appear on the right of a comparison.
    pub fn is_literal(self) -> bool {
        matches!(
            self,
            TokenKind::StringLiteral
                | TokenKind::NumberLiteral
                | TokenKind::BooleanLiteral
                | TokenKind::NullLiteral
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

/// A token borrowed from the filter string it was scanned from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    /// Raw source text, including quotes for string literals.
    pub text: &'a str,
    /// Byte offset of the first character.
    pub offset: usize,
}

impl<'a> Token<'a> {
    pub fn new(kind: TokenKind, text: &'a str, offset: usize) -> Self {
        Self { kind, text, offset }
    }

    /// Describes the token for error messages, e.g. `'or'` or `end of input`.
    pub fn describe(&self) -> String {
        match self.kind {
            TokenKind::Identifier
            | TokenKind::ComparisonOperator
            | TokenKind::FunctionName
            | TokenKind::StringLiteral
            | TokenKind::NumberLiteral
            | TokenKind::BooleanLiteral => format!("{} {}", self.kind, quote(self.text)),
            kind => kind.describe().to_string(),
        }
    }
}

fn quote(text: &str) -> String {
    if text.starts_with('\'') {
        text.to_string()
    } else {
        format!("'{}'", text)
    }
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({})@{}", self.kind, self.text, self.offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_eof() {
        let token = Token::new(TokenKind::Eof, "", 12);
        assert_eq!(token.describe(), "end of input");
    }

    #[test]
    fn test_describe_operator() {
        let token = Token::new(TokenKind::Or, "or", 4);
        assert_eq!(token.describe(), "'or'");
        let token = Token::new(TokenKind::Identifier, "age", 0);
        assert_eq!(token.describe(), "property name 'age'");
    }

    #[test]
    fn test_describe_string_literal_keeps_quotes() {
        let token = Token::new(TokenKind::StringLiteral, "'x'", 0);
        assert_eq!(token.describe(), "string literal 'x'");
    }

    #[test]
    fn test_display() {
        let token = Token::new(TokenKind::NumberLiteral, "42", 3);
        assert_eq!(token.to_string(), "NumberLiteral(42)@3");
    }
}
