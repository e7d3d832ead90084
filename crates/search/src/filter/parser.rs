//! Recursive-descent parser for filter expressions.
//!
//! # Grammar
//!
//! ```text
//! expression   = orExpr
//! orExpr       = andExpr ( "or" andExpr )*
//! andExpr      = notExpr ( "and" notExpr )*
//! notExpr      = "not" primary / primary
//! primary      = "(" expression ")" / functionCall / comparison
//! functionCall = funcName "(" property "," literal ")"
//! comparison   = property operator literal
//! operator     = comparisonOperator / funcName
//! ```
//!
//! `and` binds tighter than `or`. Chains of the same operator are flattened
//! into a single [`QueryNode::Logical`] node, and parentheses survive as
//! [`QueryNode::Group`].
//!
//! # Example
//!
//! ```ignore
//! let ast = parse_filter("age gt 18 and (status eq 'active' or status eq 'pending')")?;
//! ```

use serde_json::Number;

use super::ast::{ComparisonOperator, FunctionKind, Literal, LogicalOperator, Property, QueryNode};
use super::lexer::tokenize;
use super::token::{Token, TokenKind};
use crate::error::{FilterError, ParseError};

/// Deepest parenthesis or `not` nesting accepted. Keeps recursion in the
/// parser and the compiler bounded.
pub const MAX_DEPTH: usize = 128;

/// Tokenizes and parses a filter string.
pub fn parse_filter(input: &str) -> Result<QueryNode, FilterError> {
    let tokens = tokenize(input)?;
    Ok(parse(&tokens)?)
}

/// Parses a token stream produced by [`tokenize`].
///
/// The whole stream must form one expression; trailing tokens are an error.
pub fn parse(tokens: &[Token<'_>]) -> Result<QueryNode, ParseError> {
    let mut parser = Parser::new(tokens);
    let node = parser.parse_or_expr()?;
    let next = parser.peek();
    if next.kind != TokenKind::Eof {
        return Err(parser.error("'and', 'or' or end of input"));
    }
    Ok(node)
}

struct Parser<'t, 'a> {
    tokens: &'t [Token<'a>],
    pos: usize,
    depth: usize,
    /// Returned by `peek` once the slice is exhausted, so streams that lack a
    /// terminal token still report a sensible position.
    eof: Token<'a>,
}

impl<'t, 'a> Parser<'t, 'a> {
    fn new(tokens: &'t [Token<'a>]) -> Self {
        let end = tokens
            .last()
            .map(|t| t.offset + t.text.len())
            .unwrap_or(0);
        Self {
            tokens,
            pos: 0,
            depth: 0,
            eof: Token::new(TokenKind::Eof, "", end),
        }
    }

    fn peek(&self) -> &Token<'a> {
        self.tokens.get(self.pos).unwrap_or(&self.eof)
    }

    fn advance(&mut self) -> Token<'a> {
        let token = self.peek().clone();
        if token.kind != TokenKind::Eof {
            self.pos += 1;
        }
        token
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token<'a>, ParseError> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.error(kind.describe()))
        }
    }

    /// Builds an error at the current token.
    fn error(&self, expected: &str) -> ParseError {
        let found = self.peek();
        ParseError {
            offset: found.offset,
            expected: expected.to_string(),
            found: found.describe(),
        }
    }

    /// Enters one level of nesting, failing at the current token once
    /// [`MAX_DEPTH`] is reached.
    fn descend(&mut self) -> Result<(), ParseError> {
        if self.depth >= MAX_DEPTH {
            return Err(self.error("shallower nesting"));
        }
        self.depth += 1;
        Ok(())
    }

    fn parse_or_expr(&mut self) -> Result<QueryNode, ParseError> {
        let mut operands = vec![self.parse_and_expr()?];
        while self.check(TokenKind::Or) {
            self.advance();
            operands.push(self.parse_and_expr()?);
        }
        Ok(fold(LogicalOperator::Or, operands))
    }

    fn parse_and_expr(&mut self) -> Result<QueryNode, ParseError> {
        let mut operands = vec![self.parse_not_expr()?];
        while self.check(TokenKind::And) {
            self.advance();
            operands.push(self.parse_not_expr()?);
        }
        Ok(fold(LogicalOperator::And, operands))
    }

    fn parse_not_expr(&mut self) -> Result<QueryNode, ParseError> {
        if self.check(TokenKind::Not) {
            self.descend()?;
            self.advance();
            let operand = self.parse_primary()?;
            self.depth -= 1;
            return Ok(QueryNode::not(operand));
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<QueryNode, ParseError> {
        match self.peek().kind {
            TokenKind::LeftParen => {
                self.descend()?;
                self.advance();
                let inner = self.parse_or_expr()?;
                self.expect(TokenKind::RightParen)?;
                self.depth -= 1;
                Ok(QueryNode::group(inner))
            }
            TokenKind::FunctionName => self.parse_function_call(),
            TokenKind::Identifier => self.parse_comparison(),
            _ => Err(self.error("an expression")),
        }
    }

    fn parse_function_call(&mut self) -> Result<QueryNode, ParseError> {
        let name = self.advance();
        let kind = FunctionKind::parse(name.text).ok_or_else(|| ParseError {
            offset: name.offset,
            expected: "function name".to_string(),
            found: name.describe(),
        })?;
        self.expect(TokenKind::LeftParen)?;
        let property = self.parse_property()?;
        self.expect(TokenKind::Comma)?;
        let value = self.parse_literal()?;
        self.expect(TokenKind::RightParen)?;
        Ok(QueryNode::Function {
            kind,
            arguments: vec![QueryNode::Property(property), QueryNode::Literal(value)],
        })
    }

    fn parse_comparison(&mut self) -> Result<QueryNode, ParseError> {
        let property = self.parse_property()?;
        let operator = self.parse_operator()?;
        let value = self.parse_literal()?;
        Ok(QueryNode::Comparison {
            property,
            operator,
            value,
        })
    }

    fn parse_property(&mut self) -> Result<Property, ParseError> {
        let token = self.expect(TokenKind::Identifier)?;
        Ok(Property::new(token.text))
    }

    fn parse_operator(&mut self) -> Result<ComparisonOperator, ParseError> {
        let token = self.peek();
        let operator = match token.kind {
            TokenKind::ComparisonOperator => ComparisonOperator::parse(token.text),
            TokenKind::FunctionName => FunctionKind::parse(token.text).map(|f| f.operator()),
            _ => None,
        };
        match operator {
            Some(op) => {
                self.advance();
                Ok(op)
            }
            None => Err(self.error("comparison operator")),
        }
    }

    fn parse_literal(&mut self) -> Result<Literal, ParseError> {
        let token = self.peek().clone();
        if !token.kind.is_literal() {
            return Err(self.error("literal"));
        }
        let literal = match token.kind {
            TokenKind::StringLiteral => Literal::String(unquote(token.text)),
            TokenKind::NumberLiteral => match parse_number(token.text) {
                Some(n) => Literal::Number(n),
                None => return Err(self.error("a number within the 64-bit integer range")),
            },
            TokenKind::BooleanLiteral => Literal::Boolean(token.text.eq_ignore_ascii_case("true")),
            _ => Literal::Null,
        };
        self.advance();
        Ok(literal)
    }
}

/// A single operand stands on its own; more become one flat logical node.
fn fold(operator: LogicalOperator, mut operands: Vec<QueryNode>) -> QueryNode {
    if operands.len() == 1 {
        operands.remove(0)
    } else {
        QueryNode::Logical { operator, operands }
    }
}

/// Strips the surrounding quotes and collapses `''` escapes.
fn unquote(text: &str) -> String {
    let inner = text
        .strip_prefix('\'')
        .and_then(|s| s.strip_suffix('\''))
        .unwrap_or(text);
    inner.replace("''", "'")
}

/// Integers must fit in `i64` or `u64`; only decimals become floats.
fn parse_number(text: &str) -> Option<Number> {
    if text.contains('.') {
        return text.parse::<f64>().ok().and_then(Number::from_f64);
    }
    text.parse::<i64>()
        .map(Number::from)
        .or_else(|_| text.parse::<u64>().map(Number::from))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cmp(name: &str, op: ComparisonOperator, value: impl Into<Literal>) -> QueryNode {
        QueryNode::comparison(name, op, value)
    }

    #[test]
    fn test_parse_simple() {
        let node = parse_filter("name eq 'Smith'").unwrap();
        assert_eq!(node, cmp("name", ComparisonOperator::Eq, "Smith"));
    }

    #[test]
    fn test_and_binds_tighter_than_or() {
        let node = parse_filter("a eq 1 or b eq 2 and c eq 3").unwrap();
        assert_eq!(
            node,
            QueryNode::or(vec![
                cmp("a", ComparisonOperator::Eq, 1),
                QueryNode::and(vec![
                    cmp("b", ComparisonOperator::Eq, 2),
                    cmp("c", ComparisonOperator::Eq, 3),
                ]),
            ])
        );
    }

    #[test]
    fn test_chains_are_flattened() {
        let node = parse_filter("a eq 1 and b eq 2 and c eq 3").unwrap();
        match node {
            QueryNode::Logical { operator, operands } => {
                assert_eq!(operator, LogicalOperator::And);
                assert_eq!(operands.len(), 3);
            }
            other => panic!("expected logical node, got {:?}", other),
        }
    }

    #[test]
    fn test_group_preserved() {
        let node = parse_filter("(a eq 1 or b eq 2) and c eq 3").unwrap();
        assert_eq!(
            node,
            QueryNode::and(vec![
                QueryNode::group(QueryNode::or(vec![
                    cmp("a", ComparisonOperator::Eq, 1),
                    cmp("b", ComparisonOperator::Eq, 2),
                ])),
                cmp("c", ComparisonOperator::Eq, 3),
            ])
        );
    }

    #[test]
    fn test_not_applies_to_primary() {
        let node = parse_filter("not a eq 1 and b eq 2").unwrap();
        assert_eq!(
            node,
            QueryNode::and(vec![
                QueryNode::not(cmp("a", ComparisonOperator::Eq, 1)),
                cmp("b", ComparisonOperator::Eq, 2),
            ])
        );
    }

    #[test]
    fn test_function_call_and_infix_form() {
        let call = parse_filter("contains(name, 'oh')").unwrap();
        assert_eq!(call, QueryNode::function(FunctionKind::Contains, "name", "oh"));

        let infix = parse_filter("name contains 'oh'").unwrap();
        assert_eq!(infix, cmp("name", ComparisonOperator::Contains, "oh"));
    }

    #[test]
    fn test_literals() {
        assert_eq!(
            parse_filter("a eq null").unwrap(),
            cmp("a", ComparisonOperator::Eq, Literal::Null)
        );
        assert_eq!(
            parse_filter("a eq FALSE").unwrap(),
            cmp("a", ComparisonOperator::Eq, false)
        );
        assert_eq!(
            parse_filter("a eq 'it''s'").unwrap(),
            cmp("a", ComparisonOperator::Eq, "it's")
        );
        assert_eq!(
            parse_filter("a gt -2.5").unwrap(),
            cmp(
                "a",
                ComparisonOperator::Gt,
                Literal::Number(Number::from_f64(-2.5).unwrap())
            )
        );
    }

    #[test]
    fn test_symbolic_aliases() {
        assert_eq!(
            parse_filter("age >= 18").unwrap(),
            cmp("age", ComparisonOperator::Ge, 18)
        );
        assert_eq!(
            parse_filter("tags ?= 'a,b'").unwrap(),
            cmp("tags", ComparisonOperator::In, "a,b")
        );
    }

    #[test]
    fn test_missing_literal_reports_end_of_input() {
        let err = parse_filter("age gt").unwrap_err();
        match err {
            FilterError::Parse(e) => {
                assert_eq!(e.offset, 6);
                assert_eq!(e.expected, "literal");
                assert_eq!(e.found, "end of input");
            }
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_input() {
        let err = parse_filter("").unwrap_err();
        assert_eq!(err.offset(), 0);
        assert!(err.to_string().contains("expected an expression"));
    }

    #[test]
    fn test_unbalanced_parentheses() {
        let err = parse_filter("(a eq 1").unwrap_err();
        assert_eq!(err.offset(), 7);
        assert!(err.to_string().contains("expected ')'"));

        let err = parse_filter("a eq 1)").unwrap_err();
        assert_eq!(err.offset(), 6);
    }

    #[test]
    fn test_non_property_left_hand_side() {
        let err = parse_filter("'x' eq name").unwrap_err();
        assert_eq!(err.offset(), 0);
        assert!(err.to_string().contains("found string literal 'x'"));
    }

    #[test]
    fn test_unknown_operator() {
        let err = parse_filter("name like 'x'").unwrap_err();
        assert_eq!(err.offset(), 5);
        assert!(err.to_string().contains("expected comparison operator"));
    }

    #[test]
    fn test_trailing_tokens() {
        let err = parse_filter("a eq 1 b eq 2").unwrap_err();
        assert_eq!(err.offset(), 7);
    }

    #[test]
    fn test_display_round_trip() {
        for input in [
            "age gt '18' and (status eq 'active' or status eq 'pending')",
            "not (a eq 1 or b ne null) and startswith(name, 'J')",
            "x ~ 'abc' or y ?!= 'a,b' or z le 3.5",
            "name eq 'O''Brien'",
        ] {
            let ast = parse_filter(input).unwrap();
            let printed = ast.to_string();
            assert_eq!(parse_filter(&printed).unwrap(), ast, "{}", printed);
        }
    }

    #[test]
    fn test_parse_does_not_require_eof_token() {
        let tokens = vec![
            Token::new(TokenKind::Identifier, "a", 0),
            Token::new(TokenKind::ComparisonOperator, "eq", 2),
        ];
        let err = parse(&tokens).unwrap_err();
        assert_eq!(err.offset, 4);
        assert_eq!(err.found, "end of input");
    }

    #[test]
    fn test_nesting_limit() {
        let nested = |depth: usize| format!("{}a eq 1{}", "(".repeat(depth), ")".repeat(depth));

        assert!(parse_filter(&nested(MAX_DEPTH)).is_ok());

        let err = parse_filter(&nested(MAX_DEPTH + 1)).unwrap_err();
        assert_eq!(err.offset(), MAX_DEPTH);
        assert!(err.to_string().contains("shallower nesting"));

        assert!(matches!(parse_filter(&nested(10_000)), Err(FilterError::Parse(_))));
    }

    #[test]
    fn test_not_counts_toward_nesting() {
        let input = format!("{}a eq 1{}", "not (".repeat(MAX_DEPTH), ")".repeat(MAX_DEPTH));
        assert!(matches!(parse_filter(&input), Err(FilterError::Parse(_))));
    }

    #[test]
    fn test_integer_out_of_range() {
        let err = parse_filter("a eq 123456789012345678901234567890").unwrap_err();
        assert_eq!(err.offset(), 5);
        assert!(err.to_string().contains("64-bit integer range"));

        assert_eq!(
            parse_filter("a eq 18446744073709551615").unwrap(),
            cmp("a", ComparisonOperator::Eq, Literal::Number(u64::MAX.into()))
        );
        assert_eq!(
            parse_filter("a eq -9223372036854775808").unwrap(),
            cmp("a", ComparisonOperator::Eq, i64::MIN)
        );
    }

    #[test]
    fn test_large_decimal_round_trips() {
        let ast = parse_filter("a eq 100000000000000000000000.5").unwrap();
        let printed = ast.to_string();
        assert_eq!(parse_filter(&printed).unwrap(), ast, "{}", printed);
    }
}
