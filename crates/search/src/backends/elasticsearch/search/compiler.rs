//! Filter AST to Elasticsearch Query DSL.
//!
//! The compiler walks a [`QueryNode`] tree and produces a query clause as a
//! `serde_json::Value`. Every node kind has its own arm; compilation never
//! inspects anything outside the tree, so compiling the same tree twice yields
//! the same JSON.
//!
//! | Filter                     | Query DSL                                          |
//! |----------------------------|----------------------------------------------------|
//! | `f eq v`                   | `term`                                             |
//! | `f ne v`                   | `bool.must_not[term]`                              |
//! | `f gt/ge/lt/le v`          | `range` with `gt/gte/lt/lte`                       |
//! | `f contains v`             | `wildcard *v*`                                     |
//! | `f startswith v`           | `prefix`                                           |
//! | `f endswith v`             | `wildcard *v`                                      |
//! | `f ~ v` / `f !~ v`         | case-insensitive `wildcard *v*` / its negation     |
//! | `f ?= 'a,b'` / `f ?!= ...` | `terms` / its negation                             |
//! | `f eq null` / `f ne null`  | `bool.must_not[exists]` / `exists`                 |
//! | `a.b eq v`                 | `nested` on path `a` around the clause for `a.b`   |

use serde_json::{Value, json};

use crate::error::{SearchError, SearchResult};
use crate::filter::{ComparisonOperator, FunctionKind, Literal, LogicalOperator, Property, QueryNode};

/// Compiles filter trees into Elasticsearch query clauses.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryCompiler;

impl QueryCompiler {
    pub fn new() -> Self {
        Self
    }

    /// Compiles a node into a query clause.
    pub fn compile(&self, node: &QueryNode) -> SearchResult<Value> {
        match node {
            QueryNode::Property(property) => Err(unsupported(
                "property",
                format!("'{}' is not a condition on its own", property),
            )),
            QueryNode::Literal(literal) => Err(unsupported(
                "literal",
                format!("{} is not a condition on its own", literal),
            )),
            QueryNode::Comparison {
                property,
                operator,
                value,
            } => self.compile_comparison(property, *operator, value),
            QueryNode::Logical { operator, operands } => self.compile_logical(*operator, operands),
            QueryNode::Function { kind, arguments } => self.compile_function(*kind, arguments),
            QueryNode::Group(inner) => self.compile(inner),
        }
    }

    fn compile_logical(&self, operator: LogicalOperator, operands: &[QueryNode]) -> SearchResult<Value> {
        let clauses = operands
            .iter()
            .map(|operand| self.compile(operand))
            .collect::<SearchResult<Vec<_>>>()?;

        match operator {
            LogicalOperator::And if !clauses.is_empty() => Ok(json!({ "bool": { "must": clauses } })),
            LogicalOperator::Or if !clauses.is_empty() => Ok(json!({
                "bool": {
                    "should": clauses,
                    "minimum_should_match": 1
                }
            })),
            LogicalOperator::Not if clauses.len() == 1 => Ok(json!({ "bool": { "must_not": clauses } })),
            LogicalOperator::Not => Err(unsupported(
                "not",
                format!("expects exactly one operand, got {}", clauses.len()),
            )),
            LogicalOperator::And | LogicalOperator::Or => Err(unsupported(
                operator.as_str(),
                "expects at least one operand".to_string(),
            )),
        }
    }

    /// Function calls compile exactly like the infix form of the same name.
    fn compile_function(&self, kind: FunctionKind, arguments: &[QueryNode]) -> SearchResult<Value> {
        match arguments {
            [QueryNode::Property(property), QueryNode::Literal(value)] => {
                self.compile_comparison(property, kind.operator(), value)
            }
            _ => Err(unsupported(
                kind.as_str(),
                "expects (property, literal) arguments".to_string(),
            )),
        }
    }

    fn compile_comparison(
        &self,
        property: &Property,
        operator: ComparisonOperator,
        value: &Literal,
    ) -> SearchResult<Value> {
        let field = property.name.as_str();

        // Null checks address the full path without nested scoping.
        if value.is_null() {
            return match operator {
                ComparisonOperator::Eq => Ok(must_not(exists(field))),
                ComparisonOperator::Ne => Ok(exists(field)),
                _ => Err(unsupported(
                    operator.as_str(),
                    "null can only be compared with eq or ne".to_string(),
                )),
            };
        }

        let clause = leaf_clause(field, operator, value)?;
        Ok(match property.nested_root() {
            Some(path) => json!({
                "nested": {
                    "path": path,
                    "query": clause,
                    "score_mode": "none"
                }
            }),
            None => clause,
        })
    }
}

/// Builds the clause for a non-null comparison on `field`.
fn leaf_clause(field: &str, operator: ComparisonOperator, value: &Literal) -> SearchResult<Value> {
    match operator {
        ComparisonOperator::Eq => Ok(term(field, value)),
        ComparisonOperator::Ne => Ok(must_not(term(field, value))),
        ComparisonOperator::Gt => range(field, operator, "gt", value),
        ComparisonOperator::Ge => range(field, operator, "gte", value),
        ComparisonOperator::Lt => range(field, operator, "lt", value),
        ComparisonOperator::Le => range(field, operator, "lte", value),
        ComparisonOperator::Contains => {
            let text = pattern_text(operator, value)?;
            Ok(wildcard(field, format!("*{}*", escape_wildcard(&text)), false))
        }
        ComparisonOperator::StartsWith => {
            let text = pattern_text(operator, value)?;
            Ok(json!({ "prefix": { field: { "value": text } } }))
        }
        ComparisonOperator::EndsWith => {
            let text = pattern_text(operator, value)?;
            Ok(wildcard(field, format!("*{}", escape_wildcard(&text)), false))
        }
        ComparisonOperator::FuzzyContains => {
            let text = pattern_text(operator, value)?;
            Ok(wildcard(field, format!("*{}*", escape_wildcard(&text)), true))
        }
        ComparisonOperator::NotFuzzyContains => {
            let text = pattern_text(operator, value)?;
            Ok(must_not(wildcard(field, format!("*{}*", escape_wildcard(&text)), true)))
        }
        ComparisonOperator::In => Ok(terms(field, &pattern_text(operator, value)?)),
        ComparisonOperator::NotIn => Ok(must_not(terms(field, &pattern_text(operator, value)?))),
    }
}

fn term(field: &str, value: &Literal) -> Value {
    json!({ "term": { field: value.to_json() } })
}

fn terms(field: &str, list: &str) -> Value {
    let values: Vec<&str> = list
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();
    json!({ "terms": { field: values } })
}

fn range(
    field: &str,
    operator: ComparisonOperator,
    bound: &str,
    value: &Literal,
) -> SearchResult<Value> {
    match value {
        Literal::String(_) | Literal::Number(_) => {
            Ok(json!({ "range": { field: { bound: value.to_json() } } }))
        }
        Literal::Boolean(_) | Literal::Null => Err(unsupported(
            operator.as_str(),
            format!("range bounds must be strings or numbers, got {}", value),
        )),
    }
}

fn wildcard(field: &str, pattern: String, case_insensitive: bool) -> Value {
    if case_insensitive {
        json!({ "wildcard": { field: { "value": pattern, "case_insensitive": true } } })
    } else {
        json!({ "wildcard": { field: { "value": pattern } } })
    }
}

fn exists(field: &str) -> Value {
    json!({ "exists": { "field": field } })
}

fn must_not(clause: Value) -> Value {
    json!({ "bool": { "must_not": [clause] } })
}

fn pattern_text(operator: ComparisonOperator, value: &Literal) -> SearchResult<String> {
    value.as_text().ok_or_else(|| {
        unsupported(
            operator.as_str(),
            format!("cannot match a pattern against {}", value),
        )
    })
}

/// Escapes the characters `wildcard` treats specially.
fn escape_wildcard(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '*' | '?') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn unsupported(operator: &str, message: String) -> SearchError {
    SearchError::UnsupportedOperator {
        operator: operator.to_string(),
        message,
    }
}
