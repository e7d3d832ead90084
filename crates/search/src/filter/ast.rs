//! Abstract syntax tree for filter expressions.
//!
//! Trees are built by [`parse`](super::parser::parse) and never mutated
//! afterwards; the compiler only ever borrows them, so one parsed filter can be
//! compiled any number of times.

use std::fmt;

use serde_json::{Number, Value};

/// A dotted reference to a document field, e.g. `department.name`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Property {
    pub name: String,
}

impl Property {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Returns true if the path has more than one segment.
    pub fn is_nested(&self) -> bool {
        self.name.contains('.')
    }

    /// The first path segment of a nested path (`department` for
    /// `department.name`), or `None` for a plain field.
    pub fn nested_root(&self) -> Option<&str> {
        self.name
            .split_once('.')
            .map(|(root, _)| root)
            .filter(|root| !root.is_empty())
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// A literal value on the right-hand side of a comparison.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Null,
    String(String),
    Number(Number),
    Boolean(bool),
}

impl Literal {
    pub fn string(value: impl Into<String>) -> Self {
        Literal::String(value.into())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Literal::Null)
    }

    /// The literal as a JSON value, ready to drop into a backend query.
    pub fn to_json(&self) -> Value {
        match self {
            Literal::Null => Value::Null,
            Literal::String(s) => Value::String(s.clone()),
            Literal::Number(n) => Value::Number(n.clone()),
            Literal::Boolean(b) => Value::Bool(*b),
        }
    }

    /// Textual form for pattern operators. `None` for null.
    pub fn as_text(&self) -> Option<String> {
        match self {
            Literal::Null => None,
            Literal::String(s) => Some(s.clone()),
            Literal::Number(n) => Some(n.to_string()),
            Literal::Boolean(b) => Some(b.to_string()),
        }
    }
}

impl From<&str> for Literal {
    fn from(s: &str) -> Self {
        Literal::String(s.to_string())
    }
}

impl From<i64> for Literal {
    fn from(n: i64) -> Self {
        Literal::Number(n.into())
    }
}

impl From<bool> for Literal {
    fn from(b: bool) -> Self {
        Literal::Boolean(b)
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Null => f.write_str("null"),
            Literal::String(s) => write!(f, "'{}'", s.replace('\'', "''")),
            Literal::Number(n) => write_number(f, n),
            Literal::Boolean(b) => write!(f, "{}", b),
        }
    }
}

/// Floats print in plain decimal with a fractional part so that they lex as
/// numbers again.
fn write_number(f: &mut fmt::Formatter<'_>, n: &Number) -> fmt::Result {
    match n.as_f64() {
        Some(x) if n.is_f64() => {
            let text = x.to_string();
            if text.contains('.') {
                f.write_str(&text)
            } else {
                write!(f, "{}.0", text)
            }
        }
        _ => write!(f, "{}", n),
    }
}

/// Comparison operators.
///
/// The word operators follow the OData surface. The symbolic operators
/// (`~`, `!~`, `?=`, `?!=`) come from the older expression syntax and share
/// the same grammar position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComparisonOperator {
    /// Equal
    Eq,
    /// Not equal
    Ne,
    /// Greater than
    Gt,
    /// Greater than or equal
    Ge,
    /// Less than
    Lt,
    /// Less than or equal
    Le,
    /// Substring match
    Contains,
    /// Prefix match
    StartsWith,
    /// Suffix match
    EndsWith,
    /// Case-insensitive substring match (`~`)
    FuzzyContains,
    /// Negated case-insensitive substring match (`!~`)
    NotFuzzyContains,
    /// Value is one of a comma-separated list (`?=`)
    In,
    /// Value is none of a comma-separated list (`?!=`)
    NotIn,
}

impl ComparisonOperator {
    /// Parses an operator from its word or symbolic spelling.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "eq" | "=" => Some(ComparisonOperator::Eq),
            "ne" | "!=" => Some(ComparisonOperator::Ne),
            "gt" | ">" => Some(ComparisonOperator::Gt),
            "ge" | ">=" => Some(ComparisonOperator::Ge),
            "lt" | "<" => Some(ComparisonOperator::Lt),
            "le" | "<=" => Some(ComparisonOperator::Le),
            "contains" => Some(ComparisonOperator::Contains),
            "startswith" => Some(ComparisonOperator::StartsWith),
            "endswith" => Some(ComparisonOperator::EndsWith),
            "~" => Some(ComparisonOperator::FuzzyContains),
            "!~" => Some(ComparisonOperator::NotFuzzyContains),
            "?=" => Some(ComparisonOperator::In),
            "?!=" => Some(ComparisonOperator::NotIn),
            _ => None,
        }
    }

    /// Canonical spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            ComparisonOperator::Eq => "eq",
            ComparisonOperator::Ne => "ne",
            ComparisonOperator::Gt => "gt",
            ComparisonOperator::Ge => "ge",
            ComparisonOperator::Lt => "lt",
            ComparisonOperator::Le => "le",
            ComparisonOperator::Contains => "contains",
            ComparisonOperator::StartsWith => "startswith",
            ComparisonOperator::EndsWith => "endswith",
            ComparisonOperator::FuzzyContains => "~",
            ComparisonOperator::NotFuzzyContains => "!~",
            ComparisonOperator::In => "?=",
            ComparisonOperator::NotIn => "?!=",
        }
    }
}

impl fmt::Display for ComparisonOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Logical operators for combining expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalOperator {
    And,
    Or,
    Not,
}

impl LogicalOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogicalOperator::And => "and",
            LogicalOperator::Or => "or",
            LogicalOperator::Not => "not",
        }
    }
}

impl fmt::Display for LogicalOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Built-in string functions. Each is an alias of the infix operator with the
/// same name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FunctionKind {
    Contains,
    StartsWith,
    EndsWith,
}

impl FunctionKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "contains" => Some(FunctionKind::Contains),
            "startswith" => Some(FunctionKind::StartsWith),
            "endswith" => Some(FunctionKind::EndsWith),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FunctionKind::Contains => "contains",
            FunctionKind::StartsWith => "startswith",
            FunctionKind::EndsWith => "endswith",
        }
    }

    /// The comparison operator this function is shorthand for.
    pub fn operator(&self) -> ComparisonOperator {
        match self {
            FunctionKind::Contains => ComparisonOperator::Contains,
            FunctionKind::StartsWith => ComparisonOperator::StartsWith,
            FunctionKind::EndsWith => ComparisonOperator::EndsWith,
        }
    }
}

impl fmt::Display for FunctionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A node of a parsed filter expression.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryNode {
    /// A field reference
    Property(Property),
    /// A literal value
    Literal(Literal),
    /// `property operator literal`
    Comparison {
        property: Property,
        operator: ComparisonOperator,
        value: Literal,
    },
    /// `and`/`or` over one or more operands, or `not` over exactly one
    Logical {
        operator: LogicalOperator,
        operands: Vec<QueryNode>,
    },
    /// `name(property, literal)`
    Function {
        kind: FunctionKind,
        arguments: Vec<QueryNode>,
    },
    /// A parenthesized sub-expression
    Group(Box<QueryNode>),
}

impl QueryNode {
    pub fn comparison(
        property: impl Into<String>,
        operator: ComparisonOperator,
        value: impl Into<Literal>,
    ) -> Self {
        QueryNode::Comparison {
            property: Property::new(property),
            operator,
            value: value.into(),
        }
    }

    pub fn and(operands: Vec<QueryNode>) -> Self {
        QueryNode::Logical {
            operator: LogicalOperator::And,
            operands,
        }
    }

    pub fn or(operands: Vec<QueryNode>) -> Self {
        QueryNode::Logical {
            operator: LogicalOperator::Or,
            operands,
        }
    }

    pub fn not(operand: QueryNode) -> Self {
        QueryNode::Logical {
            operator: LogicalOperator::Not,
            operands: vec![operand],
        }
    }

    pub fn group(child: QueryNode) -> Self {
        QueryNode::Group(Box::new(child))
    }

    pub fn function(kind: FunctionKind, property: impl Into<String>, value: impl Into<Literal>) -> Self {
        QueryNode::Function {
            kind,
            arguments: vec![
                QueryNode::Property(Property::new(property)),
                QueryNode::Literal(value.into()),
            ],
        }
    }
}

/// Prints the canonical filter text. For trees produced by the parser the
/// output parses back to an equal tree.
impl fmt::Display for QueryNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryNode::Property(p) => write!(f, "{}", p),
            QueryNode::Literal(l) => write!(f, "{}", l),
            QueryNode::Comparison {
                property,
                operator,
                value,
            } => write!(f, "{} {} {}", property, operator, value),
            QueryNode::Logical { operator, operands } => match operator {
                LogicalOperator::Not => {
                    f.write_str("not")?;
                    for operand in operands {
                        write!(f, " {}", operand)?;
                    }
                    Ok(())
                }
                LogicalOperator::And | LogicalOperator::Or => {
                    for (i, operand) in operands.iter().enumerate() {
                        if i > 0 {
                            write!(f, " {} ", operator)?;
                        }
                        write!(f, "{}", operand)?;
                    }
                    Ok(())
                }
            },
            QueryNode::Function { kind, arguments } => {
                write!(f, "{}(", kind)?;
                for (i, argument) in arguments.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", argument)?;
                }
                f.write_str(")")
            }
            QueryNode::Group(child) => write!(f, "({})", child),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_property_nested_root() {
        assert_eq!(Property::new("department.name").nested_root(), Some("department"));
        assert_eq!(Property::new("a.b.c").nested_root(), Some("a"));
        assert_eq!(Property::new("status").nested_root(), None);
        assert!(!Property::new("status").is_nested());
    }

    #[test]
    fn test_operator_spellings() {
        assert_eq!(ComparisonOperator::parse("EQ"), Some(ComparisonOperator::Eq));
        assert_eq!(ComparisonOperator::parse(">="), Some(ComparisonOperator::Ge));
        assert_eq!(ComparisonOperator::parse("?!="), Some(ComparisonOperator::NotIn));
        assert_eq!(ComparisonOperator::parse("StartsWith"), Some(ComparisonOperator::StartsWith));
        assert_eq!(ComparisonOperator::parse("like"), None);
    }

    #[test]
    fn test_function_kind_aliases_operator() {
        assert_eq!(FunctionKind::Contains.operator(), ComparisonOperator::Contains);
        assert_eq!(FunctionKind::StartsWith.operator(), ComparisonOperator::StartsWith);
        assert_eq!(FunctionKind::EndsWith.operator(), ComparisonOperator::EndsWith);
        assert_eq!(FunctionKind::parse("ENDSWITH"), Some(FunctionKind::EndsWith));
    }

    #[test]
    fn test_literal_display_escapes_quotes() {
        assert_eq!(Literal::string("O'Brien").to_string(), "'O''Brien'");
        assert_eq!(Literal::Null.to_string(), "null");
        assert_eq!(Literal::from(18).to_string(), "18");
        assert_eq!(Literal::from(true).to_string(), "true");
    }

    #[test]
    fn test_float_display_is_plain_decimal() {
        let float = |x: f64| Literal::Number(Number::from_f64(x).unwrap());
        assert_eq!(float(3.5).to_string(), "3.5");
        assert_eq!(float(2.0).to_string(), "2.0");
        assert_eq!(float(1e23).to_string(), "100000000000000000000000.0");
        assert_eq!(float(-0.0000001).to_string(), "-0.0000001");
    }

    #[test]
    fn test_node_display() {
        let node = QueryNode::or(vec![
            QueryNode::comparison("a", ComparisonOperator::Eq, "x"),
            QueryNode::group(QueryNode::and(vec![
                QueryNode::comparison("b", ComparisonOperator::Gt, 1),
                QueryNode::not(QueryNode::function(FunctionKind::Contains, "c", "y")),
            ])),
        ]);
        assert_eq!(
            node.to_string(),
            "a eq 'x' or (b gt 1 and not contains(c, 'y'))"
        );
    }
}
