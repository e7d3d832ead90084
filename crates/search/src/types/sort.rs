//! Sort directives.

use serde::{Deserialize, Serialize};

/// How the backend should treat a sort field that is missing from a mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortValueType {
    Long,
    #[default]
    String,
    Double,
    Float,
}

/// A single sort directive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sort {
    /// Field to sort by; may be a dotted path.
    pub field_name: String,
    /// Value type of the field.
    #[serde(default)]
    pub value_type: SortValueType,
    /// `true` for descending order.
    #[serde(default)]
    pub reverse: bool,
}

impl Sort {
    /// Ascending sort on a string field.
    pub fn new(field_name: impl Into<String>) -> Self {
        Self {
            field_name: field_name.into(),
            value_type: SortValueType::String,
            reverse: false,
        }
    }

    /// Descending sort on a string field.
    pub fn descending(field_name: impl Into<String>) -> Self {
        Self {
            reverse: true,
            ..Self::new(field_name)
        }
    }

    pub fn with_value_type(mut self, value_type: SortValueType) -> Self {
        self.value_type = value_type;
        self
    }

    /// Parses a single clause such as `name desc`. The direction defaults to
    /// ascending and anything other than `desc` counts as ascending.
    /// Returns `None` for a blank clause.
    pub fn parse(clause: &str) -> Option<Self> {
        let mut parts = clause.split_whitespace();
        let field = parts.next()?;
        let reverse = parts
            .next()
            .is_some_and(|dir| dir.eq_ignore_ascii_case("desc"));
        Some(Self {
            reverse,
            ..Self::new(field)
        })
    }

    /// Parses a comma-separated sort list, e.g. `name asc, age desc`.
    /// Blank clauses are skipped.
    pub fn parse_list(expr: &str) -> Vec<Self> {
        expr.split(',').filter_map(Sort::parse).collect()
    }
}
