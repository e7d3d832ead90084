//! Search criteria.

use serde::{Deserialize, Serialize};

use super::{Pagination, Sort};

/// Everything needed to run one search.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchCriteria {
    /// Free text matched across all fields.
    #[serde(default)]
    pub search_text: Option<String>,

    /// Filter expression, parsed by [`crate::filter::parse_filter`].
    #[serde(default)]
    pub filter: Option<String>,

    #[serde(default)]
    pub sorts: Vec<Sort>,

    #[serde(default)]
    pub pagination: Pagination,

    /// Fields to compute value counts for.
    #[serde(default)]
    pub facet_fields: Vec<String>,
}

impl SearchCriteria {
    /// Builds criteria from raw request parameters.
    ///
    /// Blank `search` and `filter` values are treated as absent, `sort` is a
    /// comma-separated list (`name asc, age desc`), and `page`/`size` are
    /// clamped by [`Pagination::new`].
    pub fn from_params(
        search: Option<&str>,
        filter: Option<&str>,
        sort: Option<&str>,
        page: Option<i64>,
        size: Option<i64>,
    ) -> Self {
        let defaults = Pagination::default();
        Self {
            search_text: non_blank(search),
            filter: non_blank(filter),
            sorts: sort.map(Sort::parse_list).unwrap_or_default(),
            pagination: Pagination::new(
                page.unwrap_or(i64::from(defaults.page)),
                size.unwrap_or(i64::from(defaults.size)),
            ),
            facet_fields: Vec::new(),
        }
    }

    /// The search text, if it has any non-whitespace content.
    pub fn search_text(&self) -> Option<&str> {
        self.search_text.as_deref().filter(|s| !s.trim().is_empty())
    }

    /// The filter expression, if it has any non-whitespace content.
    pub fn filter(&self) -> Option<&str> {
        self.filter.as_deref().filter(|s| !s.trim().is_empty())
    }

    pub fn with_facet(mut self, field: impl Into<String>) -> Self {
        self.facet_fields.push(field.into());
        self
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_params() {
        let criteria = SearchCriteria::from_params(
            Some("john"),
            Some("age gt 18"),
            Some("name asc, age desc"),
            Some(2),
            Some(25),
        );
        assert_eq!(criteria.search_text(), Some("john"));
        assert_eq!(criteria.filter(), Some("age gt 18"));
        assert_eq!(criteria.sorts.len(), 2);
        assert!(criteria.sorts[1].reverse);
        assert_eq!(criteria.pagination, Pagination { page: 2, size: 25 });
    }

    #[test]
    fn test_blank_values_are_absent() {
        let criteria = SearchCriteria::from_params(Some("  "), Some(""), None, None, None);
        assert_eq!(criteria.search_text, None);
        assert_eq!(criteria.filter, None);
        assert!(criteria.sorts.is_empty());
        assert_eq!(criteria.pagination, Pagination::default());
    }

    #[test]
    fn test_accessors_ignore_blank_fields_set_directly() {
        let criteria = SearchCriteria {
            filter: Some("   ".to_string()),
            ..Default::default()
        };
        assert_eq!(criteria.filter(), None);
    }

    #[test]
    fn test_from_params_clamps_pagination() {
        let criteria = SearchCriteria::from_params(None, None, None, Some(-1), Some(0));
        assert_eq!(criteria.pagination, Pagination { page: 0, size: 1 });
    }

    #[test]
    fn test_deserialized_pagination_is_clamped() {
        let criteria: SearchCriteria =
            serde_json::from_str(r#"{"pagination":{"page":0,"size":0}}"#).unwrap();
        assert_eq!(criteria.pagination, Pagination { page: 0, size: 1 });

        let request = crate::backends::elasticsearch::search::assemble(&criteria, None);
        assert_eq!(request.body["size"], 1);
    }
}
