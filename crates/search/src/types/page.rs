//! Result pages.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::Pagination;

/// Value counts for one field, built from a terms aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Facet {
    pub field_name: String,
    pub label: String,
    pub value_counts: BTreeMap<String, u64>,
}

impl Facet {
    pub fn new(field_name: impl Into<String>) -> Self {
        let field_name = field_name.into();
        Self {
            label: field_name.clone(),
            field_name,
            value_counts: BTreeMap::new(),
        }
    }
}

/// One page of search results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    /// The items in this page. Never more than `pagination.size`.
    pub items: Vec<T>,

    /// The pagination that produced this page.
    pub pagination: Pagination,

    /// Total number of matches reported by the backend.
    pub total_count: u64,

    #[serde(default)]
    pub facets: Vec<Facet>,

    /// Named links or operations for the presentation layer.
    #[serde(default)]
    pub actions: BTreeMap<String, BTreeMap<String, String>>,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, pagination: Pagination, total_count: u64) -> Self {
        Self {
            items,
            pagination,
            total_count,
            facets: Vec::new(),
            actions: BTreeMap::new(),
        }
    }

    /// An empty page with no matches.
    pub fn empty(pagination: Pagination) -> Self {
        Self::new(Vec::new(), pagination, 0)
    }

    pub fn with_facets(mut self, facets: Vec<Facet>) -> Self {
        self.facets = facets;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Number of pages needed for `total_count` items.
    pub fn total_pages(&self) -> u64 {
        let size = u64::from(self.pagination.size.max(1));
        self.total_count.div_ceil(size)
    }

    pub fn has_next(&self) -> bool {
        u64::from(self.pagination.page) + 1 < self.total_pages()
    }

    pub fn has_previous(&self) -> bool {
        self.pagination.page > 0
    }

    /// Maps the items to a different type.
    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            items: self.items.into_iter().map(f).collect(),
            pagination: self.pagination,
            total_count: self.total_count,
            facets: self.facets,
            actions: self.actions,
        }
    }
}
