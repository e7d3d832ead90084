//! Scoped search on top of [`SearchEngine`].

use tracing::debug;

use crate::core::client::{RawDoc, SearchClient};
use crate::core::engine::SearchEngine;
use crate::error::SearchResult;
use crate::filter::{QueryNode, parse_filter};
use crate::types::{Page, SearchCriteria};

/// Per-request context passed explicitly to [`SearchService::search`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchContext {
    /// A filter every result must also satisfy, e.g. a visibility rule for
    /// the current caller. Written in the same filter language.
    pub scope_filter: Option<String>,
}

impl SearchContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_scope_filter(filter: impl Into<String>) -> Self {
        Self {
            scope_filter: Some(filter.into()),
        }
    }

    fn scope(&self) -> Option<&str> {
        self.scope_filter
            .as_deref()
            .filter(|s| !s.trim().is_empty())
    }

    /// Restricts `filter` to this context's scope. The caller's filter is
    /// wrapped in a group and AND-ed with the parsed scope filter.
    pub fn apply(&self, filter: Option<QueryNode>) -> SearchResult<Option<QueryNode>> {
        let scope = self.scope().map(parse_filter).transpose()?;
        Ok(combine(filter, scope))
    }
}

/// Searches that respect index existence and a per-request scope.
///
/// - A missing index yields an empty page rather than an error.
/// - The scope filter from [`SearchContext`] is AND-ed with the caller's
///   filter, which is kept intact inside a group.
#[derive(Debug)]
pub struct SearchService<C> {
    engine: SearchEngine<C>,
}

impl<C> Clone for SearchService<C> {
    fn clone(&self) -> Self {
        Self {
            engine: self.engine.clone(),
        }
    }
}

impl<C: SearchClient> SearchService<C> {
    pub fn new(engine: SearchEngine<C>) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &SearchEngine<C> {
        &self.engine
    }

    /// The filter tree actually sent for `criteria` under `context`.
    pub fn effective_filter(
        &self,
        criteria: &SearchCriteria,
        context: &SearchContext,
    ) -> SearchResult<Option<QueryNode>> {
        let caller = self.engine.parse(criteria)?;
        context.apply(caller)
    }

    /// Searches `index` under `context`.
    ///
    /// Both filters are parsed before anything is sent to the backend.
    pub async fn search<T, F>(
        &self,
        index: &str,
        criteria: &SearchCriteria,
        context: &SearchContext,
        mapper: F,
    ) -> SearchResult<Page<T>>
    where
        F: Fn(RawDoc) -> Option<T>,
    {
        let filter = self.effective_filter(criteria, context)?;

        if !self.engine.verify_index(index).await {
            debug!(index, "index does not exist, returning empty page");
            return Ok(Page::empty(criteria.pagination));
        }

        self.engine
            .search_parsed(index, criteria, filter.as_ref(), mapper)
            .await
    }
}

fn combine(caller: Option<QueryNode>, scope: Option<QueryNode>) -> Option<QueryNode> {
    match (caller, scope) {
        (Some(caller), Some(scope)) => Some(QueryNode::and(vec![QueryNode::group(caller), scope])),
        (caller, None) => caller,
        (None, scope) => scope,
    }
}
