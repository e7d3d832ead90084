//! Search execution.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::backends::elasticsearch::search::{EsQueryBuilder, EsRequest, QueryCompiler};
use crate::core::client::{RawDoc, RawSearchResponse, SearchClient};
use crate::error::SearchResult;
use crate::filter::{QueryNode, parse_filter};
use crate::types::{Facet, Page, SearchCriteria};

/// Runs [`SearchCriteria`] against a [`SearchClient`].
///
/// The engine is stateless apart from the shared client. Each
/// [`search`](Self::search) parses and compiles the filter, then makes
/// exactly one backend call. A filter that fails to parse is reported before
/// the backend is contacted.
#[derive(Debug)]
pub struct SearchEngine<C> {
    client: Arc<C>,
    compiler: QueryCompiler,
}

impl<C> Clone for SearchEngine<C> {
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
            compiler: self.compiler,
        }
    }
}

impl<C: SearchClient> SearchEngine<C> {
    pub fn new(client: Arc<C>) -> Self {
        Self {
            client,
            compiler: QueryCompiler::new(),
        }
    }

    pub fn client(&self) -> &Arc<C> {
        &self.client
    }

    /// Parses the criteria's filter, if it has one.
    pub fn parse(&self, criteria: &SearchCriteria) -> SearchResult<Option<QueryNode>> {
        Ok(criteria.filter().map(parse_filter).transpose()?)
    }

    /// Returns the request [`search`](Self::search) would send, without
    /// sending it.
    pub fn explain(&self, criteria: &SearchCriteria) -> SearchResult<EsRequest> {
        let filter = self.parse(criteria)?;
        self.build_request(criteria, filter.as_ref())
    }

    /// Compiles an already parsed filter together with the rest of the
    /// criteria. The criteria's own filter string is ignored.
    pub fn build_request(
        &self,
        criteria: &SearchCriteria,
        filter: Option<&QueryNode>,
    ) -> SearchResult<EsRequest> {
        let compiled = filter.map(|node| self.compiler.compile(node)).transpose()?;
        Ok(EsQueryBuilder::new(criteria).build(compiled))
    }

    /// Searches `index` and maps each hit through `mapper`.
    ///
    /// Hits the mapper rejects are left out of `items` but still counted in
    /// `total_count`, which always reflects the backend's match count.
    pub async fn search<T, F>(
        &self,
        index: &str,
        criteria: &SearchCriteria,
        mapper: F,
    ) -> SearchResult<Page<T>>
    where
        F: Fn(RawDoc) -> Option<T>,
    {
        let filter = self.parse(criteria)?;
        self.search_parsed(index, criteria, filter.as_ref(), mapper)
            .await
    }

    /// Like [`search`](Self::search), with the filter supplied as a tree.
    pub async fn search_parsed<T, F>(
        &self,
        index: &str,
        criteria: &SearchCriteria,
        filter: Option<&QueryNode>,
        mapper: F,
    ) -> SearchResult<Page<T>>
    where
        F: Fn(RawDoc) -> Option<T>,
    {
        let request = self.build_request(criteria, filter)?;
        debug!(index, body = %request.body, "executing search");

        let response = self.client.search(index, request.body).await?;
        let page = to_page(&response, criteria, mapper)?;

        debug!(
            index,
            total = page.total_count,
            returned = page.items.len(),
            "search completed"
        );
        Ok(page)
    }

    /// Returns whether `index` exists. A failed probe counts as "does not
    /// exist" and is logged, never returned.
    pub async fn verify_index(&self, index: &str) -> bool {
        match self.client.index_exists(index).await {
            Ok(exists) => exists,
            Err(e) => {
                warn!(index, error = %e, "failed to verify index");
                false
            }
        }
    }
}

fn to_page<T, F>(
    response: &RawSearchResponse,
    criteria: &SearchCriteria,
    mapper: F,
) -> SearchResult<Page<T>>
where
    F: Fn(RawDoc) -> Option<T>,
{
    let total = response.total()?;
    let limit = criteria.pagination.limit() as usize;

    let items: Vec<T> = response
        .hits()?
        .into_iter()
        .take(limit)
        .filter_map(|hit| mapper(hit.into_document()))
        .collect();

    let facets = criteria
        .facet_fields
        .iter()
        .filter_map(|field| {
            response.buckets(field).map(|buckets| {
                let mut facet = Facet::new(field.as_str());
                facet.value_counts.extend(buckets);
                facet
            })
        })
        .collect();

    Ok(Page::new(items, criteria.pagination, total).with_facets(facets))
}
