//! Elasticsearch request builder.
//!
//! Assembles the free-text clause, a compiled filter, sort, pagination and
//! facet aggregations into one search body.

use serde::Serialize;
use serde_json::{Map, Value, json};

use crate::types::SearchCriteria;

use super::fts;
use super::sort::build_sort;

/// A complete Elasticsearch search body ready to be sent.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct EsRequest {
    pub body: Value,
}

impl EsRequest {
    /// Number of hits skipped.
    pub fn offset(&self) -> u64 {
        self.body["from"].as_u64().unwrap_or(0)
    }

    /// Maximum number of hits returned.
    pub fn limit(&self) -> u64 {
        self.body["size"].as_u64().unwrap_or(0)
    }
}

/// Builds Elasticsearch search bodies from [`SearchCriteria`].
pub struct EsQueryBuilder<'a> {
    criteria: &'a SearchCriteria,
}

impl<'a> EsQueryBuilder<'a> {
    pub fn new(criteria: &'a SearchCriteria) -> Self {
        Self { criteria }
    }

    /// Builds the request. `filter` is the compiled filter clause, if any; it
    /// runs in filter context and does not affect scoring.
    pub fn build(&self, filter: Option<Value>) -> EsRequest {
        let mut bool_query = Map::new();

        if let Some(text) = self.criteria.search_text() {
            bool_query.insert("must".to_string(), json!([fts::build_text_query(text)]));
        }
        if let Some(filter) = filter {
            bool_query.insert("filter".to_string(), json!([filter]));
        }

        let query = if bool_query.is_empty() {
            json!({ "match_all": {} })
        } else {
            json!({ "bool": bool_query })
        };

        let pagination = self.criteria.pagination;
        let mut body = json!({
            "query": query,
            "from": pagination.offset(),
            "size": pagination.limit(),
            "track_total_hits": true,
        });

        if let Some(sort) = build_sort(&self.criteria.sorts) {
            body["sort"] = sort;
        }

        if let Some(aggs) = self.build_aggregations() {
            body["aggs"] = aggs;
        }

        EsRequest { body }
    }

    /// One `terms` aggregation per facet field, keyed by the field name.
    fn build_aggregations(&self) -> Option<Value> {
        if self.criteria.facet_fields.is_empty() {
            return None;
        }
        let aggs: Map<String, Value> = self
            .criteria
            .facet_fields
            .iter()
            .map(|field| (field.clone(), json!({ "terms": { "field": field } })))
            .collect();
        Some(Value::Object(aggs))
    }
}

/// Shorthand for `EsQueryBuilder::new(criteria).build(filter)`.
pub fn assemble(criteria: &SearchCriteria, filter: Option<Value>) -> EsRequest {
    EsQueryBuilder::new(criteria).build(filter)
}
