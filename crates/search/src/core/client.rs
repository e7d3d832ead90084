//! Backend client abstraction.
//!
//! The engine never talks HTTP itself. It hands a finished request body to a
//! [`SearchClient`] and reads the reply through [`RawSearchResponse`], so
//! tests can substitute an in-memory client and other transports can be
//! plugged in without touching the compiler.

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::error::{BackendError, SearchError, SearchResult};

/// A document as returned by the backend, keyed by field name.
pub type RawDoc = Map<String, Value>;

/// Executes search requests against a backend.
///
/// Implementations must be safe to share across tasks; the engine holds one
/// behind an `Arc` and never locks around it.
#[async_trait]
pub trait SearchClient: Send + Sync {
    /// Runs a search body against `index`.
    async fn search(&self, index: &str, body: Value) -> Result<RawSearchResponse, BackendError>;

    /// Returns whether `index` exists.
    async fn index_exists(&self, index: &str) -> Result<bool, BackendError>;
}

/// One hit from a search response.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawHit {
    /// The backend's document id (`_id`).
    pub id: Option<String>,
    /// The stored document (`_source`).
    pub source: RawDoc,
}

impl RawHit {
    /// The document with `id` filled in from the hit's `_id` when the source
    /// does not carry one.
    pub fn into_document(self) -> RawDoc {
        let mut doc = self.source;
        if let Some(id) = self.id {
            doc.entry("id").or_insert(Value::String(id));
        }
        doc
    }
}

/// An undecoded search response body.
///
/// Decoding is deferred so the engine can report a missing or malformed
/// `hits` section as [`SearchError::MalformedResponse`] rather than a
/// transport error.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSearchResponse {
    pub body: Value,
}

impl RawSearchResponse {
    pub fn new(body: Value) -> Self {
        Self { body }
    }

    fn hits_section(&self) -> SearchResult<&Map<String, Value>> {
        self.body
            .get("hits")
            .and_then(Value::as_object)
            .ok_or_else(|| malformed("response has no hits section"))
    }

    /// Total number of matches. Accepts both `{"value": n}` and a bare
    /// number; falls back to the number of returned hits.
    pub fn total(&self) -> SearchResult<u64> {
        let section = self.hits_section()?;
        let total = match section.get("total") {
            Some(Value::Number(n)) => n.as_u64(),
            Some(Value::Object(total)) => total.get("value").and_then(Value::as_u64),
            _ => None,
        };
        match total {
            Some(total) => Ok(total),
            None => Ok(self.hits()?.len() as u64),
        }
    }

    /// The hits in response order.
    pub fn hits(&self) -> SearchResult<Vec<RawHit>> {
        let hits = self
            .hits_section()?
            .get("hits")
            .and_then(Value::as_array)
            .ok_or_else(|| malformed("hits section has no hits array"))?;

        hits.iter().map(parse_hit).collect()
    }

    /// `(key, doc_count)` pairs of a terms aggregation, or `None` when the
    /// response carries no aggregation of that name.
    pub fn buckets(&self, name: &str) -> Option<Vec<(String, u64)>> {
        let buckets = self
            .body
            .get("aggregations")?
            .get(name)?
            .get("buckets")?
            .as_array()?;

        Some(
            buckets
                .iter()
                .filter_map(|bucket| {
                    let key = bucket
                        .get("key_as_string")
                        .or_else(|| bucket.get("key"))
                        .map(bucket_key)?;
                    let count = bucket.get("doc_count").and_then(Value::as_u64).unwrap_or(0);
                    Some((key, count))
                })
                .collect(),
        )
    }
}

fn parse_hit(hit: &Value) -> SearchResult<RawHit> {
    let id = hit.get("_id").and_then(Value::as_str).map(str::to_string);
    let source = match hit.get("_source") {
        None | Some(Value::Null) => Map::new(),
        Some(Value::Object(source)) => source.clone(),
        Some(other) => {
            return Err(malformed(format!("hit _source is not an object: {}", other)));
        }
    };
    Ok(RawHit { id, source })
}

fn bucket_key(key: &Value) -> String {
    match key {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn malformed(message: impl Into<String>) -> SearchError {
    SearchError::MalformedResponse {
        message: message.into(),
    }
}
