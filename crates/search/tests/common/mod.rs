//! Test infrastructure for the search crate.
//!
//! [`MockClient`] is an in-memory [`SearchClient`] that records every request
//! and answers with a canned response.

#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{Value, json};

use quarry_search::core::{RawSearchResponse, SearchClient, SearchEngine, SearchService};
use quarry_search::error::BackendError;

/// How the mock answers a search.
#[derive(Debug, Clone)]
pub enum Reply {
    Body(Value),
    Unavailable,
}

/// Recording in-memory client.
#[derive(Debug)]
pub struct MockClient {
    reply: Reply,
    /// `None` makes the existence probe fail.
    index_exists: Option<bool>,
    requests: Mutex<Vec<(String, Value)>>,
    probes: Mutex<Vec<String>>,
}

impl MockClient {
    pub fn new(reply: Value) -> Self {
        Self {
            reply: Reply::Body(reply),
            index_exists: Some(true),
            requests: Mutex::new(Vec::new()),
            probes: Mutex::new(Vec::new()),
        }
    }

    pub fn unavailable() -> Self {
        Self {
            reply: Reply::Unavailable,
            ..Self::new(Value::Null)
        }
    }

    pub fn with_index_exists(mut self, exists: Option<bool>) -> Self {
        self.index_exists = exists;
        self
    }

    /// Every `(index, body)` sent to `search`, in order.
    pub fn requests(&self) -> Vec<(String, Value)> {
        self.requests.lock().clone()
    }

    pub fn search_calls(&self) -> usize {
        self.requests.lock().len()
    }

    pub fn probes(&self) -> Vec<String> {
        self.probes.lock().clone()
    }

    /// The body of the only request sent so far.
    pub fn last_body(&self) -> Value {
        self.requests
            .lock()
            .last()
            .map(|(_, body)| body.clone())
            .expect("no search request was sent")
    }
}

#[async_trait]
impl SearchClient for MockClient {
    async fn search(&self, index: &str, body: Value) -> Result<RawSearchResponse, BackendError> {
        self.requests.lock().push((index.to_string(), body));
        match &self.reply {
            Reply::Body(body) => Ok(RawSearchResponse::new(body.clone())),
            Reply::Unavailable => Err(BackendError::Unavailable {
                backend_name: "mock".to_string(),
                message: "connection refused".to_string(),
            }),
        }
    }

    async fn index_exists(&self, index: &str) -> Result<bool, BackendError> {
        self.probes.lock().push(index.to_string());
        self.index_exists.ok_or_else(|| BackendError::ConnectionFailed {
            backend_name: "mock".to_string(),
            message: "probe failed".to_string(),
        })
    }
}

/// A search response with the given documents as hits, `_id`s `"1"`, `"2"`...
pub fn hits_response(total: u64, docs: Vec<Value>) -> Value {
    let hits: Vec<Value> = docs
        .into_iter()
        .enumerate()
        .map(|(i, doc)| json!({ "_id": (i + 1).to_string(), "_source": doc }))
        .collect();
    json!({
        "hits": {
            "total": { "value": total, "relation": "eq" },
            "hits": hits
        }
    })
}

pub fn engine(client: MockClient) -> (SearchEngine<MockClient>, Arc<MockClient>) {
    let client = Arc::new(client);
    (SearchEngine::new(Arc::clone(&client)), client)
}

pub fn service(client: MockClient) -> (SearchService<MockClient>, Arc<MockClient>) {
    let (engine, client) = engine(client);
    (SearchService::new(engine), client)
}
