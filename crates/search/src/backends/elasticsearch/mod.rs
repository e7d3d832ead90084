//! Elasticsearch backend.
//!
//! [`search`] translates filters and criteria into Query DSL and is pure JSON
//! construction, so it is always compiled. The HTTP client lives behind the
//! `elasticsearch` feature.
//!
//! # Index Structure
//!
//! Each collection gets its own index: `{prefix}_{collection_lowercase}`
//! (e.g., `quarry_employees`). Documents hold arrays of objects as `nested`
//! fields so that conditions on sibling fields match within one element.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use quarry_search::backends::elasticsearch::{ElasticsearchClient, ElasticsearchConfig};
//! use quarry_search::core::SearchEngine;
//!
//! let config = ElasticsearchConfig {
//!     nodes: vec!["http://localhost:9200".to_string()],
//!     ..Default::default()
//! };
//! let client = ElasticsearchClient::new(config)?;
//! let index = client.index_name("employees");
//! let engine = SearchEngine::new(Arc::new(client));
//! ```

#[cfg(feature = "elasticsearch")]
mod backend;
pub mod search;

#[cfg(feature = "elasticsearch")]
pub use backend::{ElasticsearchAuth, ElasticsearchClient, ElasticsearchConfig};
