//! Elasticsearch search query translation.
//!
//! Translates parsed filters and [`SearchCriteria`](crate::types::SearchCriteria)
//! into Elasticsearch Query DSL.

pub mod compiler;
pub mod fts;
pub mod query_builder;
pub mod sort;

pub use compiler::QueryCompiler;
pub use query_builder::{EsQueryBuilder, EsRequest, assemble};
