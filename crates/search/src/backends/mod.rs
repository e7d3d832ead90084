//! Search backend implementations.
//!
//! - `elasticsearch` - Query DSL translation and an HTTP client (the client
//!   requires the `elasticsearch` feature)

pub mod elasticsearch;
