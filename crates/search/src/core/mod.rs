//! Search execution: the client seam, the engine and the scoped service.

pub mod client;
pub mod engine;
pub mod service;

pub use client::{RawDoc, RawHit, RawSearchResponse, SearchClient};
pub use engine::SearchEngine;
pub use service::{SearchContext, SearchService};
