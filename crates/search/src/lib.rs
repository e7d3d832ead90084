//! Quarry search core
//!
//! This crate turns a small filter language into Elasticsearch queries and
//! runs them. A filter such as
//! `age gt 18 and (status eq 'active' or status eq 'pending')` is tokenized,
//! parsed into an AST, compiled into Query DSL and combined with free-text
//! search, sorting, pagination and facets into a single search request.
//!
//! # Features
//!
//! - `elasticsearch` (default) - the HTTP [`SearchClient`](core::SearchClient)
//!   implementation. Without it the crate still parses and compiles filters.
//!
//! # Architecture
//!
//! - [`filter`] - lexer, parser and AST for filter expressions
//! - [`types`] - criteria, sort, pagination and result pages
//! - [`backends`] - Query DSL compilation and the Elasticsearch client
//! - [`core`] - the client seam, the search engine and the scoped service
//! - [`error`] - error types for all operations
//!
//! # Filter Syntax
//!
//! | Form                           | Meaning                                  |
//! |--------------------------------|------------------------------------------|
//! | `f eq/ne/gt/ge/lt/le v`        | comparison (`= != > >= < <=` also work)  |
//! | `f contains/startswith/endswith 'v'` | string match, also as `contains(f, 'v')` |
//! | `f ~ 'v'`, `f !~ 'v'`          | case-insensitive substring, negated      |
//! | `f ?= 'a,b'`, `f ?!= 'a,b'`    | one of / none of a list                  |
//! | `f eq null`, `f ne null`       | missing / present                        |
//! | `and`, `or`, `not`, `( )`      | `and` binds tighter than `or`            |
//!
//! Strings use single quotes; `''` inside a string is a literal quote.
//! Dotted paths such as `department.name` are searched as nested fields.
//!
//! # Quick Start
//!
//! ```
//! use quarry_search::backends::elasticsearch::search::{QueryCompiler, assemble};
//! use quarry_search::filter::parse_filter;
//! use quarry_search::types::SearchCriteria;
//!
//! let criteria = SearchCriteria::from_params(
//!     Some("engineer"),
//!     Some("department.name eq 'Eng' and age ge 30"),
//!     Some("name asc"),
//!     Some(0),
//!     Some(20),
//! );
//!
//! let ast = parse_filter(criteria.filter().unwrap()).unwrap();
//! let compiled = QueryCompiler::new().compile(&ast).unwrap();
//! let request = assemble(&criteria, Some(compiled));
//!
//! assert_eq!(request.body["size"], 20);
//! assert_eq!(
//!     request.body["query"]["bool"]["filter"][0]["bool"]["must"][0]["nested"]["path"],
//!     "department"
//! );
//! ```

pub mod backends;
pub mod core;
pub mod error;
pub mod filter;
pub mod types;

pub use core::{SearchClient, SearchContext, SearchEngine, SearchService};
pub use error::{BackendError, FilterError, SearchError, SearchResult};
pub use filter::{QueryNode, parse_filter};
pub use types::{Page, Pagination, SearchCriteria, Sort};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
