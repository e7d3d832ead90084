//! Value types shared by the search pipeline.
//!
//! - [`SearchCriteria`] - what the caller asked for
//! - [`Sort`], [`SortValueType`] - sort directives
//! - [`Pagination`] - page number and size
//! - [`Page`], [`Facet`] - what the engine returns
//!
//! # Example
//!
//! ```
//! use quarry_search::types::{Pagination, SearchCriteria};
//!
//! let criteria = SearchCriteria::from_params(
//!     Some("john"),
//!     Some("age gt 18"),
//!     Some("name asc, age desc"),
//!     Some(-1),
//!     Some(20),
//! );
//!
//! assert_eq!(criteria.pagination, Pagination { page: 0, size: 20 });
//! assert_eq!(criteria.sorts.len(), 2);
//! ```

mod criteria;
mod page;
mod pagination;
mod sort;

pub use criteria::SearchCriteria;
pub use page::{Facet, Page};
pub use pagination::{DEFAULT_PAGE_SIZE, Pagination};
pub use sort::{Sort, SortValueType};
