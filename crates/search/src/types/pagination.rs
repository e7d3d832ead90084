//! Page-based pagination.

use serde::{Deserialize, Serialize};

/// Page size used when none is given.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Zero-based page number and page size.
///
/// Deserialization goes through [`Pagination::new`], so incoming values are
/// clamped the same way as query parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawPagination")]
pub struct Pagination {
    pub page: u32,
    pub size: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 0,
            size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Pagination {
    /// Creates pagination from untrusted input. A negative page becomes 0, a
    /// non-positive size becomes 1, and values beyond `u32::MAX` saturate.
    pub fn new(page: i64, size: i64) -> Self {
        Self {
            page: clamp(page, 0),
            size: clamp(size, 1),
        }
    }

    /// Number of items to skip.
    pub fn offset(&self) -> u64 {
        u64::from(self.page) * u64::from(self.size)
    }

    /// Maximum number of items to return.
    pub fn limit(&self) -> u32 {
        self.size
    }
}

/// Unclamped wire form of [`Pagination`].
#[derive(Deserialize)]
struct RawPagination {
    #[serde(default)]
    page: i64,
    #[serde(default = "default_raw_size")]
    size: i64,
}

fn default_raw_size() -> i64 {
    i64::from(DEFAULT_PAGE_SIZE)
}

impl From<RawPagination> for Pagination {
    fn from(raw: RawPagination) -> Self {
        Pagination::new(raw.page, raw.size)
    }
}

fn clamp(value: i64, min: u32) -> u32 {
    u32::try_from(value.max(i64::from(min))).unwrap_or(u32::MAX)
}
