//! Page results for paged queries.
//!
//! [`PaginationParams`] describes which page to fetch; [`PageResult`] is the envelope returned by
//! [`ModelCollection::paged_find`](crate::collection::ModelCollection::paged_find), holding the
//! page's data together with page and item navigation metadata.

use serde::{Deserialize, Serialize};
use std::cmp::min;

/// Which page to fetch and how many items each page holds.
///
/// Pages are 1-indexed (page 1 is the first page).
///
/// # Example
///
/// ```ignore
/// use mongo_models::page::PaginationParams;
///
/// let params = PaginationParams::new(3, 20);
/// assert_eq!(params.offset(), 40);
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationParams {
    /// The page number (1-indexed).
    pub page: u64,
    /// Number of items per page.
    pub limit: u64,
}

impl PaginationParams {
    /// Creates new pagination parameters.
    pub fn new(page: u64, limit: u64) -> Self {
        Self { page, limit }
    }

    /// The number of items to skip to reach this page.
    pub fn offset(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.limit)
    }
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self { page: 1, limit: 20 }
    }
}

/// Page navigation metadata.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Pages {
    /// The requested page.
    pub current: u64,
    /// The previous page number, `0` when on the first page.
    pub prev: u64,
    /// Whether a previous page exists.
    pub has_prev: bool,
    /// The next page number.
    pub next: u64,
    /// Whether the next page exists.
    pub has_next: bool,
    /// Total number of pages.
    pub total: u64,
}

/// Item range metadata. `begin` and `end` are 1-based, inclusive and never exceed `total`.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Items {
    /// Items per page.
    pub limit: u64,
    /// Position of the first item on this page.
    pub begin: u64,
    /// Position of the last item on this page.
    pub end: u64,
    /// Total number of matching items.
    pub total: u64,
}

/// One page of query results with navigation metadata.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PageResult<T> {
    /// The items on this page.
    pub data: Vec<T>,
    /// Page navigation metadata.
    pub pages: Pages,
    /// Item range metadata.
    pub items: Items,
}

impl<T> PageResult<T> {
    /// Assembles a page from its data and the total number of matching items.
    ///
    /// Page `0` is not rejected: the arithmetic saturates, giving `prev` 0, `has_prev` false and
    /// an item range with `begin > end`.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let page = PageResult::new(vec!["a", "b"], 3, PaginationParams::new(1, 2));
    ///
    /// assert_eq!(page.items.end, 2);
    /// assert_eq!(page.pages.total, 2);
    /// assert!(page.pages.has_next);
    /// ```
    pub fn new(data: Vec<T>, total: u64, params: PaginationParams) -> Self {
        let PaginationParams { page, limit } = params;

        let pages_total = if limit == 0 { 0 } else { total.div_ceil(limit) };
        let next = page.saturating_add(1);
        let prev = page.saturating_sub(1);
        let end = page.saturating_mul(limit);
        let begin = end.saturating_sub(limit).saturating_add(1);

        Self {
            data,
            pages: Pages {
                current: page,
                prev,
                has_prev: prev != 0,
                next,
                has_next: next <= pages_total,
                total: pages_total,
            },
            items: Items {
                limit,
                begin: min(begin, total),
                end: min(end, total),
                total,
            },
        }
    }

    /// Maps the page's data, keeping its metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PageResult<U> {
        PageResult {
            data: self.data.into_iter().map(f).collect(),
            pages: self.pages,
            items: self.items,
        }
    }
}
