//! Page/page-size normalization.
//!
//! # Invariants
//! - `limit` is always within `1..=MAX_PAGE_SIZE`.
//! - `offset` is never negative.

use serde::Serialize;

pub const DEFAULT_PAGE_SIZE: i64 = 50;
pub const MAX_PAGE_SIZE: i64 = 500;

/// Bounded offset/limit pair derived from caller-supplied paging input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageWindow {
    offset: i64,
    limit: i64,
}

impl PageWindow {
    /// Resolves 1-based `page` and `page_size` into a safe window.
    ///
    /// - `page <= 0` is treated as page 1.
    /// - `page_size <= 0` falls back to [`DEFAULT_PAGE_SIZE`].
    /// - `page_size` above [`MAX_PAGE_SIZE`] is clamped.
    pub fn resolve(page: i64, page_size: i64) -> Self {
        let page = page.max(1);
        let limit = match page_size {
            size if size <= 0 => DEFAULT_PAGE_SIZE,
            size if size > MAX_PAGE_SIZE => MAX_PAGE_SIZE,
            size => size,
        };
        Self {
            offset: (page - 1).saturating_mul(limit),
            limit,
        }
    }

    pub fn offset(&self) -> i64 {
        self.offset
    }

    pub fn limit(&self) -> i64 {
        self.limit
    }

    /// 1-based page number this window starts.
    pub fn page(&self) -> i64 {
        self.offset / self.limit + 1
    }
}

/// One page of results plus the total row count of the unpaginated query.
///
/// `total` and `items` come from two statements and may disagree slightly
/// under concurrent writes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub window: PageWindow,
}

impl<T> Page<T> {
    pub fn total_pages(&self) -> i64 {
        let limit = self.window.limit();
        (self.total.max(0) + limit - 1) / limit
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
