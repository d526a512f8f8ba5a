//! Pagination for list endpoints
//!
//! Fixed default of 20 items per page, caller-overridable via `page_size`
//! up to a hard ceiling of 200. Out-of-range page numbers are clamped into
//! the valid range rather than rejected.

use serde::Serialize;

/// Default page size for all list endpoints
pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// Hard ceiling on caller-supplied page sizes
pub const MAX_PAGE_SIZE: i64 = 200;

/// Clamp a caller-supplied page size into [1, MAX_PAGE_SIZE]
pub fn clamp_page_size(requested: i64) -> i64 {
    requested.clamp(1, MAX_PAGE_SIZE)
}

/// Pagination window calculated from total results
#[derive(Debug, Clone, Copy)]
pub struct PageWindow {
    /// Current page number (1-indexed, clamped)
    pub page: i64,
    /// Total number of pages
    pub total_pages: i64,
    /// Offset for SQL LIMIT/OFFSET query
    pub offset: i64,
}

/// Calculate the pagination window from total results and requested page.
///
/// Ensures page is within valid bounds [1, total_pages].
pub fn window(total_results: i64, requested_page: i64, page_size: i64) -> PageWindow {
    let total_pages = (total_results + page_size - 1) / page_size;
    let page = requested_page.max(1).min(total_pages.max(1));
    let offset = (page - 1) * page_size;

    PageWindow {
        page,
        total_pages,
        offset,
    }
}

/// One page of a list response.
///
/// `count` is the size of the full matching set regardless of page size;
/// `next`/`previous` are page numbers, absent at the edges.
#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub count: i64,
    pub next: Option<i64>,
    pub previous: Option<i64>,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    pub fn new(count: i64, window: PageWindow, results: Vec<T>) -> Self {
        let next = (window.page < window.total_pages).then(|| window.page + 1);
        let previous = (window.page > 1).then(|| window.page - 1);

        Page {
            count,
            next,
            previous,
            results,
        }
    }
}
