//! FILENAME: core/view-engine/src/paging.rs
//! Pagination stage: slices the root viewable and every group independently.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::viewable::Viewable;

/// What slice of items a caller wants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PageRequest {
    /// 1-based page. `page_size == 0` defers to the view's page size.
    Page { page: usize, page_size: usize },
    /// No slicing; used by export-style callers.
    All,
}

impl Default for PageRequest {
    fn default() -> Self {
        PageRequest::Page { page: 1, page_size: 0 }
    }
}

impl PageRequest {
    pub fn page(page: usize, page_size: usize) -> Self {
        PageRequest::Page { page, page_size }
    }

    /// Maps raw request parameters: `page == -1` means everything, a page
    /// below 1 means the first page, a page size below 1 defers to the view.
    pub fn from_raw(page: i64, page_size: i64) -> Self {
        if page == -1 {
            return PageRequest::All;
        }
        PageRequest::Page {
            page: page.max(1) as usize,
            page_size: page_size.max(0) as usize,
        }
    }
}

/// Requested size if at least 1, else the view's, else the engine default.
pub fn effective_page_size(requested: usize, view_page_size: usize, default_page_size: usize) -> usize {
    if requested >= 1 {
        requested
    } else if view_page_size >= 1 {
        view_page_size
    } else {
        default_page_size.max(1)
    }
}

/// `[(page - 1) * size, min(start + size, total))`, empty when the start is
/// past the end.
pub fn page_bounds(total: usize, page: usize, page_size: usize) -> Range<usize> {
    let start = page.saturating_sub(1).saturating_mul(page_size);
    if start >= total {
        return total..total;
    }
    let end = start.saturating_add(page_size).min(total);
    start..end
}

/// Slices `viewable` in place and records the effective page size. Item
/// counts keep the pre-slice totals.
pub fn paginate(viewable: &mut Viewable, request: &PageRequest, view_page_size: usize, default_page_size: usize) {
    match *request {
        PageRequest::All => {
            viewable.header_mut().page_size = effective_page_size(0, view_page_size, default_page_size);
        }
        PageRequest::Page { page, page_size } => {
            let size = effective_page_size(page_size, view_page_size, default_page_size);
            let range = page_bounds(viewable.items_len(), page.max(1), size);
            viewable.retain_range(range);
            viewable.header_mut().page_size = size;
        }
    }
}
