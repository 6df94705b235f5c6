//! Page arithmetic for the analytics table

use serde::Serialize;

/// Number of pages for `total` records, never less than one
pub fn total_pages(total: u64, page_size: u32) -> u32 {
    if page_size == 0 {
        return 1;
    }
    let pages = total.div_ceil(u64::from(page_size));
    u32::try_from(pages).unwrap_or(u32::MAX).max(1)
}

/// Position within a paginated result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub page: u32,
    pub page_size: u32,
    pub total: u64,
}

impl Pagination {
    pub fn new(page: u32, page_size: u32, total: u64) -> Self {
        Self {
            page: page.max(1),
            page_size,
            total,
        }
    }

    pub fn total_pages(&self) -> u32 {
        total_pages(self.total, self.page_size)
    }

    /// "Previous" is enabled on every page but the first
    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    /// "Next" is disabled exactly on the last page
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages()
    }
}
