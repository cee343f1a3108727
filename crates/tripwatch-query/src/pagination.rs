//! # Pagination
//!
//! Page arithmetic shared by every trip table. Pages are 1-based. The
//! current page is re-clamped into `[1, total_pages]` whenever the page
//! size or the total item count changes, so a view never points past the
//! end of a shrunk result set.

use std::ops::RangeInclusive;

use serde::Serialize;

/// Number of page buttons shown at most.
pub const PAGE_WINDOW: usize = 5;

/// Default rows per page.
pub const DEFAULT_PAGE_SIZE: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    total: usize,
    page_size: usize,
    current_page: usize,
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(0, DEFAULT_PAGE_SIZE, 1)
    }
}

impl Pagination {
    /// A page size of zero is treated as one.
    pub fn new(total: usize, page_size: usize, current_page: usize) -> Self {
        let mut p = Self {
            total,
            page_size: page_size.max(1),
            current_page,
        };
        p.clamp();
        p
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    /// `max(1, ceil(total / page_size))`.
    pub fn total_pages(&self) -> usize {
        self.total.div_ceil(self.page_size).max(1)
    }

    /// Index of the first item on the current page.
    pub fn start_index(&self) -> usize {
        (self.current_page - 1) * self.page_size
    }

    /// One past the last item on the current page.
    pub fn end_index(&self) -> usize {
        (self.current_page * self.page_size).min(self.total)
    }

    pub fn set_page_size(&mut self, page_size: usize) {
        self.page_size = page_size.max(1);
        self.clamp();
    }

    pub fn set_total(&mut self, total: usize) {
        self.total = total;
        self.clamp();
    }

    pub fn go_to(&mut self, page: usize) {
        self.current_page = page;
        self.clamp();
    }

    pub fn has_previous(&self) -> bool {
        self.current_page > 1
    }

    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages()
    }

    /// Page numbers to render as buttons, at most [`PAGE_WINDOW`] of them,
    /// centred on the current page where possible.
    pub fn window(&self) -> RangeInclusive<usize> {
        let pages = self.total_pages();
        let current = self.current_page;
        let half = PAGE_WINDOW / 2;
        if pages <= PAGE_WINDOW {
            1..=pages
        } else if current <= half + 1 {
            1..=PAGE_WINDOW
        } else if current + half >= pages {
            pages - PAGE_WINDOW + 1..=pages
        } else {
            current - half..=current + half
        }
    }

    /// The current page's slice of `items`.
    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let end = self.end_index().min(items.len());
        let start = self.start_index().min(end);
        &items[start..end]
    }

    fn clamp(&mut self) {
        self.current_page = self.current_page.clamp(1, self.total_pages());
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// The current page is always within bounds and its range within the total.
        #[test]
        fn page_stays_in_bounds(total in 0usize..500, size in 0usize..60, page in 0usize..100) {
            let p = Pagination::new(total, size, page);
            prop_assert!(p.current_page() >= 1 && p.current_page() <= p.total_pages());
            prop_assert!(p.start_index() <= p.end_index() || total == 0);
            prop_assert!(p.end_index() <= total);
            let window = p.window();
            prop_assert!(window.contains(&p.current_page()));
            prop_assert!(window.clone().count() <= PAGE_WINDOW);
            prop_assert!(*window.end() <= p.total_pages());
        }
    }
}
