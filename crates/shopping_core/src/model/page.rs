//! Page-number pagination.
//!
//! # Invariants
//! - `total_pages` is at least 1, even for an empty result set.
//! - A requested page outside `1..=total_pages` resolves to the last page.
//! - `per_page` is clamped to `1..=MAX_PER_PAGE`; zero falls back to the default.

pub const DEFAULT_PER_PAGE: u32 = 10;
pub const MAX_PER_PAGE: u32 = 100;

/// Caller-provided page selection, already normalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub per_page: u32,
}

impl PageRequest {
    pub fn new(page: i64, per_page: i64) -> Self {
        Self {
            page,
            per_page: normalize_per_page(per_page),
        }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

/// Clamps a raw page size to the supported range.
pub fn normalize_per_page(per_page: i64) -> u32 {
    match per_page {
        value if value <= 0 => DEFAULT_PER_PAGE,
        value if value > i64::from(MAX_PER_PAGE) => MAX_PER_PAGE,
        // In range, so the cast cannot truncate.
        value => value as u32,
    }
}

/// Resolved page position for a known total row count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub total: i64,
    pub page_number: i64,
    pub total_pages: i64,
    pub per_page: u32,
}

impl PageWindow {
    pub fn resolve(request: PageRequest, total: i64) -> Self {
        let per_page = i64::from(request.per_page.max(1));
        let total = total.max(0);
        let total_pages = ((total + per_page - 1) / per_page).max(1);
        let page_number = if (1..=total_pages).contains(&request.page) {
            request.page
        } else {
            total_pages
        };

        Self {
            total,
            page_number,
            total_pages,
            per_page: request.per_page.max(1),
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page_number - 1) * i64::from(self.per_page)
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.per_page)
    }

    pub fn has_previous(&self) -> bool {
        self.page_number > 1
    }

    pub fn has_next(&self) -> bool {
        self.page_number < self.total_pages
    }

    pub fn previous_page(&self) -> Option<i64> {
        self.has_previous().then(|| self.page_number - 1)
    }

    pub fn next_page(&self) -> Option<i64> {
        self.has_next().then(|| self.page_number + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::{normalize_per_page, PageRequest, PageWindow, DEFAULT_PER_PAGE, MAX_PER_PAGE};

    #[test]
    fn empty_result_still_has_one_page() {
        let window = PageWindow::resolve(PageRequest::new(1, 10), 0);
        assert_eq!(window.total_pages, 1);
        assert_eq!(window.page_number, 1);
        assert!(!window.has_next());
        assert!(!window.has_previous());
        assert_eq!(window.offset(), 0);
    }

    #[test]
    fn out_of_range_pages_resolve_to_last_page() {
        let window = PageWindow::resolve(PageRequest::new(9, 10), 25);
        assert_eq!(window.total_pages, 3);
        assert_eq!(window.page_number, 3);
        assert_eq!(window.offset(), 20);

        let window = PageWindow::resolve(PageRequest::new(0, 10), 25);
        assert_eq!(window.page_number, 3);
    }

    #[test]
    fn middle_page_links_both_ways() {
        let window = PageWindow::resolve(PageRequest::new(2, 10), 25);
        assert_eq!(window.previous_page(), Some(1));
        assert_eq!(window.next_page(), Some(3));
    }

    #[test]
    fn per_page_is_clamped() {
        assert_eq!(normalize_per_page(0), DEFAULT_PER_PAGE);
        assert_eq!(normalize_per_page(-4), DEFAULT_PER_PAGE);
        assert_eq!(normalize_per_page(5_000), MAX_PER_PAGE);
        assert_eq!(normalize_per_page(25), 25);
    }
}
