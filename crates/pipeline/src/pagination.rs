//! Caller-owned pagination.
//!
//! Page state lives with the caller (a request, a UI session), never in
//! this crate.

/// Which page to show; pages are 1-based
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: usize,
    pub per_page: usize,
}

impl PageRequest {
    pub fn new(page: usize, per_page: usize) -> Self {
        Self { page, per_page }
    }

    /// Request for the following page
    pub fn next(&self) -> Self {
        Self {
            page: self.page + 1,
            ..*self
        }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: 24,
        }
    }
}

/// One page of results
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub per_page: usize,
    pub total_items: usize,
    pub total_pages: usize,
}

impl<T> Page<T> {
    /// Slice a full result list into the requested page.
    ///
    /// Page 0 is treated as page 1. Pages past the end and `per_page == 0`
    /// give an empty page; `total_items` is always the full count.
    pub fn paginate(items: Vec<T>, request: PageRequest) -> Self {
        let total_items = items.len();
        let page = request.page.max(1);

        if request.per_page == 0 {
            return Self {
                items: Vec::new(),
                page,
                per_page: 0,
                total_items,
                total_pages: 0,
            };
        }

        let total_pages = total_items.div_ceil(request.per_page);
        let start = (page - 1).saturating_mul(request.per_page);
        let items = items
            .into_iter()
            .skip(start)
            .take(request.per_page)
            .collect();

        Self {
            items,
            page,
            per_page: request.per_page,
            total_items,
            total_pages,
        }
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}
