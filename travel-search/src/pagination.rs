use crate::types::total_pages;

/// Page-index arithmetic over a known total and page size.
///
/// With no results `total_pages` is 0 and `current_page` stays pinned at 1.
/// Otherwise `current_page` is always within `[1, total_pages]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pagination {
    total_items: u64,
    items_per_page: u32,
    current_page: u32,
}

impl Pagination {
    pub fn new(total_items: u64, items_per_page: u32) -> Self {
        Self {
            total_items,
            items_per_page,
            current_page: 1,
        }
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn total_pages(&self) -> u32 {
        total_pages(self.total_items, self.items_per_page)
    }

    pub fn total_items(&self) -> u64 {
        self.total_items
    }

    /// Move to `page`. Pages outside `[1, total_pages]` leave the state
    /// unchanged; the return value tells whether the move happened.
    pub fn go_to_page(&mut self, page: u32) -> bool {
        if page >= 1 && page <= self.total_pages() {
            self.current_page = page;
            true
        } else {
            false
        }
    }

    pub fn next_page(&mut self) -> bool {
        self.go_to_page(self.current_page.saturating_add(1))
    }

    pub fn prev_page(&mut self) -> bool {
        self.go_to_page(self.current_page.saturating_sub(1))
    }

    pub fn reset(&mut self) {
        self.current_page = 1;
    }

    /// Reuse the tracker for a new result set.
    pub fn set_total(&mut self, total_items: u64) {
        self.total_items = total_items;
        if self.current_page > self.total_pages() {
            self.current_page = 1;
        }
    }

    /// Zero-based index of the first item on the current page.
    pub fn start_index(&self) -> u64 {
        u64::from(self.current_page - 1) * u64::from(self.items_per_page)
    }

    /// Zero-based index one past the last item on the current page.
    pub fn end_index(&self) -> u64 {
        (self.start_index() + u64::from(self.items_per_page)).min(self.total_items)
    }

    pub fn has_next_page(&self) -> bool {
        self.current_page < self.total_pages()
    }

    pub fn has_prev_page(&self) -> bool {
        self.current_page > 1
    }

    pub fn is_first_page(&self) -> bool {
        self.current_page == 1
    }

    pub fn is_last_page(&self) -> bool {
        self.current_page == self.total_pages()
    }

    /// A contiguous window of at most `max_visible` page numbers around the
    /// current page, shifted to stay inside `[1, total_pages]`.
    pub fn page_numbers(&self, max_visible: u32) -> Vec<u32> {
        let total = i64::from(self.total_pages());
        let max_visible = i64::from(max_visible);
        if total == 0 || max_visible == 0 {
            return Vec::new();
        }

        let current = i64::from(self.current_page);
        let half = max_visible / 2;

        let mut start = (current - half).max(1);
        let end = (start + max_visible - 1).min(total);
        if end - start + 1 < max_visible {
            start = (end - max_visible + 1).max(1);
        }

        (start..=end).map(|page| page as u32).collect()
    }
}
