//! Table pagination math.
//!
//! Pages are 1-based. An empty list still has one (empty) page, so the
//! current page is always a valid page number after `clamp`.

#[cfg(test)]
#[path = "pagination_test.rs"]
mod tests;

use std::ops::Range;

pub const DEFAULT_PAGE_SIZE: usize = 10;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pagination {
    pub page: usize,
    pub page_size: usize,
    pub total: usize,
}

impl Default for Pagination {
    fn default() -> Self {
        Self { page: 1, page_size: DEFAULT_PAGE_SIZE, total: 0 }
    }
}

impl Pagination {
    /// Build a clamped pagination; a zero `page_size` falls back to the default.
    #[must_use]
    pub fn new(page: usize, page_size: usize, total: usize) -> Self {
        let page_size = if page_size == 0 { DEFAULT_PAGE_SIZE } else { page_size };
        Self { page, page_size, total }.clamp()
    }

    #[must_use]
    pub fn total_pages(&self) -> usize {
        self.total.div_ceil(self.page_size.max(1)).max(1)
    }

    /// Pull `page` into `1..=total_pages`.
    #[must_use]
    pub fn clamp(self) -> Self {
        let page = self.page.clamp(1, self.total_pages());
        Self { page, ..self }
    }

    #[must_use]
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages()
    }

    #[must_use]
    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    /// Next page, staying on the last page at the end.
    #[must_use]
    pub fn next(self) -> Self {
        Self { page: self.page.saturating_add(1), ..self }.clamp()
    }

    #[must_use]
    pub fn prev(self) -> Self {
        Self { page: self.page.saturating_sub(1), ..self }.clamp()
    }

    /// Same position, new total (e.g. after a delete); re-clamps the page.
    #[must_use]
    pub fn with_total(self, total: usize) -> Self {
        Self { total, ..self }.clamp()
    }

    /// Index range of the current page within the full list.
    #[must_use]
    pub fn range(&self) -> Range<usize> {
        let page = self.clamp().page;
        let start = (page - 1).saturating_mul(self.page_size).min(self.total);
        let end = start.saturating_add(self.page_size).min(self.total);
        start..end
    }

    /// The current page's items, for client-side paging.
    #[must_use]
    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let Range { start, end } = self.range();
        let end = end.min(items.len());
        items.get(start.min(end)..end).unwrap_or_default()
    }

    /// Page numbers to show in a compact pager: the current page and up to
    /// `radius` neighbours on each side.
    #[must_use]
    pub fn page_window(&self, radius: usize) -> Vec<usize> {
        let page = self.clamp().page;
        let first = page.saturating_sub(radius).max(1);
        let last = page.saturating_add(radius).min(self.total_pages());
        (first..=last).collect()
    }
}
