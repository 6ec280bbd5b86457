//! Page window calculation shared by the HTML listings and JSON responses.

use serde::Serialize;

pub const DEFAULT_ITEMS_PER_PAGE: usize = 20;

/// Page numbers to render, with `None` standing for an ellipsis.
fn page_window(
    total_pages: usize,
    current_page: usize,
    edge: usize,
    before_current: usize,
    after_current: usize,
) -> Vec<Option<usize>> {
    if total_pages == 0 {
        return vec![];
    }

    let mut pages = Vec::new();

    let head_end = (1 + edge).min(total_pages + 1);
    pages.extend((1..head_end).map(Some));

    let middle_start = head_end.max(current_page.saturating_sub(before_current));
    let middle_end = (current_page + after_current + 1).min(total_pages + 1);
    if middle_start > head_end {
        pages.push(None);
    }
    pages.extend((middle_start..middle_end).map(Some));

    let tail_start = middle_end.max(total_pages.saturating_sub(edge) + 1);
    if tail_start > middle_end {
        pages.push(None);
    }
    pages.extend((tail_start..=total_pages).map(Some));

    pages
}

#[derive(Debug, Serialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub pages: Vec<Option<usize>>,
    pub page: usize,
    pub total: usize,
}

impl<T> Paginated<T> {
    /// Wraps one page of `items` out of `total` records.
    pub fn new(items: Vec<T>, current_page: usize, total: usize, per_page: usize) -> Self {
        let current_page = current_page.max(1);
        let total_pages = total.div_ceil(per_page.max(1));

        Self {
            items,
            pages: page_window(total_pages, current_page, 2, 2, 4),
            page: current_page,
            total,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paginated<U> {
        Paginated {
            items: self.items.into_iter().map(f).collect(),
            pages: self.pages,
            page: self.page,
            total: self.total,
        }
    }
}

/// Clamps a requested page number to a valid one-based page.
pub fn normalize_page(page: Option<usize>) -> usize {
    page.unwrap_or(1).max(1)
}
