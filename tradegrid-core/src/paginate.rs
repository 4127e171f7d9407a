//! Windowed pagination.
//!
//! `Paginator` holds a clamped page state and answers three questions: which
//! page numbers to show (a centered window plus first/last anchors and
//! ellipses), which rows belong to the current page, and whether navigation
//! in a given direction is allowed. Out-of-range page requests are clamped,
//! never errors.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_MAX_VISIBLE_PAGES: usize = 5;

/// Page sizes offered by the page-size selector.
pub const PAGE_SIZE_OPTIONS: [usize; 4] = [10, 25, 50, 100];

pub const DEFAULT_PAGE_SIZE: usize = PAGE_SIZE_OPTIONS[0];

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum PaginationError {
    #[error("items per page must be greater than zero")]
    ZeroPageSize,
    #[error("max visible pages must be greater than zero")]
    ZeroVisiblePages,
}

/// One entry of the page-number strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageItem {
    Page(usize),
    Ellipsis,
}

impl fmt::Display for PageItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Page(n) => write!(f, "{n}"),
            Self::Ellipsis => f.write_str("…"),
        }
    }
}

/// 1-based inclusive item range of the current page ("Showing 11-20 of 47").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRange {
    pub first: usize,
    pub last: usize,
    pub total: usize,
}

impl fmt::Display for ItemRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Showing {}-{} of {}", self.first, self.last, self.total)
    }
}

/// Plain page state: `current_page >= 1`, `items_per_page > 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageState {
    pub current_page: usize,
    pub items_per_page: usize,
    pub total_items: usize,
}

impl PageState {
    pub fn total_pages(&self) -> usize {
        total_pages(self.total_items, self.items_per_page)
    }
}

/// `ceil(total_items / items_per_page)`; zero when `items_per_page` is zero.
pub fn total_pages(total_items: usize, items_per_page: usize) -> usize {
    if items_per_page == 0 {
        0
    } else {
        total_items.div_ceil(items_per_page)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paginator {
    current_page: usize,
    items_per_page: usize,
    total_items: usize,
    max_visible_pages: usize,
}

impl Paginator {
    /// A paginator on page 1.
    pub fn new(total_items: usize, items_per_page: usize) -> Result<Self, PaginationError> {
        if items_per_page == 0 {
            return Err(PaginationError::ZeroPageSize);
        }
        Ok(Self {
            current_page: 1,
            items_per_page,
            total_items,
            max_visible_pages: DEFAULT_MAX_VISIBLE_PAGES,
        })
    }

    pub fn from_state(state: PageState) -> Result<Self, PaginationError> {
        Ok(Self::new(state.total_items, state.items_per_page)?.with_current_page(state.current_page))
    }

    pub fn with_max_visible_pages(mut self, max_visible_pages: usize) -> Result<Self, PaginationError> {
        if max_visible_pages == 0 {
            return Err(PaginationError::ZeroVisiblePages);
        }
        self.max_visible_pages = max_visible_pages;
        Ok(self)
    }

    /// Set the current page, clamped into `[1, max(total_pages, 1)]`.
    pub fn with_current_page(mut self, page: usize) -> Self {
        self.go_to(page);
        self
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn items_per_page(&self) -> usize {
        self.items_per_page
    }

    pub fn total_items(&self) -> usize {
        self.total_items
    }

    pub fn max_visible_pages(&self) -> usize {
        self.max_visible_pages
    }

    pub fn total_pages(&self) -> usize {
        total_pages(self.total_items, self.items_per_page)
    }

    pub fn state(&self) -> PageState {
        PageState {
            current_page: self.current_page,
            items_per_page: self.items_per_page,
            total_items: self.total_items,
        }
    }

    /// The control is drawn only when there is more than one page.
    pub fn should_render(&self) -> bool {
        self.total_pages() > 1
    }

    pub fn has_prev(&self) -> bool {
        self.current_page > 1
    }

    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages()
    }

    /// Move back one page. Returns `false` (and stays put) on page 1.
    pub fn prev(&mut self) -> bool {
        if self.has_prev() {
            self.current_page -= 1;
            true
        } else {
            false
        }
    }

    /// Move forward one page. Returns `false` (and stays put) on the last page.
    pub fn next(&mut self) -> bool {
        if self.has_next() {
            self.current_page += 1;
            true
        } else {
            false
        }
    }

    /// Jump to `page`, clamped. Returns the page actually selected.
    pub fn go_to(&mut self, page: usize) -> usize {
        self.current_page = page.clamp(1, self.total_pages().max(1));
        self.current_page
    }

    /// Change the page size and return to page 1.
    pub fn set_items_per_page(&mut self, items_per_page: usize) -> Result<(), PaginationError> {
        if items_per_page == 0 {
            return Err(PaginationError::ZeroPageSize);
        }
        self.items_per_page = items_per_page;
        self.current_page = 1;
        Ok(())
    }

    /// Update the item count (e.g. after filtering) and re-clamp the current page.
    pub fn set_total_items(&mut self, total_items: usize) {
        self.total_items = total_items;
        self.go_to(self.current_page);
    }

    /// Page-number strip for the current state.
    pub fn visible_pages(&self) -> Vec<PageItem> {
        visible_pages(self.current_page, self.total_pages(), self.max_visible_pages)
    }

    /// Half-open index range of the current page within the full list.
    pub fn bounds(&self) -> (usize, usize) {
        let start = ((self.current_page - 1) * self.items_per_page).min(self.total_items);
        let end = (start + self.items_per_page).min(self.total_items);
        (start, end)
    }

    /// Rows of the current page. The last page may be short.
    ///
    /// Bounds are computed against `rows.len()` as well, so a stale
    /// `total_items` can only shorten the slice.
    pub fn slice<'a, T>(&self, rows: &'a [T]) -> &'a [T] {
        let start = ((self.current_page - 1) * self.items_per_page).min(rows.len());
        let end = (start + self.items_per_page).min(rows.len());
        &rows[start..end]
    }

    /// All pages in order.
    pub fn pages<'a, T>(&self, rows: &'a [T]) -> std::slice::Chunks<'a, T> {
        rows.chunks(self.items_per_page)
    }

    pub fn range(&self) -> Option<ItemRange> {
        if self.total_items == 0 {
            return None;
        }
        let (start, end) = self.bounds();
        Some(ItemRange {
            first: start + 1,
            last: end,
            total: self.total_items,
        })
    }
}

/// Compute the page-number strip.
///
/// With `total_pages <= max_visible` every page is listed. Otherwise a window
/// of exactly `max_visible` pages is centered on `current` and shifted (not
/// shrunk) to stay inside `[1, total_pages]`; pages 1 and `total_pages` are
/// added as anchors when the window does not reach them, with one ellipsis
/// wherever an anchor and the window are more than one page apart.
pub fn visible_pages(current: usize, total_pages: usize, max_visible: usize) -> Vec<PageItem> {
    let max_visible = max_visible.max(1);
    if total_pages <= max_visible {
        return (1..=total_pages).map(PageItem::Page).collect();
    }

    let current = current.clamp(1, total_pages);
    let half = max_visible / 2;
    let mut start = current.saturating_sub(half).max(1);
    let mut end = start + max_visible - 1;
    if end > total_pages {
        end = total_pages;
        start = total_pages + 1 - max_visible;
    }

    let mut pages = Vec::with_capacity(max_visible + 4);
    if start > 1 {
        pages.push(PageItem::Page(1));
        if start > 2 {
            pages.push(PageItem::Ellipsis);
        }
    }
    pages.extend((start..=end).map(PageItem::Page));
    if end < total_pages {
        if end < total_pages - 1 {
            pages.push(PageItem::Ellipsis);
        }
        pages.push(PageItem::Page(total_pages));
    }
    pages
}

#[cfg(test)]
mod tests {
    use super::*;
    use PageItem::{Ellipsis, Page};

    #[test]
    fn total_pages_rounds_up() {
        let p = Paginator::new(47, 12).unwrap();
        assert_eq!(p.total_pages(), 4);
        assert_eq!(Paginator::new(48, 12).unwrap().total_pages(), 4);
        assert_eq!(Paginator::new(0, 12).unwrap().total_pages(), 0);
    }

    #[test]
    fn last_page_is_short() {
        let rows: Vec<usize> = (0..47).collect();
        let p = Paginator::new(rows.len(), 12).unwrap().with_current_page(4);
        assert_eq!(p.slice(&rows).len(), 11);
        assert_eq!(p.slice(&rows)[0], 36);
    }

    #[test]
    fn window_at_start() {
        assert_eq!(
            visible_pages(1, 10, 5),
            vec![Page(1), Page(2), Page(3), Page(4), Page(5), Ellipsis, Page(10)]
        );
    }

    #[test]
    fn window_in_middle() {
        assert_eq!(
            visible_pages(6, 12, 5),
            vec![
                Page(1),
                Ellipsis,
                Page(4),
                Page(5),
                Page(6),
                Page(7),
                Page(8),
                Ellipsis,
                Page(12)
            ]
        );
    }

    #[test]
    fn window_at_end() {
        assert_eq!(
            visible_pages(10, 10, 5),
            vec![Page(1), Ellipsis, Page(6), Page(7), Page(8), Page(9), Page(10)]
        );
    }

    #[test]
    fn no_ellipsis_for_adjacent_anchor() {
        // window 2..=6, anchor 1 is adjacent
        assert_eq!(
            visible_pages(4, 10, 5),
            vec![Page(1), Page(2), Page(3), Page(4), Page(5), Page(6), Ellipsis, Page(10)]
        );
        // window 4..=8 with total 9: last anchor adjacent
        assert_eq!(
            visible_pages(6, 9, 5),
            vec![Page(1), Ellipsis, Page(4), Page(5), Page(6), Page(7), Page(8), Page(9)]
        );
    }

    #[test]
    fn few_pages_listed_verbatim() {
        assert_eq!(visible_pages(2, 3, 5), vec![Page(1), Page(2), Page(3)]);
        assert!(visible_pages(1, 0, 5).is_empty());
    }

    #[test]
    fn even_window_width() {
        let pages = visible_pages(5, 20, 4);
        assert_eq!(
            pages,
            vec![Page(1), Ellipsis, Page(3), Page(4), Page(5), Page(6), Ellipsis, Page(20)]
        );
    }

    #[test]
    fn navigation_is_guarded() {
        let mut p = Paginator::new(30, 10).unwrap();
        assert!(!p.has_prev());
        assert!(!p.prev());
        assert_eq!(p.current_page(), 1);
        assert!(p.next());
        assert!(p.next());
        assert!(!p.next());
        assert_eq!(p.current_page(), 3);
    }

    #[test]
    fn out_of_range_requests_clamp() {
        let mut p = Paginator::new(30, 10).unwrap();
        assert_eq!(p.go_to(99), 3);
        assert_eq!(p.go_to(0), 1);
        let empty = Paginator::new(0, 10).unwrap().with_current_page(5);
        assert_eq!(empty.current_page(), 1);
        assert!(empty.slice::<u8>(&[]).is_empty());
    }

    #[test]
    fn shrinking_total_reclamps() {
        let mut p = Paginator::new(100, 10).unwrap().with_current_page(9);
        p.set_total_items(25);
        assert_eq!(p.current_page(), 3);
    }

    #[test]
    fn page_size_change_resets_page() {
        let mut p = Paginator::new(100, 10).unwrap().with_current_page(4);
        p.set_items_per_page(25).unwrap();
        assert_eq!(p.current_page(), 1);
        assert_eq!(p.total_pages(), 4);
        assert_eq!(p.set_items_per_page(0), Err(PaginationError::ZeroPageSize));
    }

    #[test]
    fn render_only_with_multiple_pages() {
        assert!(!Paginator::new(10, 10).unwrap().should_render());
        assert!(!Paginator::new(0, 10).unwrap().should_render());
        assert!(Paginator::new(11, 10).unwrap().should_render());
    }

    #[test]
    fn range_info() {
        let p = Paginator::new(47, 10).unwrap().with_current_page(5);
        let range = p.range().unwrap();
        assert_eq!((range.first, range.last, range.total), (41, 47, 47));
        assert_eq!(range.to_string(), "Showing 41-47 of 47");
        assert_eq!(Paginator::new(0, 10).unwrap().range(), None);
    }

    #[test]
    fn rejects_zero_sizes() {
        assert_eq!(Paginator::new(5, 0), Err(PaginationError::ZeroPageSize));
        assert_eq!(
            Paginator::new(5, 5).unwrap().with_max_visible_pages(0),
            Err(PaginationError::ZeroVisiblePages)
        );
    }

    #[test]
    fn ellipsis_displays_as_glyph() {
        assert_eq!(Ellipsis.to_string(), "…");
        assert_eq!(Page(3).to_string(), "3");
    }
}
