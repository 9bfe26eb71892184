//! Offset pagination over a filtered listing.

use std::ops::Range;

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PaginationError {
    #[error("page size must be positive")]
    ZeroPageSize,
}

/// Page cursor for a listing of `total_items` rows.
///
/// Pages are 1-based and `1 <= current_page <= total_pages` always holds;
/// an empty listing still has one (empty) page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    page_size: usize,
    current_page: usize,
    total_items: usize,
}

/// "Showing `from`–`to` of `total`"; `from` is 0 when nothing matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Showing {
    pub from: usize,
    pub to: usize,
    pub total: usize,
}

/// Enabled state of the four navigation buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct PagerControls {
    pub first: bool,
    pub prev: bool,
    pub next: bool,
    pub last: bool,
}

impl PagerControls {
    pub fn any_enabled(&self) -> bool {
        self.first || self.prev || self.next || self.last
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PageSlot {
    Page { number: usize, current: bool },
    Gap,
}

impl Paginator {
    pub fn new(page_size: usize) -> Result<Self, PaginationError> {
        if page_size == 0 {
            return Err(PaginationError::ZeroPageSize);
        }
        Ok(Self {
            page_size,
            current_page: 1,
            total_items: 0,
        })
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn total_items(&self) -> usize {
        self.total_items
    }

    pub fn total_pages(&self) -> usize {
        self.total_items.div_ceil(self.page_size).max(1)
    }

    /// Record a new filtered total, pulling the current page back into range.
    pub fn set_total(&mut self, total_items: usize) {
        self.total_items = total_items;
        self.current_page = self.current_page.clamp(1, self.total_pages());
    }

    /// Jump to `page`, clamped into `[1, total_pages]`.
    pub fn go_to(&mut self, page: usize) {
        self.current_page = page.clamp(1, self.total_pages());
    }

    pub fn first(&mut self) {
        self.current_page = 1;
    }

    pub fn prev(&mut self) {
        self.go_to(self.current_page.saturating_sub(1));
    }

    pub fn next(&mut self) {
        self.go_to(self.current_page + 1);
    }

    pub fn last(&mut self) {
        self.current_page = self.total_pages();
    }

    pub fn set_page_size(&mut self, page_size: usize) -> Result<(), PaginationError> {
        if page_size == 0 {
            return Err(PaginationError::ZeroPageSize);
        }
        self.page_size = page_size;
        self.current_page = 1;
        Ok(())
    }

    /// Index range of the current page within the filtered listing.
    pub fn slice_bounds(&self) -> Range<usize> {
        let start = ((self.current_page - 1) * self.page_size).min(self.total_items);
        let end = (start + self.page_size).min(self.total_items);
        start..end
    }

    pub fn showing(&self) -> Showing {
        let bounds = self.slice_bounds();
        Showing {
            from: if bounds.is_empty() { 0 } else { bounds.start + 1 },
            to: bounds.end,
            total: self.total_items,
        }
    }

    pub fn controls(&self) -> PagerControls {
        if self.total_items == 0 {
            return PagerControls::default();
        }
        let has_prev = self.current_page > 1;
        let has_next = self.current_page < self.total_pages();
        PagerControls {
            first: has_prev,
            prev: has_prev,
            next: has_next,
            last: has_next,
        }
    }

    /// Page numbers to render: the first and last pages, `radius` pages on
    /// each side of the current one, and a gap marker wherever more than one
    /// page is skipped.
    pub fn window(&self, radius: usize) -> Vec<PageSlot> {
        let total = self.total_pages();
        let current = self.current_page;
        let page = |number: usize| PageSlot::Page {
            number,
            current: number == current,
        };

        let mut slots = vec![page(1)];
        if total == 1 {
            return slots;
        }

        let start = current.saturating_sub(radius).max(2);
        let end = (current + radius).min(total - 1);

        if start > 2 {
            slots.push(if start == 3 { page(2) } else { PageSlot::Gap });
        }
        for number in start..=end {
            slots.push(page(number));
        }
        if end < total - 1 {
            slots.push(if end == total - 2 {
                page(total - 1)
            } else {
                PageSlot::Gap
            });
        }
        slots.push(page(total));
        slots
    }
}
