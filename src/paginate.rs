use std::ops::Range;

/// Reveals a list in batches: an initial page, then `batch` more per
/// load-more action until everything is shown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    total: usize,
    batch: usize,
    shown: usize,
}

impl Paginator {
    pub fn new(total: usize, initial: usize, batch: usize) -> Self {
        Self {
            total,
            batch: batch.max(1),
            shown: initial.min(total),
        }
    }

    /// Everything revealed so far
    pub fn visible(&self) -> Range<usize> {
        0..self.shown
    }

    /// Reveal the next batch, returning the newly visible range.
    /// Once exhausted the range is empty.
    pub fn load_more(&mut self) -> Range<usize> {
        let start = self.shown;
        self.shown = (start + self.batch).min(self.total);
        start..self.shown
    }

    /// Apply `times` load-more actions
    pub fn advance(&mut self, times: usize) {
        for _ in 0..times {
            if self.load_more().is_empty() {
                break;
            }
        }
    }

    pub fn remaining(&self) -> usize {
        self.total - self.shown
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining() == 0
    }
}

/// Initial page and load-more batch for one kind of list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSize {
    pub initial: usize,
    pub batch: usize,
}

impl PageSize {
    pub const fn new(initial: usize, batch: usize) -> Self {
        Self { initial, batch }
    }

    /// A paginator over `total` items after `more` load-more actions
    pub fn pager(self, total: usize, more: usize) -> Paginator {
        let mut pager = Paginator::new(total, self.initial, self.batch);
        pager.advance(more);
        pager
    }
}
