use std::ops::Range;

/// Zero based page cursor over a sequence whose length is only known at
/// derivation time. The stored index may run past the end after the sequence
/// shrinks; every accessor clamps it against the current total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    index: usize,
    size: usize,
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(10)
    }
}

impl Pagination {
    pub fn new(size: usize) -> Self {
        Self {
            index: 0,
            size: size.max(1),
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Always at least one, an empty sequence still has a (blank) first page.
    pub fn page_count(&self, total: usize) -> usize {
        total.div_ceil(self.size).max(1)
    }

    pub fn clamped_index(&self, total: usize) -> usize {
        std::cmp::min(self.index, self.page_count(total) - 1)
    }

    pub fn set_index(&mut self, index: usize, total: usize) {
        self.index = index;
        self.clamp(total);
    }

    pub fn clamp(&mut self, total: usize) {
        self.index = self.clamped_index(total);
    }

    pub fn reset(&mut self) {
        self.index = 0;
    }

    pub fn set_size(&mut self, size: usize) {
        self.size = size.max(1);
        self.index = 0;
    }

    pub fn next(&mut self, total: usize) {
        self.set_index(self.clamped_index(total).saturating_add(1), total);
    }

    pub fn previous(&mut self, total: usize) {
        self.set_index(self.clamped_index(total).saturating_sub(1), total);
    }

    pub fn last(&mut self, total: usize) {
        self.index = self.page_count(total) - 1;
    }

    /// Slice of the sequence shown on the current page.
    pub fn range(&self, total: usize) -> Range<usize> {
        let begin = std::cmp::min(self.clamped_index(total) * self.size, total);
        let end = std::cmp::min(begin + self.size, total);
        begin..end
    }

    pub fn can_prev(&self, total: usize) -> bool {
        self.clamped_index(total) > 0
    }

    pub fn can_next(&self, total: usize) -> bool {
        self.clamped_index(total) + 1 < self.page_count(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_count_rounds_up_and_never_drops_below_one() {
        let page = Pagination::new(10);
        assert_eq!(page.page_count(0), 1);
        assert_eq!(page.page_count(10), 1);
        assert_eq!(page.page_count(11), 2);
        assert_eq!(page.page_count(25), 3);
    }

    #[test]
    fn zero_size_is_coerced() {
        let mut page = Pagination::new(0);
        assert_eq!(page.size(), 1);
        page.set_size(0);
        assert_eq!(page.size(), 1);
    }

    #[test]
    fn set_index_clamps_to_last_page() {
        let mut page = Pagination::new(3);
        page.set_index(99, 7);
        assert_eq!(page.index(), 2);
        assert_eq!(page.range(7), 6..7);

        page.set_index(4, 0);
        assert_eq!(page.index(), 0);
        assert_eq!(page.range(0), 0..0);
    }

    #[test]
    fn stale_index_is_clamped_when_reading() {
        let mut page = Pagination::new(5);
        page.set_index(3, 20);
        // Sequence shrank underneath the cursor
        assert_eq!(page.clamped_index(6), 1);
        assert_eq!(page.range(6), 5..6);
        assert!(page.can_prev(6));
        assert!(!page.can_next(6));
    }

    #[test]
    fn next_and_previous_stop_at_the_edges() {
        let mut page = Pagination::new(10);
        page.previous(25);
        assert_eq!(page.index(), 0);
        page.next(25);
        page.next(25);
        page.next(25);
        assert_eq!(page.index(), 2);
        page.last(25);
        assert_eq!(page.index(), 2);
        page.previous(25);
        assert_eq!(page.index(), 1);
    }
}
