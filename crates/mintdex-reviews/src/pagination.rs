//! "Load more" state for a single-mint review feed.
//!
//! Relays cap how much history one request returns, so the feed paginates
//! by re-fetching with a monotonically wider limit rather than by cursor.
//! Whether more data is likely upstream can only be inferred: a widened
//! fetch that surfaces nothing new means the well is dry.

/// Fetch-limit and has-more tracking for one mint session.
#[derive(Debug, Clone)]
pub struct Pagination {
    limit: usize,
    increment: usize,
    has_more: bool,
    fetched: bool,
}

impl Pagination {
    pub fn new(initial_limit: usize, increment: usize) -> Self {
        Self {
            limit: initial_limit,
            increment,
            has_more: true,
            fetched: false,
        }
    }

    /// Current per-filter fetch limit.
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Whether another "load more" is likely to surface new reviews.
    pub fn has_more(&self) -> bool {
        self.has_more
    }

    /// Widen the window for the next fetch.
    pub fn widen(&mut self) {
        self.limit += self.increment;
    }

    /// Record a completed fetch.
    ///
    /// Follow-up fetches flip `has_more` off when the surviving-record
    /// count did not grow. The very first fetch has no baseline, so it
    /// infers: more might exist when at least 2 records survived or the
    /// raw event count reached the limit.
    pub fn note_fetch(&mut self, surviving_before: usize, surviving_after: usize, raw_count: usize) {
        if self.fetched {
            self.has_more = surviving_after > surviving_before;
        } else {
            self.has_more = surviving_after >= 2 || raw_count >= self.limit;
            self.fetched = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_widens_monotonically() {
        let mut p = Pagination::new(500, 500);
        assert_eq!(p.limit(), 500);
        p.widen();
        assert_eq!(p.limit(), 1000);
        p.widen();
        assert_eq!(p.limit(), 1500);
    }

    #[test]
    fn test_first_fetch_infers_from_survivor_count() {
        let mut p = Pagination::new(500, 500);
        p.note_fetch(0, 2, 10);
        assert!(p.has_more());

        let mut p = Pagination::new(500, 500);
        p.note_fetch(0, 1, 10);
        assert!(!p.has_more());
    }

    #[test]
    fn test_first_fetch_infers_from_raw_count_at_limit() {
        // One survivor, but the raw stream hit the limit: more may exist.
        let mut p = Pagination::new(500, 500);
        p.note_fetch(0, 1, 500);
        assert!(p.has_more());
    }

    #[test]
    fn test_load_more_without_growth_ends_session() {
        let mut p = Pagination::new(500, 500);
        p.note_fetch(0, 5, 100);
        p.widen();
        p.note_fetch(5, 5, 120);
        assert!(!p.has_more());
    }

    #[test]
    fn test_load_more_with_growth_keeps_going() {
        let mut p = Pagination::new(500, 500);
        p.note_fetch(0, 5, 100);
        p.widen();
        p.note_fetch(5, 9, 200);
        assert!(p.has_more());
    }
}
