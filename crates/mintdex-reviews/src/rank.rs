//! Composite ranking for the popular-mints surface.
//!
//! A raw average would put a mint with one 5-star review above a mint with
//! fifty 4.8-star reviews, so the score adds a bounded volume bonus on top
//! of the average. The cap keeps review-count farming from dominating
//! quality.

use crate::store::MintAggregate;

/// Weight of the volume bonus relative to a full rating point.
///
/// Empirically chosen; tunable, not load-bearing.
const VOLUME_WEIGHT: f64 = 0.5;

/// Review count at which the volume bonus saturates.
///
/// Empirically chosen; tunable, not load-bearing.
const VOLUME_CAP: usize = 20;

/// Composite score: `average + weight * min(count, cap) / cap`.
pub fn composite_score(average_rating: f64, review_count: usize) -> f64 {
    let volume = review_count.min(VOLUME_CAP) as f64 / VOLUME_CAP as f64;
    average_rating + VOLUME_WEIGHT * volume
}

/// Rank aggregates for the top-N listing.
///
/// Sorted by composite score descending; ties broken by review count, then
/// by most recent review. Mints with zero surviving reviews are excluded
/// (they may still appear in the unranked all-mints listing).
pub fn rank(mut aggregates: Vec<MintAggregate>, limit: usize) -> Vec<MintAggregate> {
    aggregates.retain(|a| a.review_count > 0);

    aggregates.sort_by(|a, b| {
        let score_a = composite_score(a.average_rating, a.review_count);
        let score_b = composite_score(b.average_rating, b.review_count);
        score_b
            .partial_cmp(&score_a)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| b.review_count.cmp(&a.review_count))
            .then_with(|| b.last_review_at.cmp(&a.last_review_at))
    });

    aggregates.truncate(limit);
    aggregates
}

#[cfg(test)]
mod tests {
    use super::*;

    fn aggregate(url: &str, count: usize, average: f64, last: u64) -> MintAggregate {
        MintAggregate {
            mint_url: url.to_string(),
            mint_name: url.to_string(),
            domain: url.to_string(),
            review_count: count,
            average_rating: average,
            last_review_at: last,
        }
    }

    #[test]
    fn test_score_formula() {
        assert!((composite_score(4.0, 20) - 4.5).abs() < 1e-9);
        assert!((composite_score(4.5, 1) - 4.525).abs() < 1e-9);
        assert!((composite_score(3.0, 0) - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_volume_bonus_caps_at_twenty() {
        assert_eq!(composite_score(4.0, 20), composite_score(4.0, 500));
    }

    #[test]
    fn test_volume_beats_bare_average() {
        // One 5-star review loses to fifty 4.8-star reviews.
        let ranked = rank(
            vec![
                aggregate("one-review", 1, 5.0, 10),
                aggregate("fifty-reviews", 50, 4.8, 10),
            ],
            10,
        );
        assert_eq!(ranked[0].mint_url, "fifty-reviews");
    }

    #[test]
    fn test_zero_review_mints_excluded() {
        let ranked = rank(
            vec![aggregate("empty", 0, 0.0, 0), aggregate("rated", 2, 3.0, 10)],
            10,
        );
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].mint_url, "rated");
    }

    #[test]
    fn test_ties_broken_by_count_then_recency() {
        // Same composite score by construction: 4.5 + bonus(20) == 4.75
        // vs 4.5 + bonus(20) == 4.75.
        let ranked = rank(
            vec![
                aggregate("older", 20, 4.5, 100),
                aggregate("newer", 20, 4.5, 200),
                aggregate("bigger", 40, 4.5, 50),
            ],
            10,
        );
        assert_eq!(ranked[0].mint_url, "bigger");
        assert_eq!(ranked[1].mint_url, "newer");
        assert_eq!(ranked[2].mint_url, "older");
    }

    #[test]
    fn test_rank_is_deterministic() {
        let input = vec![
            aggregate("a", 3, 4.2, 100),
            aggregate("b", 7, 4.0, 300),
            aggregate("c", 1, 5.0, 200),
        ];
        let first = rank(input.clone(), 10);
        for _ in 0..3 {
            assert_eq!(rank(input.clone(), 10), first);
        }
    }

    #[test]
    fn test_limit_truncates() {
        let ranked = rank(
            vec![
                aggregate("a", 3, 4.2, 100),
                aggregate("b", 7, 4.0, 300),
                aggregate("c", 1, 5.0, 200),
            ],
            2,
        );
        assert_eq!(ranked.len(), 2);
    }
}
