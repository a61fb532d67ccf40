//! Deciding whether a review pertains to a specific mint.
//!
//! Two ways to match, tried in order: the protocol identifier (the mint's
//! published pubkey in the `d` tag plus the announcement kind in `k`), and
//! the legacy URL heuristic for older reviews that only carry a `u` tag.
//! There is no content-sniffing fallback: matching free text on keyword
//! mentions drags in far too many unrelated events.

use crate::MINT_ANNOUNCEMENT_KIND;
use crate::review::ReviewRecord;
use crate::url::{mint_domain, normalize_mint_url, strip_www};

/// How (or whether) a review matched a target mint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MintMatch {
    /// Matched via the published mint pubkey and announcement kind.
    Canonical,
    /// Matched via URL/domain equality after normalization.
    Legacy,
    /// Not a review of this mint.
    Unrelated,
}

impl MintMatch {
    /// Whether the review belongs to the target mint at all.
    pub fn is_match(&self) -> bool {
        !matches!(self, Self::Unrelated)
    }
}

/// Decide whether `review` pertains to the mint at `target_url`.
///
/// Pure function of its inputs; `target_pubkey` is the mint's published
/// public key when metadata resolution succeeded, `None` otherwise (in
/// which case only the legacy path can match).
pub fn match_review(
    review: &ReviewRecord,
    target_url: &str,
    target_pubkey: Option<&str>,
) -> MintMatch {
    // Proper protocol match: d = mint pubkey, k = announcement kind.
    let announce_kind = MINT_ANNOUNCEMENT_KIND.to_string();
    if let Some(pubkey) = target_pubkey
        && review.mint_pubkey.as_deref() == Some(pubkey)
        && review.referenced_kind.as_deref() == Some(announce_kind.as_str())
    {
        return MintMatch::Canonical;
    }

    let Some(review_url) = review.mint_url.as_deref() else {
        return MintMatch::Unrelated;
    };

    let target_normalized = normalize_mint_url(target_url);
    let review_normalized = normalize_mint_url(review_url);

    // Exact URL match after scheme/slash/case normalization.
    if review_normalized == target_normalized {
        return MintMatch::Legacy;
    }

    // Domain match, tolerating a leading www.
    let target_domain = mint_domain(target_url);
    let review_domain = mint_domain(review_url);
    if strip_www(&review_domain) == strip_www(&target_domain) {
        return MintMatch::Legacy;
    }

    MintMatch::Unrelated
}
