//! Cashu-vs-Fedimint review classification.
//!
//! Kind 38000 carries recommendations for several mint flavors; the global
//! surfaces (popular mints, recent reviews) only want Cashu ones. Reviews
//! with a proper `k` tag are unambiguous; legacy reviews are classified
//! from URL and content markers. This classifier is only applied to the
//! global scopes; single-mint matching never sniffs content.

use crate::MINT_ANNOUNCEMENT_KIND;
use crate::review::ReviewRecord;

/// URL fragments that identify a Cashu mint endpoint.
const CASHU_URL_PATTERNS: &[&str] = &["cashu", "mint", "/v1/info", "/api/v1/"];

/// Content terms specific to the Cashu protocol.
const CASHU_CONTENT_TERMS: &[&str] = &[
    "cashu",
    "ecash",
    "blind signature",
    "lightning",
    "nuts",
    "chaumian",
];

/// Content terms specific to Fedimint federations.
const FEDI_CONTENT_TERMS: &[&str] = &["fedi", "fedimint", "federation", "guardian"];

/// Whether a review is for a Cashu mint (as opposed to a Fedimint or
/// something else entirely).
pub fn is_cashu_review(review: &ReviewRecord) -> bool {
    // A k tag naming the Cashu announcement kind settles it.
    let announce_kind = MINT_ANNOUNCEMENT_KIND.to_string();
    if review.referenced_kind.as_deref() == Some(announce_kind.as_str()) {
        return true;
    }

    let Some(url) = review.mint_url.as_deref() else {
        return false;
    };
    let url_lower = url.to_lowercase();
    let content_lower = review.content.to_lowercase();

    if url_lower.contains("fedi") {
        return false;
    }
    if FEDI_CONTENT_TERMS.iter().any(|t| content_lower.contains(t)) {
        return false;
    }

    let has_cashu_url = CASHU_URL_PATTERNS.iter().any(|p| url_lower.contains(p));
    let has_cashu_content = CASHU_CONTENT_TERMS.iter().any(|t| content_lower.contains(t));

    has_cashu_url || has_cashu_content
}

#[cfg(test)]
mod tests {
    use super::*;

    fn review(url: Option<&str>, k: Option<&str>, content: &str) -> ReviewRecord {
        ReviewRecord {
            id: "00".repeat(32),
            author: "11".repeat(32),
            created_at: 1_700_000_000,
            mint_url: url.map(str::to_string),
            mint_pubkey: None,
            referenced_kind: k.map(str::to_string),
            a_tag: None,
            rating: 5,
            title: String::new(),
            content: content.to_string(),
            canonical: false,
        }
    }

    #[test]
    fn test_k_tag_is_authoritative() {
        let r = review(None, Some("38172"), "nothing identifying in here");
        assert!(is_cashu_review(&r));
    }

    #[test]
    fn test_fedi_url_excluded() {
        let r = review(
            Some("https://fedimint.example.com"),
            None,
            "great mint, smooth lightning swaps",
        );
        assert!(!is_cashu_review(&r));
    }

    #[test]
    fn test_fedi_content_excluded() {
        let r = review(
            Some("https://pay.example.com"),
            None,
            "our federation guardians run this well",
        );
        assert!(!is_cashu_review(&r));
    }

    #[test]
    fn test_cashu_url_pattern_included() {
        let r = review(
            Some("https://mint.example.com"),
            None,
            "solid service all around",
        );
        assert!(is_cashu_review(&r));
    }

    #[test]
    fn test_cashu_content_term_included() {
        let r = review(
            Some("https://pay.example.com"),
            None,
            "best ecash experience so far",
        );
        assert!(is_cashu_review(&r));
    }

    #[test]
    fn test_unidentifiable_excluded() {
        let r = review(Some("https://pay.example.com"), None, "fine I guess, works");
        assert!(!is_cashu_review(&r));
        let untagged = review(None, None, "cashu forever");
        assert!(!is_cashu_review(&untagged));
    }
}
