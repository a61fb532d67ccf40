//! Review event parsing, rating extraction, and spam validation.
//!
//! A kind 38000 event is only a review candidate; this module decides
//! whether it becomes a [`ReviewRecord`] or gets dropped. Rejections are
//! per-event and silent at this layer: the caller logs/counts them and
//! moves on, they never abort a subscription.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use thiserror::Error;

use crate::{REVIEW_KIND, tag_value, url::normalize_mint_url};

/// Minimum review content length (characters).
const MIN_CONTENT_LEN: usize = 10;

/// Maximum review content length (characters).
const MAX_CONTENT_LEN: usize = 2000;

/// Length of a run of identical characters that marks content as spam.
const SPAM_RUN_LEN: usize = 10;

/// Leading `[N/5]` rating prefix, N in 1..=5.
static BRACKET_RATING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\[([1-5])/5\]").expect("valid regex"));

/// Looser in-content rating forms: `rating: N`, `N/5`, `N star`.
static LOOSE_RATING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)rating[:\s]*([1-5])|([1-5])/5|([1-5])\s*star").expect("valid regex")
});

/// Any `[N/5]` prefix, stripped when deriving titles and clean content.
static RATING_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\[\d/5\]\s*").expect("valid regex"));

/// URLs under disposable-domain suffixes commonly used for spam.
static BLOCKED_DOMAIN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)https?://\S+\.(tk|ml|ga|cf)").expect("valid regex"));

/// A validated mint review derived from a single raw event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewRecord {
    /// Event id (hex). Unique per raw event.
    pub id: String,
    /// Review author's public key (hex).
    pub author: String,
    /// Event timestamp (unix seconds).
    pub created_at: u64,
    /// Mint URL from the `u` tag, as written by the author.
    pub mint_url: Option<String>,
    /// Mint public key from the `d` tag.
    pub mint_pubkey: Option<String>,
    /// Referenced announcement kind from the `k` tag.
    pub referenced_kind: Option<String>,
    /// Address pointer back to the announcement (`a` tag). Informational.
    pub a_tag: Option<String>,
    /// Rating, always within 1..=5.
    pub rating: u8,
    /// Derived display title. Cosmetic.
    pub title: String,
    /// Full review content.
    pub content: String,
    /// Whether this review was matched via the protocol identifier rather
    /// than the legacy URL heuristic.
    pub canonical: bool,
}

impl ReviewRecord {
    /// The identifier this review names its mint by: the normalized `u`
    /// URL when present, otherwise the `d` pubkey.
    pub fn mint_identifier(&self) -> Option<String> {
        self.mint_url
            .as_deref()
            .map(normalize_mint_url)
            .or_else(|| self.mint_pubkey.clone())
    }
}

/// Why an event was dropped instead of becoming a [`ReviewRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RejectReason {
    #[error("wrong event kind")]
    WrongKind,
    #[error("no mint identifier tag")]
    MissingIdentifier,
    #[error("content too short")]
    ContentTooShort,
    #[error("content too long")]
    ContentTooLong,
    #[error("repeated-character spam")]
    SpamRepeatedChars,
    #[error("blocked spam domain")]
    SpamBlockedDomain,
}

impl RejectReason {
    /// Stable label for metrics.
    pub fn label(&self) -> &'static str {
        match self {
            Self::WrongKind => "wrong_kind",
            Self::MissingIdentifier => "missing_identifier",
            Self::ContentTooShort => "too_short",
            Self::ContentTooLong => "too_long",
            Self::SpamRepeatedChars => "spam_repeat",
            Self::SpamBlockedDomain => "spam_domain",
        }
    }
}

/// Parse a raw event into a [`ReviewRecord`], or say why not.
///
/// Signature verification is not performed here; events reaching this
/// function have already passed the relay client's transport validation.
pub fn parse_review(event: &nostr::Event) -> Result<ReviewRecord, RejectReason> {
    if event.kind.as_u16() != REVIEW_KIND {
        return Err(RejectReason::WrongKind);
    }

    let d_tag = tag_value(event, "d");
    let u_tag = tag_value(event, "u");
    let k_tag = tag_value(event, "k");

    // A review must name its mint somehow: protocol identifier or URL.
    if d_tag.is_none() && u_tag.is_none() {
        return Err(RejectReason::MissingIdentifier);
    }

    validate_content(&event.content)?;

    let rating = extract_rating(tag_value(event, "rating"), &event.content);
    let announce_kind = crate::MINT_ANNOUNCEMENT_KIND.to_string();
    let canonical = d_tag.is_some() && k_tag == Some(announce_kind.as_str());

    Ok(ReviewRecord {
        id: event.id.to_hex(),
        author: event.pubkey.to_hex(),
        created_at: event.created_at.as_u64(),
        mint_url: u_tag.map(str::to_string),
        mint_pubkey: d_tag.map(str::to_string),
        referenced_kind: k_tag.map(str::to_string),
        a_tag: tag_value(event, "a").map(str::to_string),
        rating,
        title: derive_title(&event.content),
        content: event.content.clone(),
        canonical,
    })
}

/// Reject content outside the length bounds or matching a spam signature.
fn validate_content(content: &str) -> Result<(), RejectReason> {
    let len = content.chars().count();
    if len < MIN_CONTENT_LEN {
        return Err(RejectReason::ContentTooShort);
    }
    if len > MAX_CONTENT_LEN {
        return Err(RejectReason::ContentTooLong);
    }
    if has_repeated_run(content, SPAM_RUN_LEN) {
        return Err(RejectReason::SpamRepeatedChars);
    }
    if BLOCKED_DOMAIN.is_match(content) {
        return Err(RejectReason::SpamBlockedDomain);
    }
    Ok(())
}

/// Whether `content` contains a run of at least `min_run` identical
/// consecutive characters.
fn has_repeated_run(content: &str, min_run: usize) -> bool {
    let mut run = 0usize;
    let mut prev: Option<char> = None;
    for c in content.chars() {
        if Some(c) == prev {
            run += 1;
            if run >= min_run {
                return true;
            }
        } else {
            prev = Some(c);
            run = 1;
        }
    }
    false
}

/// Extract a 1..=5 rating, trying sources in order of reliability.
///
/// 1. The explicit `rating` tag, when it parses to 1..=5.
/// 2. A leading `[N/5]` bracket in the content.
/// 3. Looser in-content forms (`rating: N`, `N/5`, `N star`).
/// 4. Default of 5.
fn extract_rating(rating_tag: Option<&str>, content: &str) -> u8 {
    if let Some(tag) = rating_tag
        && let Ok(parsed) = tag.trim().parse::<u8>()
        && (1..=5).contains(&parsed)
    {
        return parsed;
    }

    if let Some(caps) = BRACKET_RATING.captures(content) {
        return caps[1].parse().unwrap_or(5);
    }

    if let Some(caps) = LOOSE_RATING.captures(content) {
        let digit = caps
            .get(1)
            .or_else(|| caps.get(2))
            .or_else(|| caps.get(3))
            .map(|m| m.as_str());
        if let Some(d) = digit
            && let Ok(parsed) = d.parse::<u8>()
        {
            return parsed;
        }
    }

    5
}

/// Derive a short display title from review content.
///
/// Strips any `[N/5]` prefix, then takes the first sentence or line if it
/// is reasonably short; otherwise truncates to 60 characters.
fn derive_title(content: &str) -> String {
    let clean = RATING_PREFIX.replace(content, "");
    let clean = clean.trim();

    let first_sentence = clean
        .split(['.', '!', '?'])
        .next()
        .map(str::trim)
        .unwrap_or("");
    if first_sentence.len() > 5 && first_sentence.len() < 120 {
        return first_sentence.to_string();
    }

    let first_line = clean.lines().next().map(str::trim).unwrap_or("");
    if first_line.len() > 5 && first_line.len() < 120 {
        return first_line.to_string();
    }

    if clean.chars().count() > 60 {
        let truncated: String = clean.chars().take(60).collect();
        format!("{truncated}...")
    } else {
        clean.to_string()
    }
}

/// Strip rating prefixes and publishing footers from review content for
/// display.
///
/// Removes a leading `[N/5]`, a trailing `Reviewing: <url>` paragraph, and
/// a trailing mint-mention paragraph (a footer some publishing clients
/// append).
pub fn clean_content(content: &str) -> String {
    let mut cleaned = RATING_PREFIX.replace(content, "").to_string();

    if let Some(idx) = cleaned.rfind("\n\n") {
        let footer = &cleaned[idx + 2..];
        let footer_lower = footer.to_lowercase();
        let is_reviewing_footer =
            footer_lower.starts_with("reviewing:") && footer_lower.contains("http");
        let is_mint_footer = !footer.contains('\n') && footer_lower.contains("mint");
        if is_reviewing_footer || is_mint_footer {
            cleaned.truncate(idx);
        }
    }

    cleaned.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use nostr::{EventBuilder, Keys, Kind, Tag, Timestamp};

    fn review_event(tags: Vec<Vec<&str>>, content: &str) -> nostr::Event {
        let keys = Keys::generate();
        let tags: Vec<Tag> = tags.into_iter().map(|t| Tag::parse(t).unwrap()).collect();
        EventBuilder::new(Kind::Custom(REVIEW_KIND), content)
            .tags(tags)
            .custom_created_at(Timestamp::from_secs(1_700_000_000))
            .sign_with_keys(&keys)
            .unwrap()
    }

    // =========================================================================
    // Rating extraction
    // =========================================================================

    #[test]
    fn test_rating_from_tag() {
        let event = review_event(
            vec![vec!["u", "https://mint.example.com"], vec!["rating", "2"]],
            "works but slow sometimes",
        );
        let review = parse_review(&event).unwrap();
        assert_eq!(review.rating, 2);
    }

    #[test]
    fn test_rating_from_leading_bracket() {
        let event = review_event(
            vec![vec!["u", "https://mint.example.com"]],
            "[3/5] decent service",
        );
        let review = parse_review(&event).unwrap();
        assert_eq!(review.rating, 3);
    }

    #[test]
    fn test_rating_out_of_range_tag_falls_through_to_content() {
        let event = review_event(
            vec![vec!["u", "https://mint.example.com"], vec!["rating", "9"]],
            "[4/5] solid, despite the weird tag",
        );
        let review = parse_review(&event).unwrap();
        assert_eq!(review.rating, 4);
    }

    #[test]
    fn test_rating_loose_patterns() {
        for (content, expected) in [
            ("my rating: 2 because of downtime", 2),
            ("overall 4/5 would use again", 4),
            ("giving this 3 stars for now", 3),
        ] {
            let event = review_event(vec![vec!["u", "https://mint.example.com"]], content);
            assert_eq!(parse_review(&event).unwrap().rating, expected, "{content}");
        }
    }

    #[test]
    fn test_rating_defaults_to_five() {
        let event = review_event(
            vec![vec!["u", "https://mint.example.com"]],
            "no complaints whatsoever",
        );
        assert_eq!(parse_review(&event).unwrap().rating, 5);
    }

    // =========================================================================
    // Validation
    // =========================================================================

    #[test]
    fn test_rejects_wrong_kind() {
        let keys = Keys::generate();
        let event = EventBuilder::new(Kind::Custom(1), "just a note about some mint here")
            .sign_with_keys(&keys)
            .unwrap();
        assert_eq!(parse_review(&event), Err(RejectReason::WrongKind));
    }

    #[test]
    fn test_rejects_missing_identifier() {
        let event = review_event(vec![], "a review of absolutely nothing");
        assert_eq!(parse_review(&event), Err(RejectReason::MissingIdentifier));
    }

    #[test]
    fn test_rejects_short_content() {
        let event = review_event(vec![vec!["u", "https://mint.example.com"]], "ok");
        assert_eq!(parse_review(&event), Err(RejectReason::ContentTooShort));
    }

    #[test]
    fn test_rejects_long_content() {
        let content = "a ".repeat(1001);
        let event = review_event(vec![vec!["u", "https://mint.example.com"]], &content);
        assert_eq!(parse_review(&event), Err(RejectReason::ContentTooLong));
    }

    #[test]
    fn test_rejects_repeated_character_spam() {
        let event = review_event(
            vec![vec!["u", "https://mint.example.com"]],
            "greaaaaaaaaaat mint!!",
        );
        assert_eq!(parse_review(&event), Err(RejectReason::SpamRepeatedChars));
    }

    #[test]
    fn test_rejects_blocked_domain() {
        let event = review_event(
            vec![vec!["u", "https://mint.example.com"]],
            "claim free sats at http://freesats.tk now",
        );
        assert_eq!(parse_review(&event), Err(RejectReason::SpamBlockedDomain));
    }

    #[test]
    fn test_all_parsed_ratings_in_bounds() {
        for content in [
            "rating: 0 actually unusable",
            "100/5 best mint ever made",
            "[9/5] overflowing with joy",
        ] {
            let event = review_event(vec![vec!["u", "https://mint.example.com"]], content);
            if let Ok(review) = parse_review(&event) {
                assert!((1..=5).contains(&review.rating), "{content}");
            }
        }
    }

    // =========================================================================
    // Record fields
    // =========================================================================

    #[test]
    fn test_canonical_flag_requires_d_and_k() {
        let canonical = review_event(
            vec![
                vec!["d", "aabbcc"],
                vec!["k", "38172"],
                vec!["u", "https://mint.example.com"],
            ],
            "[5/5] proper protocol review",
        );
        assert!(parse_review(&canonical).unwrap().canonical);

        let legacy = review_event(
            vec![vec!["u", "https://mint.example.com"]],
            "[5/5] legacy url-only review",
        );
        assert!(!parse_review(&legacy).unwrap().canonical);
    }

    #[test]
    fn test_mint_identifier_prefers_normalized_url() {
        let event = review_event(
            vec![vec!["d", "aabbcc"], vec!["u", "https://Mint.Example.com/"]],
            "identifier resolution check",
        );
        let review = parse_review(&event).unwrap();
        assert_eq!(review.mint_identifier().as_deref(), Some("mint.example.com"));
    }

    // =========================================================================
    // Title & content cleaning
    // =========================================================================

    #[test]
    fn test_title_strips_rating_prefix() {
        let event = review_event(
            vec![vec!["u", "https://mint.example.com"]],
            "[4/5] Reliable mint. Never had a failed swap in months of use.",
        );
        assert_eq!(parse_review(&event).unwrap().title, "Reliable mint");
    }

    #[test]
    fn test_title_truncates_long_content() {
        let content = "x".repeat(200);
        let event = review_event(vec![vec!["u", "https://mint.example.com"]], &content);
        let title = parse_review(&event).unwrap().title;
        assert!(title.ends_with("..."));
        assert_eq!(title.chars().count(), 63);
    }

    #[test]
    fn test_clean_content_strips_reviewing_footer() {
        let cleaned = clean_content(
            "[5/5] Great uptime and fast swaps.\n\nReviewing: https://mint.example.com",
        );
        assert_eq!(cleaned, "Great uptime and fast swaps.");
    }
}
