//! Core types, parsing, and matching for Cashu mint reviews.
//!
//! This crate implements the protocol-facing half of the mintdex review
//! engine: classifying raw Nostr events into typed review records and mint
//! announcements, extracting ratings from semi-structured content, filtering
//! spam, and deciding whether a review pertains to a given mint.
//!
//! Everything here is pure: no I/O, no clocks, no shared state. The
//! [`mintdex-reviews`] crate owns the relay connections and drives these
//! functions from its ingestion loop.
//!
//! [`mintdex-reviews`]: https://crates.io/crates/mintdex-reviews

pub mod announcement;
pub mod classify;
pub mod matcher;
pub mod review;
pub mod url;

// ═══════════════════════════════════════════════════════════════════════════
// Constants
// ═══════════════════════════════════════════════════════════════════════════

/// NIP-87 mint recommendation/review event kind.
pub const REVIEW_KIND: u16 = 38000;

/// NIP-87 Cashu mint announcement event kind.
pub const MINT_ANNOUNCEMENT_KIND: u16 = 38172;

pub use announcement::{MintAnnouncement, parse_announcement};
pub use classify::is_cashu_review;
pub use matcher::{MintMatch, match_review};
pub use review::{RejectReason, ReviewRecord, clean_content, parse_review};

/// Look up the first value of a tag by name.
///
/// Nostr tags are ordered string arrays where the first element names the
/// tag; this returns the second element of the first matching tag.
pub(crate) fn tag_value<'a>(event: &'a nostr::Event, name: &str) -> Option<&'a str> {
    event.tags.iter().find_map(|tag| {
        let tag = tag.as_slice();
        if tag.first().map(|s| s.as_str()) == Some(name) {
            tag.get(1).map(|s| s.as_str())
        } else {
            None
        }
    })
}
