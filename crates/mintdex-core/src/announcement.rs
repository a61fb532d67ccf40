//! Mint announcement (kind 38172) parsing.

use serde::Serialize;

use crate::{MINT_ANNOUNCEMENT_KIND, tag_value};

/// A Cashu mint announcement derived from a kind 38172 event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MintAnnouncement {
    /// Event id (hex).
    pub id: String,
    /// Announcing public key (hex). Usually the mint operator.
    pub author: String,
    /// Announced mint URL (`u` tag), as written.
    pub mint_url: String,
    /// Event timestamp (unix seconds).
    pub created_at: u64,
}

/// Parse a mint announcement. Returns `None` for other kinds or
/// announcements without a mint URL.
pub fn parse_announcement(event: &nostr::Event) -> Option<MintAnnouncement> {
    if event.kind.as_u16() != MINT_ANNOUNCEMENT_KIND {
        return None;
    }
    let mint_url = tag_value(event, "u")?.to_string();
    if mint_url.is_empty() {
        return None;
    }

    Some(MintAnnouncement {
        id: event.id.to_hex(),
        author: event.pubkey.to_hex(),
        mint_url,
        created_at: event.created_at.as_u64(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use nostr::{EventBuilder, Keys, Kind, Tag};

    #[test]
    fn test_parse_announcement() {
        let keys = Keys::generate();
        let event = EventBuilder::new(Kind::Custom(MINT_ANNOUNCEMENT_KIND), "")
            .tags([Tag::parse(["u", "https://mint.example.com"]).unwrap()])
            .sign_with_keys(&keys)
            .unwrap();

        let announcement = parse_announcement(&event).unwrap();
        assert_eq!(announcement.mint_url, "https://mint.example.com");
        assert_eq!(announcement.author, keys.public_key().to_hex());
    }

    #[test]
    fn test_rejects_missing_url() {
        let keys = Keys::generate();
        let event = EventBuilder::new(Kind::Custom(MINT_ANNOUNCEMENT_KIND), "")
            .sign_with_keys(&keys)
            .unwrap();
        assert!(parse_announcement(&event).is_none());
    }

    #[test]
    fn test_rejects_other_kinds() {
        let keys = Keys::generate();
        let event = EventBuilder::new(Kind::Custom(crate::REVIEW_KIND), "not an announcement")
            .tags([Tag::parse(["u", "https://mint.example.com"]).unwrap()])
            .sign_with_keys(&keys)
            .unwrap();
        assert!(parse_announcement(&event).is_none());
    }
}
