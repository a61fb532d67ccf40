//! Author profile cache (kind 0 metadata).
//!
//! The one truly global resource in the engine: review authors repeat
//! across mints, so their display metadata is cached once and shared by
//! every scope. It is read-mostly and eventually consistent: redundant
//! concurrent fetches for the same key are tolerated, last writer wins,
//! and a miss never blocks or fails a review fetch.

use std::time::Duration;

use moka::future::Cache;
use nostr_sdk::prelude::*;
use serde::Serialize;

/// Display metadata for a review author.
#[derive(Debug, Clone, Serialize)]
pub struct Profile {
    pub name: Option<String>,
    pub display_name: Option<String>,
    pub picture: Option<String>,
}

impl Profile {
    /// Best display string for this author, falling back to a shortened
    /// pubkey.
    pub fn display(&self, pubkey: &str) -> String {
        self.display_name
            .clone()
            .or_else(|| self.name.clone())
            .unwrap_or_else(|| short_pubkey(pubkey))
    }
}

/// Shorten a hex pubkey for display: first eight characters and an
/// ellipsis.
pub fn short_pubkey(pubkey: &str) -> String {
    if pubkey.len() <= 8 {
        return pubkey.to_string();
    }
    format!("{}...", &pubkey[..8])
}

/// Bounded, TTL-expiring profile cache.
pub struct ProfileCache {
    cache: Cache<PublicKey, Profile>,
    timeout: Duration,
}

impl ProfileCache {
    pub fn new(capacity: u64, ttl: Duration, timeout: Duration) -> Self {
        Self {
            cache: Cache::builder()
                .max_capacity(capacity)
                .time_to_live(ttl)
                .build(),
            timeout,
        }
    }

    /// Look up a profile, fetching the author's newest kind 0 event over
    /// the pool on a miss. Returns `None` when no metadata is found within
    /// the timeout; misses are not cached.
    pub async fn get_or_fetch(&self, client: &Client, pubkey: &PublicKey) -> Option<Profile> {
        if let Some(profile) = self.cache.get(pubkey).await {
            return Some(profile);
        }

        let filter = Filter::new().kind(Kind::Metadata).author(*pubkey).limit(1);
        let events = match client.fetch_events(filter, self.timeout).await {
            Ok(events) => events,
            Err(e) => {
                tracing::debug!("Profile fetch failed for {}: {}", pubkey, e);
                return None;
            }
        };

        // Relays may disagree; the newest metadata event wins.
        let newest = events.into_iter().max_by_key(|e| e.created_at)?;
        let metadata = Metadata::from_json(&newest.content).ok()?;
        let profile = Profile {
            name: metadata.name,
            display_name: metadata.display_name,
            picture: metadata.picture,
        };

        self.cache.insert(*pubkey, profile.clone()).await;
        Some(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_pubkey() {
        let pk = "35e433c42e5bb838daabd178d54620e427cccb214c55b95daac3dbd9506fbcaf";
        assert_eq!(short_pubkey(pk), "35e433c4...");
        assert_eq!(short_pubkey("abcd"), "abcd");
    }

    #[test]
    fn test_display_prefers_display_name() {
        let profile = Profile {
            name: Some("alice".to_string()),
            display_name: Some("Alice".to_string()),
            picture: None,
        };
        assert_eq!(profile.display("35e433c4aa"), "Alice");

        let bare = Profile {
            name: None,
            display_name: None,
            picture: None,
        };
        assert_eq!(bare.display("35e433c42e5bb838"), "35e433c4...");
    }
}
