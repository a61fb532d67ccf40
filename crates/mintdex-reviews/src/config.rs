//! Engine configuration.

use std::time::Duration;

/// Configuration for the review engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Relay endpoints to fan subscriptions out to.
    pub relays: Vec<String>,

    /// Single endpoint to try once if none of the primary relays connect.
    pub fallback_relay: Option<String>,

    /// Grace period after connect() before counting live endpoints.
    pub connect_grace: Duration,

    /// Wall-clock budget for one fetch: the subscription completes when
    /// every connected endpoint has signalled EOSE or this elapses.
    /// Identical for initial fetches and "load more".
    pub fetch_timeout: Duration,

    /// Initial per-filter event limit for a single-mint fetch.
    pub initial_limit: usize,

    /// How much each "load more" widens the fetch limit.
    pub load_more_increment: usize,

    /// Per-filter event limit for the global scopes.
    pub global_limit: usize,

    /// Lookback window for the recent-reviews surface.
    pub recent_window: Duration,

    /// Lookback window for the popular-mints surface.
    pub popular_window: Duration,

    /// Timeout for a mint's /v1/info metadata fetch.
    pub info_timeout: Duration,

    /// Resolved mint pubkey cache: maximum entries.
    pub info_cache_capacity: u64,

    /// Resolved mint pubkey cache: time to live.
    pub info_cache_ttl: Duration,

    /// Author profile cache: maximum entries.
    pub profile_cache_capacity: u64,

    /// Author profile cache: time to live.
    pub profile_cache_ttl: Duration,

    /// Timeout for an author profile (kind 0) fetch.
    pub profile_timeout: Duration,

    /// Size of the relay notification channel buffer.
    pub notification_channel_size: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            relays: vec![
                "wss://relay.cashumints.space".to_string(),
                "wss://relay.damus.io".to_string(),
                "wss://nos.lol".to_string(),
                "wss://relay.snort.social".to_string(),
                "wss://relay.primal.net".to_string(),
                "wss://relay.azzamo.net".to_string(),
            ],
            fallback_relay: Some("wss://relay.damus.io".to_string()),
            connect_grace: Duration::from_secs(2),
            fetch_timeout: Duration::from_secs(15),
            initial_limit: 500,
            load_more_increment: 500,
            global_limit: 500,
            recent_window: Duration::from_secs(30 * 24 * 60 * 60),
            popular_window: Duration::from_secs(90 * 24 * 60 * 60),
            info_timeout: Duration::from_secs(10),
            info_cache_capacity: 1_000,
            info_cache_ttl: Duration::from_secs(600),
            profile_cache_capacity: 1_000,
            profile_cache_ttl: Duration::from_secs(900),
            profile_timeout: Duration::from_secs(5),
            notification_channel_size: 16_384,
        }
    }
}
