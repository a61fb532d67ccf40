//! Scope subscriptions: filter construction and the EOSE-or-timeout drain.
//!
//! Each fetch scope expands to one or more filters, each issued as its own
//! subscription across every pool endpoint. The drain loop is the single
//! join point for completion: it ends when every connected endpoint has
//! signalled EOSE for every filter, or when the wall-clock budget elapses.
//! A timeout is not an error: whatever accumulated is delivered.

use std::collections::HashSet;
use std::time::Duration;

use nostr_sdk::prelude::*;
use tokio::time::Instant;

use mintdex_core::url::legacy_url_variants;
use mintdex_core::{MINT_ANNOUNCEMENT_KIND, REVIEW_KIND};

use crate::relay::RelayPool;

/// What a fetch is asking for.
#[derive(Debug, Clone)]
pub enum FetchScope {
    /// Reviews of one mint. `pubkey` is the mint's published public key
    /// when metadata resolution succeeded; without it only the legacy URL
    /// filter runs.
    SingleMint {
        url: String,
        pubkey: Option<String>,
        limit: usize,
    },
    /// Reviews across all mints, optionally bounded to a lookback window.
    AllReviews {
        limit: usize,
        since: Option<Timestamp>,
    },
    /// Mint announcements.
    Announcements { limit: usize },
}

/// Expand a scope into its relay filters.
///
/// For a single mint both the canonical and the legacy filter run together
/// (unioned by event id downstream); the canonical one is omitted when the
/// mint pubkey is unresolved.
pub fn build_filters(scope: &FetchScope) -> Vec<Filter> {
    match scope {
        FetchScope::SingleMint { url, pubkey, limit } => {
            let mut filters = Vec::with_capacity(2);

            if let Some(pubkey) = pubkey {
                filters.push(
                    Filter::new()
                        .kind(Kind::Custom(REVIEW_KIND))
                        .custom_tags(SingleLetterTag::lowercase(Alphabet::D), [pubkey.clone()])
                        .custom_tags(
                            SingleLetterTag::lowercase(Alphabet::K),
                            [MINT_ANNOUNCEMENT_KIND.to_string()],
                        )
                        .limit(*limit),
                );
            }

            filters.push(
                Filter::new()
                    .kind(Kind::Custom(REVIEW_KIND))
                    .custom_tags(
                        SingleLetterTag::lowercase(Alphabet::U),
                        legacy_url_variants(url),
                    )
                    .limit(*limit),
            );

            filters
        }
        FetchScope::AllReviews { limit, since } => {
            let mut filter = Filter::new().kind(Kind::Custom(REVIEW_KIND)).limit(*limit);
            if let Some(since) = since {
                filter = filter.since(*since);
            }
            vec![filter]
        }
        FetchScope::Announcements { limit } => {
            vec![
                Filter::new()
                    .kind(Kind::Custom(MINT_ANNOUNCEMENT_KIND))
                    .limit(*limit),
            ]
        }
    }
}

/// Outcome of draining a scope subscription.
#[derive(Debug)]
pub struct Collected {
    /// Distinct events, deduplicated by id across endpoints and filters.
    pub events: Vec<Event>,
    /// Raw event notifications received, duplicates included.
    pub raw_count: usize,
    /// Whether every connected endpoint signalled EOSE for every filter
    /// (false means the budget elapsed first).
    pub complete: bool,
}

/// An open fan-out subscription for one scope.
pub struct ScopeSubscription {
    ids: Vec<SubscriptionId>,
    notifications: tokio::sync::broadcast::Receiver<RelayPoolNotification>,
    expected_relays: HashSet<RelayUrl>,
}

impl ScopeSubscription {
    /// Subscribe the scope's filters across the pool.
    ///
    /// The notification receiver is taken before subscribing so no early
    /// events are missed. Filters that fail to subscribe (e.g. an empty
    /// pool) are skipped; an entirely empty subscription still collects,
    /// it just completes empty.
    pub async fn open(pool: &RelayPool, filters: Vec<Filter>) -> Self {
        let client = pool.client();
        let notifications = client.notifications();

        let expected_relays: HashSet<RelayUrl> = client
            .relays()
            .await
            .iter()
            .filter(|(_, relay)| relay.status() == RelayStatus::Connected)
            .map(|(url, _)| url.clone())
            .collect();

        let mut ids = Vec::with_capacity(filters.len());
        for filter in filters {
            match client.subscribe(filter, None).await {
                Ok(output) => ids.push(output.val),
                Err(e) => tracing::warn!("Failed to subscribe filter: {}", e),
            }
        }

        Self {
            ids,
            notifications,
            expected_relays,
        }
    }

    /// Subscription ids held by this scope.
    pub fn ids(&self) -> &[SubscriptionId] {
        &self.ids
    }

    /// Drain until every expected endpoint has signalled EOSE for every
    /// filter, or `budget` elapses. Closes the subscriptions before
    /// returning.
    pub async fn collect(mut self, pool: &RelayPool, budget: Duration) -> Collected {
        let deadline = Instant::now() + budget;
        let id_set: HashSet<SubscriptionId> = self.ids.iter().cloned().collect();
        let expected_eose = self.expected_relays.len() * self.ids.len();

        let mut seen: HashSet<EventId> = HashSet::new();
        let mut events: Vec<Event> = Vec::new();
        let mut raw_count = 0usize;
        let mut eose: HashSet<(RelayUrl, SubscriptionId)> = HashSet::new();
        let mut complete = self.ids.is_empty();

        while !complete {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                metrics::counter!("fetch_timeouts_total").increment(1);
                tracing::debug!(
                    "Fetch budget elapsed with {}/{} EOSE signals, {} events collected",
                    eose.len(),
                    expected_eose,
                    events.len()
                );
                break;
            }

            let notification =
                match tokio::time::timeout(remaining, self.notifications.recv()).await {
                    Ok(Ok(n)) => n,
                    Ok(Err(tokio::sync::broadcast::error::RecvError::Lagged(count))) => {
                        metrics::counter!("relay_notifications_lagged_total").increment(count);
                        continue;
                    }
                    Ok(Err(tokio::sync::broadcast::error::RecvError::Closed)) => break,
                    Err(_) => continue, // deadline re-checked at loop top
                };

            match notification {
                RelayPoolNotification::Event {
                    subscription_id,
                    event,
                    ..
                } => {
                    if !id_set.contains(&subscription_id) {
                        continue;
                    }
                    raw_count += 1;
                    metrics::counter!("review_events_received_total").increment(1);

                    // Union across filters/endpoints: one event id, one pass
                    // through the downstream pipeline.
                    if seen.insert(event.id) {
                        events.push(*event);
                    }
                }
                RelayPoolNotification::Message { relay_url, message } => {
                    match message {
                        RelayMessage::EndOfStoredEvents(sid) => {
                            let sid = sid.as_ref();
                            if id_set.contains(sid) && self.expected_relays.contains(&relay_url) {
                                eose.insert((relay_url, sid.clone()));
                            }
                        }
                        // A closed subscription will never EOSE; count it as
                        // done so one hostile relay can't pin us to the
                        // timeout.
                        RelayMessage::Closed {
                            subscription_id, ..
                        } => {
                            let sid = subscription_id.as_ref();
                            if id_set.contains(sid) && self.expected_relays.contains(&relay_url) {
                                eose.insert((relay_url, sid.clone()));
                            }
                        }
                        _ => {}
                    }

                    // With zero connected endpoints there is nothing to
                    // wait for except the timeout.
                    if expected_eose > 0 && eose.len() >= expected_eose {
                        complete = true;
                    }
                }
                RelayPoolNotification::Shutdown => break,
            }
        }

        self.close(pool).await;

        Collected {
            events,
            raw_count,
            complete,
        }
    }

    async fn close(&self, pool: &RelayPool) {
        for id in &self.ids {
            pool.client().unsubscribe(id).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_mint_filters_with_pubkey() {
        let scope = FetchScope::SingleMint {
            url: "https://mint.example.com".to_string(),
            pubkey: Some("aabbcc".to_string()),
            limit: 500,
        };
        let filters = build_filters(&scope);
        assert_eq!(filters.len(), 2);

        let canonical = filters[0].as_json();
        assert!(canonical.contains("\"#d\""));
        assert!(canonical.contains("aabbcc"));
        assert!(canonical.contains("38172"));
        assert!(canonical.contains("38000"));

        let legacy = filters[1].as_json();
        assert!(legacy.contains("\"#u\""));
        assert!(legacy.contains("https://mint.example.com"));
        assert!(legacy.contains("http://mint.example.com"));
        assert!(legacy.contains("\"mint.example.com\""));
    }

    #[test]
    fn test_single_mint_filters_without_pubkey() {
        let scope = FetchScope::SingleMint {
            url: "https://mint.example.com".to_string(),
            pubkey: None,
            limit: 500,
        };
        let filters = build_filters(&scope);
        assert_eq!(filters.len(), 1);
        assert!(filters[0].as_json().contains("\"#u\""));
    }

    #[test]
    fn test_all_reviews_filter_with_window() {
        let scope = FetchScope::AllReviews {
            limit: 200,
            since: Some(Timestamp::from_secs(1_700_000_000)),
        };
        let filters = build_filters(&scope);
        assert_eq!(filters.len(), 1);
        let json = filters[0].as_json();
        assert!(json.contains("38000"));
        assert!(json.contains("\"since\""));
        assert!(json.contains("\"limit\":200"));
    }

    #[test]
    fn test_announcements_filter() {
        let filters = build_filters(&FetchScope::Announcements { limit: 100 });
        assert_eq!(filters.len(), 1);
        assert!(filters[0].as_json().contains("38172"));
    }
}
