//! The review engine: one pipeline, parameterized by scope.
//!
//! Every surface (a single mint's feed, the popular-mints ranking, the
//! global recent-reviews list, the all-mints listing) runs the same
//! validate → match → store → rank/paginate pipeline with different filter
//! and ranking configuration. Stores are scoped per query and rebuilt on
//! each fresh fetch; only the profile and mint-info caches are shared.

use std::collections::HashMap;
use std::time::Duration;

use nostr_sdk::prelude::*;
use parking_lot::Mutex;
use serde::Serialize;

use mintdex_core::url::normalize_mint_url;
use mintdex_core::{
    MintAnnouncement, MintMatch, ReviewRecord, is_cashu_review, match_review, parse_announcement,
    parse_review,
};

use crate::config::EngineConfig;
use crate::error::Result;
use crate::mint_info::MintInfoClient;
use crate::pagination::Pagination;
use crate::profile::{Profile, ProfileCache};
use crate::rank;
use crate::relay::RelayPool;
use crate::store::{MintAggregate, ReviewStore};
use crate::subscribe::{Collected, FetchScope, ScopeSubscription, build_filters};

/// A page of reviews for one mint.
#[derive(Debug, Clone, Serialize)]
pub struct ReviewFeed {
    /// Surviving reviews, newest first. Cumulative across "load more".
    pub reviews: Vec<ReviewRecord>,
    /// Whether another "load more" is likely to surface new reviews.
    pub has_more: bool,
    /// False when the fetch hit its budget before every endpoint
    /// finished; the reviews are then a best-effort partial result.
    pub complete: bool,
}

/// Per-mint fetch session: the store and pagination survive across
/// "load more" calls and reset on a fresh fetch.
struct MintSession {
    store: ReviewStore,
    pagination: Pagination,
    pubkey: Option<String>,
}

/// The engine. One instance owns the relay pool and the shared caches;
/// it is cheap to call concurrently for different scopes.
pub struct ReviewEngine {
    config: EngineConfig,
    pool: RelayPool,
    sessions: Mutex<HashMap<String, MintSession>>,
    /// Open subscription ids per scope, so a new fetch can supersede a
    /// still-running one instead of racing it into the same result set.
    active: Mutex<HashMap<String, Vec<SubscriptionId>>>,
    profiles: ProfileCache,
    mint_info: MintInfoClient,
}

impl ReviewEngine {
    /// Open the relay pool and build an engine. Connectivity problems do
    /// not fail this: a dark pool just produces empty results.
    pub async fn connect(config: EngineConfig) -> Result<Self> {
        let pool = RelayPool::connect(&config).await;
        let mint_info = MintInfoClient::new(&config)?;
        let profiles = ProfileCache::new(
            config.profile_cache_capacity,
            config.profile_cache_ttl,
            config.profile_timeout,
        );

        Ok(Self {
            config,
            pool,
            sessions: Mutex::new(HashMap::new()),
            active: Mutex::new(HashMap::new()),
            profiles,
            mint_info,
        })
    }

    /// Fresh fetch of one mint's review feed. Resets any previous session
    /// for this mint.
    pub async fn fetch_reviews(&self, mint_url: &str) -> Result<ReviewFeed> {
        self.fetch_mint(mint_url, false).await
    }

    /// Widen the fetch window for a mint and re-fetch, reconciling into
    /// the existing session. Returns the cumulative feed.
    pub async fn load_more_reviews(&self, mint_url: &str) -> Result<ReviewFeed> {
        self.fetch_mint(mint_url, true).await
    }

    /// Ranked top-N Cashu mints by review volume and quality.
    pub async fn fetch_popular_mints(&self, limit: usize) -> Result<Vec<MintAggregate>> {
        let scope = FetchScope::AllReviews {
            limit: self.config.global_limit,
            since: Some(lookback(self.config.popular_window)),
        };
        let collected = self.run_scope("popular-mints", scope).await;

        let mut store = ReviewStore::new();
        ingest_global(&mut store, &collected.events);

        Ok(rank::rank(store.aggregates(), limit))
    }

    /// Most recent Cashu reviews across all mints.
    pub async fn fetch_global_reviews(&self, limit: usize) -> Result<Vec<ReviewRecord>> {
        let scope = FetchScope::AllReviews {
            limit: limit.max(self.config.global_limit),
            since: Some(lookback(self.config.recent_window)),
        };
        let collected = self.run_scope("global-reviews", scope).await;

        let mut store = ReviewStore::new();
        ingest_global(&mut store, &collected.events);

        let mut reviews = store.snapshot();
        reviews.truncate(limit);
        Ok(reviews)
    }

    /// Unranked listing of announced mints, newest announcement per URL.
    pub async fn fetch_mint_announcements(&self, limit: usize) -> Result<Vec<MintAnnouncement>> {
        let scope = FetchScope::Announcements { limit };
        let collected = self.run_scope("announcements", scope).await;

        let mut latest: HashMap<String, MintAnnouncement> = HashMap::new();
        for event in &collected.events {
            let Some(announcement) = parse_announcement(event) else {
                continue;
            };
            let key = normalize_mint_url(&announcement.mint_url);
            match latest.get(&key) {
                Some(existing) if existing.created_at >= announcement.created_at => {}
                _ => {
                    latest.insert(key, announcement);
                }
            }
        }

        let mut announcements: Vec<MintAnnouncement> = latest.into_values().collect();
        announcements.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        announcements.truncate(limit);
        Ok(announcements)
    }

    /// Author display metadata, from the shared cache.
    pub async fn profile(&self, pubkey: &str) -> Option<Profile> {
        let pk = PublicKey::from_hex(pubkey).ok()?;
        self.profiles.get_or_fetch(self.pool.client(), &pk).await
    }

    /// Disconnect the pool.
    pub async fn shutdown(&self) {
        self.pool.shutdown().await;
    }

    async fn fetch_mint(&self, mint_url: &str, load_more: bool) -> Result<ReviewFeed> {
        let scope_key = normalize_mint_url(mint_url);

        // Session bookkeeping happens under the lock, with no awaits.
        let (limit, known_pubkey) = {
            let mut sessions = self.sessions.lock();
            if !load_more {
                sessions.remove(&scope_key);
            }
            let session = sessions
                .entry(scope_key.clone())
                .or_insert_with(|| self.new_session());
            if load_more {
                session.pagination.widen();
            }
            (session.pagination.limit(), session.pubkey.clone())
        };

        // Resolve the mint pubkey for the canonical filter. Absence is a
        // warning, not a failure: matching degrades to legacy-only.
        let pubkey = match known_pubkey {
            Some(pk) => Some(pk),
            None => self.mint_info.resolve_pubkey(mint_url).await,
        };
        if pubkey.is_none() {
            tracing::warn!(
                "Mint pubkey unavailable for {}, running legacy filter only",
                scope_key
            );
        }

        let scope = FetchScope::SingleMint {
            url: mint_url.to_string(),
            pubkey: pubkey.clone(),
            limit,
        };
        let collected = self.run_scope(&scope_key, scope).await;

        let mut sessions = self.sessions.lock();
        let session = sessions
            .entry(scope_key.clone())
            .or_insert_with(|| self.new_session());
        session.pubkey = pubkey.clone();

        let before = session.store.len();
        let novel = ingest_for_mint(
            &mut session.store,
            &scope_key,
            &collected.events,
            mint_url,
            pubkey.as_deref(),
        );
        let after = session.store.len();
        session
            .pagination
            .note_fetch(before, after, collected.raw_count);

        tracing::debug!(
            "Fetch {}: {} raw events, {} novel, {} surviving, complete={}",
            scope_key,
            collected.raw_count,
            novel,
            after,
            collected.complete
        );

        Ok(ReviewFeed {
            reviews: session.store.snapshot(),
            has_more: session.pagination.has_more(),
            complete: collected.complete,
        })
    }

    fn new_session(&self) -> MintSession {
        MintSession {
            store: ReviewStore::new(),
            pagination: Pagination::new(self.config.initial_limit, self.config.load_more_increment),
            pubkey: None,
        }
    }

    /// Supersede any open subscription for the scope, run a new one to
    /// completion, and clean up after it.
    async fn run_scope(&self, scope_key: &str, scope: FetchScope) -> Collected {
        self.cancel_scope(scope_key).await;

        let filters = build_filters(&scope);
        let subscription = ScopeSubscription::open(&self.pool, filters).await;
        let ids = subscription.ids().to_vec();
        self.active
            .lock()
            .insert(scope_key.to_string(), ids.clone());

        let collected = subscription
            .collect(&self.pool, self.config.fetch_timeout)
            .await;

        // Only clear our own registration; a superseding fetch may have
        // replaced it already.
        let mut active = self.active.lock();
        if active.get(scope_key).is_some_and(|current| *current == ids) {
            active.remove(scope_key);
        }

        collected
    }

    async fn cancel_scope(&self, scope_key: &str) {
        let previous = self.active.lock().remove(scope_key);
        if let Some(ids) = previous {
            tracing::debug!("Superseding open subscription for {}", scope_key);
            for id in ids {
                self.pool.client().unsubscribe(&id).await;
            }
        }
    }
}

/// Single-mint pipeline step: validate, match against the target, ingest.
/// Returns how many records were novel (inserted or replaced older ones).
fn ingest_for_mint(
    store: &mut ReviewStore,
    scope_key: &str,
    events: &[Event],
    target_url: &str,
    target_pubkey: Option<&str>,
) -> usize {
    let mut novel = 0usize;
    for event in events {
        let mut record = match parse_review(event) {
            Ok(record) => record,
            Err(reason) => {
                metrics::counter!("review_events_rejected_total", "reason" => reason.label())
                    .increment(1);
                tracing::trace!("Dropped event {}: {}", event.id, reason);
                continue;
            }
        };

        let decision = match_review(&record, target_url, target_pubkey);
        if !decision.is_match() {
            continue;
        }
        record.canonical = decision == MintMatch::Canonical;

        if store.ingest(scope_key, record) {
            novel += 1;
        }
    }
    novel
}

/// Global pipeline step: validate, keep Cashu-only, ingest under each
/// record's own mint identifier.
fn ingest_global(store: &mut ReviewStore, events: &[Event]) {
    for event in events {
        let record = match parse_review(event) {
            Ok(record) => record,
            Err(reason) => {
                metrics::counter!("review_events_rejected_total", "reason" => reason.label())
                    .increment(1);
                continue;
            }
        };
        if !is_cashu_review(&record) {
            continue;
        }
        let Some(mint_key) = record.mint_identifier() else {
            continue;
        };
        store.ingest(&mint_key, record);
    }
}

/// Timestamp `window` before now, for `since` filters.
fn lookback(window: Duration) -> Timestamp {
    Timestamp::from_secs(Timestamp::now().as_u64().saturating_sub(window.as_secs()))
}
