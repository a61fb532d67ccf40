//! In-memory deduplication and aggregation store.
//!
//! One store exists per logical query scope (one mint, or a single global
//! scope) and lives only for that query session; nothing is persisted.
//! The store enforces replaceable-event semantics: per (author, mint) pair
//! only the newest record survives, which makes the final contents
//! independent of the order events happen to arrive from the relays.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use mintdex_core::ReviewRecord;
use mintdex_core::url::{mint_display_name, mint_domain, normalize_mint_url};

/// Per-mint statistics derived from surviving reviews.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MintAggregate {
    /// Normalized mint URL.
    pub mint_url: String,
    /// Human-readable name derived from the URL.
    pub mint_name: String,
    /// Domain component of the URL.
    pub domain: String,
    /// Number of distinct authors with a surviving review.
    pub review_count: usize,
    /// Mean rating across surviving reviews.
    pub average_rating: f64,
    /// Timestamp of the newest surviving review.
    pub last_review_at: u64,
}

/// Deduplicating review store for one query scope.
#[derive(Debug, Default)]
pub struct ReviewStore {
    /// Surviving records keyed by (author, mint identifier).
    records: HashMap<(String, String), ReviewRecord>,
    /// Every event id ever ingested, for idempotence across fetches.
    seen_ids: HashSet<String>,
}

impl ReviewStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ingest a record under the given mint key.
    ///
    /// Replaceable-event rule: if the (author, mint) slot is occupied, the
    /// incoming record wins only with a strictly greater `created_at`;
    /// equal timestamps keep the existing record, a deterministic
    /// tie-break. Returns `true` when the record was inserted or replaced
    /// an older one.
    pub fn ingest(&mut self, mint_key: &str, record: ReviewRecord) -> bool {
        if !self.seen_ids.insert(record.id.clone()) {
            return false;
        }

        let key = (record.author.clone(), mint_key.to_string());
        match self.records.get(&key) {
            Some(existing) if existing.created_at >= record.created_at => false,
            _ => {
                self.records.insert(key, record);
                true
            }
        }
    }

    /// Number of surviving records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All surviving records, newest first. Pure: repeated calls return
    /// the same result and never mutate the store.
    pub fn snapshot(&self) -> Vec<ReviewRecord> {
        let mut records: Vec<ReviewRecord> = self.records.values().cloned().collect();
        records.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        records
    }

    /// Derive per-mint aggregates from the surviving records.
    ///
    /// Counts and averages are recomputed from scratch on every call; the
    /// replace-on-ingest rule would make incremental adjustment drift.
    /// Records without a mint URL cannot be attributed and are skipped.
    pub fn aggregates(&self) -> Vec<MintAggregate> {
        let mut groups: HashMap<String, Vec<&ReviewRecord>> = HashMap::new();
        for record in self.records.values() {
            if let Some(url) = record.mint_url.as_deref() {
                groups.entry(normalize_mint_url(url)).or_default().push(record);
            }
        }

        let mut aggregates: Vec<MintAggregate> = groups
            .into_iter()
            .map(|(mint_url, records)| {
                let review_count = records.len();
                let total: u64 = records.iter().map(|r| u64::from(r.rating)).sum();
                let last_review_at = records.iter().map(|r| r.created_at).max().unwrap_or(0);
                MintAggregate {
                    mint_name: mint_display_name(&mint_url),
                    domain: mint_domain(&mint_url),
                    mint_url,
                    review_count,
                    average_rating: total as f64 / review_count as f64,
                    last_review_at,
                }
            })
            .collect();

        aggregates.sort_by(|a, b| a.mint_url.cmp(&b.mint_url));
        aggregates
    }
}
