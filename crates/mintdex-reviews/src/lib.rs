//! Review ingestion, deduplication, and ranking engine for Cashu mints.
//!
//! This crate owns everything between the relay sockets and the data the
//! directory surfaces render: it fans subscriptions out over a pool of
//! unreliable relay endpoints, reconciles duplicate and superseded
//! submissions, and derives the per-mint feed and the global rankings.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐
//! │    RelayPool     │  fixed endpoint set, parallel connect, one fallback
//! └────────┬─────────┘
//!          │
//!          ▼
//! ┌──────────────────┐
//! │ScopeSubscription │  filters per scope, drained to EOSE or timeout
//! └────────┬─────────┘
//!          │
//!          ▼
//! ┌──────────────────┐
//! │ parse / match    │  mintdex-core: validation, rating, mint matcher
//! └────────┬─────────┘
//!          │
//!          ▼
//! ┌──────────────────┐
//! │   ReviewStore    │  (author, mint) latest-wins dedup, aggregates
//! └────────┬─────────┘
//!          │
//!          ▼
//! ┌──────────────────┐
//! │ rank / paginate  │  composite top-N score, load-more sessions
//! └──────────────────┘
//! ```
//!
//! All failure handling is best-effort: dead relays are skipped, malformed
//! events dropped, and a timeout delivers whatever accumulated.
//! The only way to get an error out of a fetch is subscription bookkeeping
//! itself failing.

pub mod config;
pub mod engine;
pub mod error;
pub mod mint_info;
pub mod pagination;
pub mod profile;
pub mod rank;
pub mod relay;
pub mod store;
pub mod subscribe;

pub use config::EngineConfig;
pub use engine::{ReviewEngine, ReviewFeed};
pub use error::{Error, Result};
pub use mint_info::{MintInfo, MintInfoClient};
pub use profile::{Profile, ProfileCache};
pub use relay::RelayPool;
pub use store::{MintAggregate, ReviewStore};
pub use subscribe::FetchScope;

// Re-export the core types consumers need alongside the engine.
pub use mintdex_core::{MintAnnouncement, ReviewRecord};
