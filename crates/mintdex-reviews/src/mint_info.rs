//! Mint metadata client (`GET /v1/info`).
//!
//! The only thing the engine needs from a mint's metadata endpoint is its
//! published public key, which parameterizes the canonical review filter.
//! Everything here degrades gracefully: an unreachable or Tor-only mint
//! resolves to `None` and matching falls back to the legacy URL path.

use std::time::Duration;

use moka::future::Cache;
use serde::Deserialize;

use mintdex_core::url::{is_onion_host, normalize_mint_url};

use crate::config::EngineConfig;
use crate::error::Result;

/// Subset of the Cashu mint info response this engine consumes.
#[derive(Debug, Clone, Deserialize)]
pub struct MintInfo {
    /// The mint's published public key (hex).
    pub pubkey: Option<String>,
    /// Mint display name.
    pub name: Option<String>,
    /// Mint software version string.
    pub version: Option<String>,
}

/// HTTP client with a bounded pubkey cache.
pub struct MintInfoClient {
    http: reqwest::Client,
    /// normalized host-path -> resolved pubkey. Failures are not cached,
    /// so a mint that comes back up is picked up on the next fetch.
    pubkeys: Cache<String, String>,
    timeout: Duration,
}

impl MintInfoClient {
    pub fn new(config: &EngineConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.info_timeout)
            .build()?;
        let pubkeys = Cache::builder()
            .max_capacity(config.info_cache_capacity)
            .time_to_live(config.info_cache_ttl)
            .build();
        Ok(Self {
            http,
            pubkeys,
            timeout: config.info_timeout,
        })
    }

    /// Resolve the mint's published public key.
    ///
    /// Returns `None` when the mint is Tor-only, unreachable within the
    /// timeout, or publishes no pubkey; the caller then omits the
    /// canonical filter and proceeds legacy-only.
    pub async fn resolve_pubkey(&self, mint_url: &str) -> Option<String> {
        let host_path = normalize_mint_url(mint_url);

        if is_onion_host(&host_path) {
            tracing::debug!("Skipping info fetch for Tor-only mint {}", host_path);
            return None;
        }

        if let Some(pubkey) = self.pubkeys.get(&host_path).await {
            return Some(pubkey);
        }

        match self.fetch_info(&host_path).await {
            Ok(info) => match info.pubkey.filter(|p| !p.is_empty()) {
                Some(pubkey) => {
                    self.pubkeys.insert(host_path, pubkey.clone()).await;
                    Some(pubkey)
                }
                None => {
                    tracing::warn!("Mint {} info has no pubkey", host_path);
                    None
                }
            },
            Err(e) => {
                tracing::warn!("Mint info fetch failed for {}: {}", host_path, e);
                metrics::counter!("mint_info_failures_total").increment(1);
                None
            }
        }
    }

    /// Fetch the full info document.
    pub async fn fetch_info(&self, host_path: &str) -> Result<MintInfo> {
        let url = info_url(host_path);
        tracing::debug!("Fetching mint info from {}", url);

        let info = self
            .http
            .get(&url)
            .header(reqwest::header::ACCEPT, "application/json")
            .timeout(self.timeout)
            .send()
            .await?
            .error_for_status()?
            .json::<MintInfo>()
            .await?;

        Ok(info)
    }
}

/// Info endpoint for a normalized mint host-path. Always https: the
/// engine never probes plain http, and Tor hosts are filtered upstream.
fn info_url(host_path: &str) -> String {
    format!("https://{host_path}/v1/info")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_info_url_preserves_path() {
        assert_eq!(
            info_url("mint.example.com/cashu"),
            "https://mint.example.com/cashu/v1/info"
        );
    }

    #[test]
    fn test_mint_info_deserializes_with_extra_fields() {
        let json = r#"{
            "name": "Example Mint",
            "pubkey": "aabbccdd",
            "version": "Nutshell/0.16.0",
            "description": "ignored",
            "nuts": {"4": {"disabled": false}}
        }"#;
        let info: MintInfo = serde_json::from_str(json).unwrap();
        assert_eq!(info.pubkey.as_deref(), Some("aabbccdd"));
        assert_eq!(info.name.as_deref(), Some("Example Mint"));
        assert_eq!(info.version.as_deref(), Some("Nutshell/0.16.0"));
    }

    #[test]
    fn test_mint_info_tolerates_missing_pubkey() {
        let info: MintInfo = serde_json::from_str(r#"{"name": "Bare"}"#).unwrap();
        assert!(info.pubkey.is_none());
    }
}
