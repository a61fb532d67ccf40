//! Relay pool: a fixed set of endpoints behind one nostr-sdk client.
//!
//! Endpoint connect failures are logged and skipped, and a pool with zero
//! live endpoints is still usable: its subscriptions simply complete empty
//! at the fetch timeout. If none of the primary endpoints come up, one
//! fallback endpoint is attempted once; there are no further retries.

use nostr_sdk::prelude::*;

use crate::config::EngineConfig;

/// A connected (best-effort) pool of relay endpoints.
pub struct RelayPool {
    client: Client,
}

impl RelayPool {
    /// Open the pool. Never fails: endpoints that refuse to connect are
    /// skipped and the pool proceeds with whatever is live.
    pub async fn connect(config: &EngineConfig) -> Self {
        let pool_opts = RelayPoolOptions::default()
            .notification_channel_size(config.notification_channel_size);
        let opts = Options::new().pool(pool_opts);
        let client = Client::builder().opts(opts).build();

        for url in &config.relays {
            let Some(normalized) = normalize_relay_endpoint(url) else {
                tracing::warn!("Skipping invalid relay endpoint: {}", url);
                continue;
            };
            if let Err(e) = client.add_relay(&normalized).await {
                tracing::warn!("Failed to add relay {}: {}", normalized, e);
            }
        }

        client.connect().await;
        tokio::time::sleep(config.connect_grace).await;

        let mut connected = count_connected(&client).await;
        metrics::counter!("relay_connects_total", "stage" => "primary").increment(connected as u64);

        // One-shot fallback when the primary pool came up completely dark.
        if connected == 0
            && let Some(fallback) = config
                .fallback_relay
                .as_deref()
                .and_then(normalize_relay_endpoint)
        {
            tracing::warn!("No primary relays connected, trying fallback {}", fallback);
            match client.add_relay(&fallback).await {
                Ok(_) => {
                    if let Err(e) = client.connect_relay(&fallback).await {
                        tracing::warn!("Fallback relay {} failed: {}", fallback, e);
                    }
                    tokio::time::sleep(config.connect_grace).await;
                    connected = count_connected(&client).await;
                    metrics::counter!("relay_connects_total", "stage" => "fallback")
                        .increment(connected as u64);
                }
                Err(e) => tracing::warn!("Failed to add fallback relay {}: {}", fallback, e),
            }
        }

        metrics::gauge!("relays_connected").set(connected as f64);
        tracing::info!(
            "Relay pool ready: {}/{} endpoints connected",
            connected,
            config.relays.len()
        );

        Self { client }
    }

    /// The underlying client.
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Number of endpoints currently in the connected state.
    pub async fn connected_count(&self) -> usize {
        count_connected(&self.client).await
    }

    /// Disconnect all endpoints.
    pub async fn shutdown(&self) {
        self.client.disconnect().await;
    }
}

async fn count_connected(client: &Client) -> usize {
    client
        .relays()
        .await
        .values()
        .filter(|relay| relay.status() == RelayStatus::Connected)
        .count()
}

/// Normalize a relay endpoint URL: websocket scheme required, trailing
/// slashes stripped. Returns `None` for unusable URLs.
fn normalize_relay_endpoint(url: &str) -> Option<String> {
    let url = url.trim();
    if !url.starts_with("wss://") && !url.starts_with("ws://") {
        return None;
    }
    let parsed = RelayUrl::parse(url).ok()?;
    let mut normalized = parsed.to_string();
    while normalized.ends_with('/') {
        normalized.pop();
    }
    Some(normalized)
}
