//! mintdex command-line interface.
//!
//! Drives the review engine from the shell: fetch one mint's feed, the
//! popular-mints ranking, recent reviews, or the announced-mints listing.
//!
//! # Usage
//!
//! ```bash
//! # Reviews for one mint, following "load more" twice
//! mintdex reviews https://mint.example.com --pages 3
//!
//! # Top mints by review volume and quality
//! mintdex popular --limit 10
//!
//! # Recent reviews across all mints
//! mintdex recent --limit 20
//!
//! # Announced mints
//! mintdex mints --limit 50
//! ```
//!
//! Output mirrors the engine's best-effort contract: whatever was
//! collected by the deadline is printed; an unreachable relay set yields
//! an empty listing, not an error.

use anyhow::{Context, Result};
use chrono::DateTime;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use mintdex_reviews::profile::short_pubkey;
use mintdex_reviews::{EngineConfig, ReviewEngine};

#[derive(Parser, Debug)]
#[command(name = "mintdex")]
#[command(about = "Cashu mint review directory engine")]
#[command(version)]
struct Args {
    /// Relay URLs (comma-separated, overrides defaults)
    #[arg(long, value_delimiter = ',')]
    relays: Option<Vec<String>>,

    /// Fetch budget in seconds (EOSE-or-timeout)
    #[arg(long, default_value = "15")]
    timeout_secs: u64,

    /// Print JSON instead of human-readable output
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch reviews for one mint
    Reviews {
        /// Mint URL (scheme optional)
        mint_url: String,

        /// Number of fetch pages (1 = initial fetch only)
        #[arg(long, default_value = "1")]
        pages: usize,

        /// Resolve author display names
        #[arg(long)]
        profiles: bool,
    },
    /// Ranked popular mints
    Popular {
        #[arg(long, default_value = "8")]
        limit: usize,
    },
    /// Recent reviews across all mints
    Recent {
        #[arg(long, default_value = "50")]
        limit: usize,
    },
    /// Announced mints (unranked)
    Mints {
        #[arg(long, default_value = "100")]
        limit: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Install rustls crypto provider (required when both ring and aws-lc-rs are present)
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("info".parse().unwrap())
                .add_directive("mintdex_reviews=debug".parse().unwrap()),
        )
        .init();

    let args = Args::parse();

    let mut config = EngineConfig::default();
    if let Some(relays) = args.relays.clone() {
        config.relays = relays;
    }
    config.fetch_timeout = std::time::Duration::from_secs(args.timeout_secs);

    let engine = ReviewEngine::connect(config)
        .await
        .context("Failed to initialize review engine")?;

    match &args.command {
        Command::Reviews {
            mint_url,
            pages,
            profiles,
        } => {
            let mut feed = engine.fetch_reviews(mint_url).await?;
            let mut page = 1usize;
            while page < *pages && feed.has_more {
                tracing::info!("Loading more reviews (page {})", page + 1);
                feed = engine.load_more_reviews(mint_url).await?;
                page += 1;
            }

            if args.json {
                println!("{}", serde_json::to_string_pretty(&feed)?);
            } else {
                println!(
                    "{} reviews for {} (has more: {}, complete: {})",
                    feed.reviews.len(),
                    mint_url,
                    feed.has_more,
                    feed.complete
                );
                for review in &feed.reviews {
                    let author = if *profiles {
                        match engine.profile(&review.author).await {
                            Some(profile) => profile.display(&review.author),
                            None => short_pubkey(&review.author),
                        }
                    } else {
                        short_pubkey(&review.author)
                    };
                    println!(
                        "  [{}/5] {} - {} ({}){}",
                        review.rating,
                        review.title,
                        author,
                        format_date(review.created_at),
                        if review.canonical { "" } else { " [legacy]" },
                    );
                }
            }
        }

        Command::Popular { limit } => {
            let mints = engine.fetch_popular_mints(*limit).await?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&mints)?);
            } else {
                for (i, mint) in mints.iter().enumerate() {
                    println!(
                        "{:2}. {} ({}) - {} reviews, {:.1} avg",
                        i + 1,
                        mint.mint_name,
                        mint.mint_url,
                        mint.review_count,
                        mint.average_rating
                    );
                }
            }
        }

        Command::Recent { limit } => {
            let reviews = engine.fetch_global_reviews(*limit).await?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&reviews)?);
            } else {
                for review in &reviews {
                    println!(
                        "[{}/5] {} - {} ({})",
                        review.rating,
                        review.mint_url.as_deref().unwrap_or("unknown mint"),
                        review.title,
                        format_date(review.created_at)
                    );
                }
            }
        }

        Command::Mints { limit } => {
            let mints = engine.fetch_mint_announcements(*limit).await?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&mints)?);
            } else {
                for mint in &mints {
                    println!("{} (announced {})", mint.mint_url, format_date(mint.created_at));
                }
            }
        }
    }

    engine.shutdown().await;
    Ok(())
}

/// Format a unix timestamp as a calendar date.
fn format_date(timestamp: u64) -> String {
    DateTime::from_timestamp(timestamp as i64, 0)
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "unknown".to_string())
}
