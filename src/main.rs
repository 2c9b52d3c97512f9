//! Command-line entry point.
//!
//! Loads a JSON config (path as first argument, `pinscrape.json` by
//! default), runs a harvest, and prints the run summary. Ctrl-C requests
//! graceful cancellation; the run finishes its current step, keeps
//! everything already recorded, and exits cleanly.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use pinscrape::{HarvestConfig, harvest};

const DEFAULT_CONFIG_PATH: &str = "pinscrape.json";

#[tokio::main]
async fn main() -> Result<()> {
    // The log-compat layer picks up `log` macros from this crate and its
    // dependencies, so one subscriber covers both facades.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let config = HarvestConfig::from_json_file(&config_path)
        .await
        .with_context(|| format!("failed to load config from {config_path}"))?;

    let cancel = Arc::new(AtomicBool::new(false));
    let cancel_flag = Arc::clone(&cancel);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\ninterrupt received, finishing current step...");
            cancel_flag.store(true, Ordering::Relaxed);
        }
    });

    let summary = harvest(config, cancel).await?;

    println!();
    println!("run {}", if summary.cancelled { "cancelled" } else { "complete" });
    println!("  recorded:  {}", summary.recorded);
    println!("  visited:   {}", summary.visited);
    println!("  restarts:  {}", summary.session_restarts);
    println!("  reseeds:   {}", summary.reseeds);
    println!("  elapsed:   {:.1}s", summary.elapsed_secs);
    Ok(())
}
