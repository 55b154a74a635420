use std::time::Duration;

use anyhow::{bail, Context, Result};
use reqwest::Client;
use tracing::{info, warn};

const FETCH_TIMEOUT_SECS: u64 = 30;
const MAX_RETRIES: u32 = 3;
const BASE_BACKOFF_MS: u64 = 2000;
const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Fetch one page with fixed-count retries and linear backoff
/// (wait = base × attempt). Failures surface as errors for the caller to
/// log and handle; nothing is swallowed here.
pub async fn fetch_page(url: &str) -> Result<String> {
    let client = Client::builder()
        .timeout(Duration::from_secs(FETCH_TIMEOUT_SECS))
        .user_agent(USER_AGENT)
        .build()
        .context("Failed to create HTTP client")?;

    let mut last_err = None;
    for attempt in 1..=MAX_RETRIES {
        match try_fetch(&client, url).await {
            Ok(body) => {
                info!("Fetched {} ({} bytes)", url, body.len());
                return Ok(body);
            }
            Err(e) => {
                warn!(
                    "Fetch attempt {}/{} for {} failed: {}",
                    attempt, MAX_RETRIES, url, e
                );
                last_err = Some(e);
                if attempt < MAX_RETRIES {
                    tokio::time::sleep(Duration::from_millis(
                        BASE_BACKOFF_MS * u64::from(attempt),
                    ))
                    .await;
                }
            }
        }
    }
    Err(last_err.unwrap_or_else(|| anyhow::anyhow!("Fetch failed: {}", url)))
}

async fn try_fetch(client: &Client, url: &str) -> Result<String> {
    let response = client.get(url).send().await?;
    if !response.status().is_success() {
        bail!("HTTP {}", response.status());
    }
    Ok(response.text().await?)
}
