use crate::config;
use crate::models::{AllIndicesResponse, IndexChartResponse, OptionChainResponse};
use anyhow::{Context, Result, anyhow};
use rand::{seq::SliceRandom, thread_rng};
use reqwest::{Client, StatusCode, header};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tokio_retry::Retry;
use tokio_retry::strategy::ExponentialBackoff;
use tracing::{debug, warn};

// -----------------------------------------------
// CLIENT WRAPPER WITH SESSION STATE
// -----------------------------------------------
// NSE requires a browser-like session: cookies are handed out on the
// landing page and checked on the API routes, so the first API call is
// preceded by a one-time warmup GET.
pub struct NseClient {
    client: Client,
    warmed_up: Arc<RwLock<bool>>,
}

impl NseClient {
    pub fn new() -> Result<Self> {
        Ok(Self {
            client: build_client()?,
            warmed_up: Arc::new(RwLock::new(false)),
        })
    }

    /// Warmup NSE session (only once per client)
    async fn warmup_if_needed(&self) -> Result<()> {
        if *self.warmed_up.read().await {
            return Ok(());
        }

        let mut warmed = self.warmed_up.write().await;
        if !*warmed {
            let _ = self
                .client
                .get(config::NSE_BASE_URL)
                .header("Accept", config::HEADER_ACCEPT_HTML)
                .send()
                .await
                .context("Failed to warm up NSE session")?;

            tokio::time::sleep(Duration::from_millis(config::WARMUP_DELAY_MS)).await;
            *warmed = true;
        }

        Ok(())
    }

    /// Fetch with exponential-backoff retry; rejects non-JSON bodies (NSE
    /// serves an HTML block page when the session is stale).
    async fn fetch_json(&self, url: &str) -> Result<String> {
        self.warmup_if_needed().await?;

        let backoff = ExponentialBackoff::from_millis(config::RETRY_BASE_DELAY_MS)
            .factor(config::RETRY_FACTOR)
            .max_delay(Duration::from_secs(config::RETRY_MAX_DELAY_SECS))
            .take(config::RETRY_MAX_ATTEMPTS);

        Retry::spawn(backoff, || async {
            let res = self
                .client
                .get(url)
                .header("Referer", config::HEADER_REFERER)
                .header("X-Requested-With", config::HEADER_X_REQUESTED_WITH)
                .send()
                .await
                .context("Request send failed")?;

            let status = res.status();
            debug!(url, status = status.as_u16(), "NSE response");

            if status.is_success() {
                let text = res.text().await.context("Failed to read body")?;

                let trimmed = text.trim();
                if !trimmed.starts_with('{') && !trimmed.starts_with('[') {
                    let preview: String = text.chars().take(200).collect();
                    warn!(url, "Non-JSON response from NSE");
                    anyhow::bail!("Non-JSON response: {}", preview);
                }

                Ok(text)
            } else if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
                anyhow::bail!("Retryable error: {}", status)
            } else {
                let body = res.text().await.unwrap_or_default();
                let preview: String = body.chars().take(200).collect();
                anyhow::bail!("Client error {}: {}", status, preview)
            }
        })
        .await
    }

    // -----------------------------------------------
    // PRIMARY: OPTION CHAIN
    // -----------------------------------------------
    pub async fn fetch_option_chain(&self, symbol: &str) -> Result<OptionChainResponse> {
        let url = config::nse_option_chain_url(symbol);
        let text = self.fetch_json(&url).await?;
        let chain: OptionChainResponse =
            serde_json::from_str(&text).context("Failed to parse option chain")?;

        Ok(chain)
    }

    // -----------------------------------------------
    // FALLBACK: LAST-CLOSE SPOT ONLY
    // -----------------------------------------------
    /// Secondary source used when the option chain is unavailable. Returns
    /// only a last price, which the pipeline treats as a degraded input.
    pub async fn fetch_spot_fallback(&self, symbol: &str) -> Result<f64> {
        let url = config::nse_all_indices_url();
        let text = self.fetch_json(&url).await?;
        let indices: AllIndicesResponse =
            serde_json::from_str(&text).context("Failed to parse index list")?;

        let wanted = config::index_display_name(symbol);
        indices
            .data
            .iter()
            .find(|q| q.index.eq_ignore_ascii_case(&wanted))
            .and_then(|q| q.last)
            .ok_or_else(|| anyhow!("No fallback quote for {}", symbol))
    }

    // -----------------------------------------------
    // PRICE HISTORY FOR ZONES
    // -----------------------------------------------
    /// Recent close series for the index, newest last. Zone derivation
    /// only needs the values, not the timestamps.
    pub async fn fetch_price_history(&self, symbol: &str, lookback: usize) -> Result<Vec<f64>> {
        let url = config::nse_index_chart_url(symbol);
        let text = self.fetch_json(&url).await?;
        let chart: IndexChartResponse =
            serde_json::from_str(&text).context("Failed to parse index chart data")?;

        let mut closes: Vec<f64> = chart.graph_data.iter().map(|(_, price)| *price).collect();
        if closes.len() > lookback {
            closes = closes.split_off(closes.len() - lookback);
        }
        Ok(closes)
    }
}

// -----------------------------------------------
// TTL CACHE ENTRY
// -----------------------------------------------
// Expiry-then-refetch: the caller checks `get` and refetches on None.

#[derive(Debug, Clone)]
pub struct CacheEntry<T> {
    value: T,
    fetched_at: Instant,
    ttl: Duration,
}

impl<T> CacheEntry<T> {
    pub fn new(value: T, ttl: Duration) -> Self {
        Self {
            value,
            fetched_at: Instant::now(),
            ttl,
        }
    }

    /// The cached value while still fresh, None once expired.
    pub fn get(&self) -> Option<&T> {
        if self.fetched_at.elapsed() < self.ttl {
            Some(&self.value)
        } else {
            None
        }
    }

    /// The value regardless of freshness, for "show last good" displays.
    pub fn stale(&self) -> &T {
        &self.value
    }

    pub fn age(&self) -> Duration {
        self.fetched_at.elapsed()
    }
}

// -----------------------------------------------
// HTTP CLIENT BUILDER
// -----------------------------------------------
fn build_client() -> Result<Client> {
    let mut headers = header::HeaderMap::new();

    let lang = config::ACCEPT_LANGUAGES.choose(&mut thread_rng()).unwrap();
    headers.insert(header::ACCEPT_LANGUAGE, header::HeaderValue::from_str(lang)?);
    headers.insert(header::ACCEPT, header::HeaderValue::from_static("*/*"));

    Ok(Client::builder()
        .default_headers(headers)
        .cookie_store(true)
        .user_agent(config::USER_AGENT)
        .timeout(config::HTTP_TIMEOUT)
        .build()
        .context("Failed to build HTTP client")?)
}
