//! Fare table source with caching and fallback.
//!
//! The current fare table comes from an optional remote JSON snapshot. A
//! fetched table is cached for a fixed TTL; when a fetch fails the last
//! good table is served, and before any successful fetch the snapshot
//! bundled with the binary is served instead.

use std::sync::Arc;
use std::time::{Duration, Instant};

use moka::future::Cache as MokaCache;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::error::FareError;
use super::table::FareTable;

/// Default cache TTL: 30 minutes.
const DEFAULT_TTL: Duration = Duration::from_secs(30 * 60);

/// Default wait after a failed fetch before trying again.
const DEFAULT_RETRY_BACKOFF: Duration = Duration::from_secs(30);

/// Configuration for the fare source.
#[derive(Debug, Clone)]
pub struct FareSourceConfig {
    /// Remote snapshot URL. `None` serves the fallback table only.
    pub url: Option<String>,

    /// How long a fetched table stays fresh.
    pub ttl: Duration,

    /// After a failed fetch, serve the fallback without fetching for this long.
    pub retry_backoff: Duration,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl FareSourceConfig {
    /// Fetch from `url` with the default TTL (30 minutes).
    pub fn remote(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Self::default()
        }
    }

    /// Set a custom TTL.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Set the wait after a failed fetch.
    pub fn with_retry_backoff(mut self, retry_backoff: Duration) -> Self {
        self.retry_backoff = retry_backoff;
        self
    }
}

impl Default for FareSourceConfig {
    fn default() -> Self {
        Self {
            url: None,
            ttl: DEFAULT_TTL,
            retry_backoff: DEFAULT_RETRY_BACKOFF,
            timeout_secs: 10,
        }
    }
}

/// HTTP client for a remote fare snapshot.
#[derive(Debug, Clone)]
struct FareClient {
    http: reqwest::Client,
    url: String,
}

impl FareClient {
    fn new(url: String, timeout_secs: u64) -> Result<Self, FareError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self { http, url })
    }

    async fn fetch(&self) -> Result<FareTable, FareError> {
        let response = self.http.get(&self.url).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FareError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response.text().await?;
        FareTable::from_json(&body)
    }
}

/// Source of the current fare table.
///
/// Cheap to share behind an `Arc`; concurrent callers that miss the cache
/// share a single fetch.
pub struct FareSource {
    client: Option<FareClient>,

    /// Fresh remote table, keyed by unit since there is only one.
    fresh: MokaCache<(), Arc<FareTable>>,

    /// Most recent successfully fetched table, kept past its TTL.
    last_good: RwLock<Option<Arc<FareTable>>>,

    /// Served when nothing has been fetched.
    fallback: Arc<FareTable>,

    /// No fetch is attempted before this instant.
    retry_at: RwLock<Option<Instant>>,

    retry_backoff: Duration,
}

impl FareSource {
    /// Create a source that falls back to `fallback`.
    pub fn new(config: &FareSourceConfig, fallback: FareTable) -> Result<Self, FareError> {
        let client = config
            .url
            .clone()
            .map(|url| FareClient::new(url, config.timeout_secs))
            .transpose()?;

        let fresh = MokaCache::builder()
            .time_to_live(config.ttl)
            .max_capacity(1)
            .build();

        Ok(Self {
            client,
            fresh,
            last_good: RwLock::new(None),
            fallback: Arc::new(fallback),
            retry_at: RwLock::new(None),
            retry_backoff: config.retry_backoff,
        })
    }

    /// A source that only ever serves `table`.
    pub fn fixed(table: FareTable) -> Self {
        Self {
            client: None,
            fresh: MokaCache::builder().max_capacity(1).build(),
            last_good: RwLock::new(None),
            fallback: Arc::new(table),
            retry_at: RwLock::new(None),
            retry_backoff: Duration::ZERO,
        }
    }

    /// The current fare table.
    ///
    /// Never fails: fetch errors are logged and answered from the last good
    /// or fallback table. After a failure no fetch is attempted until the
    /// retry backoff has passed.
    pub async fn current(&self) -> Arc<FareTable> {
        let Some(client) = &self.client else {
            return self.fallback.clone();
        };

        if let Some(table) = self.fresh.get(&()).await {
            return table;
        }

        let backing_off = self
            .retry_at
            .read()
            .await
            .is_some_and(|at| Instant::now() < at);
        if backing_off {
            return self.stale().await;
        }

        let result = self
            .fresh
            .try_get_with((), async {
                debug!(url = %client.url, "fetching fare table");
                let table = Arc::new(client.fetch().await?);
                info!(
                    stages = table.stages().len(),
                    source = table.source(),
                    "fetched fare table"
                );
                *self.last_good.write().await = Some(table.clone());
                Ok::<_, FareError>(table)
            })
            .await;

        match result {
            Ok(table) => {
                *self.retry_at.write().await = None;
                table
            }
            Err(e) => {
                *self.retry_at.write().await = Some(Instant::now() + self.retry_backoff);
                let table = self.stale().await;
                warn!(
                    error = %e,
                    serving = table.source(),
                    retry_in_secs = self.retry_backoff.as_secs(),
                    "failed to fetch fare table"
                );
                table
            }
        }
    }

    /// Last fetched table, or the fallback when nothing was fetched.
    async fn stale(&self) -> Arc<FareTable> {
        self.last_good
            .read()
            .await
            .clone()
            .unwrap_or_else(|| self.fallback.clone())
    }

    /// The table served when nothing has been fetched.
    pub fn fallback(&self) -> &FareTable {
        &self.fallback
    }

    /// Drop the cached table and any retry backoff so the next call
    /// fetches again.
    pub async fn invalidate(&self) {
        self.fresh.invalidate_all();
        *self.retry_at.write().await = None;
    }
}
