//! PC component price tracker.
//!
//! Scrapes component prices from several shops, works out the cheapest way
//! to buy the whole build across them, optionally keeps a parquet price
//! history and produces a short report for a chat channel.
//!
//! # Quick start
//!
//! ```no_run
//! use pc_price_tracker::{config, PriceTracker, Provider};
//!
//! let tracker = PriceTracker::builder().build().unwrap();
//! let providers = config::default_providers()
//!     .iter()
//!     .map(Provider::from_config)
//!     .collect::<pc_price_tracker::Result<Vec<_>>>()
//!     .unwrap();
//!
//! let run_at = chrono::Local::now().naive_local();
//! let dataset = tracker.collect(&providers, run_at).unwrap();
//! println!("cheapest build: {:.2}", dataset.total());
//! ```

pub mod aggregate;
#[cfg(feature = "async")]
pub mod async_client;
pub mod config;
pub mod error;
pub mod extractor;
pub mod fetcher;
pub mod history;
pub mod locator;
pub mod models;
pub mod notifier;
pub mod pipeline;
pub mod report;
pub mod resolver;
pub mod retry;

#[cfg(feature = "async")]
pub use async_client::AsyncPriceTracker;
pub use error::{Result, TrackerError};
pub use fetcher::{PageFetcher, PageSource};
pub use history::HistoryStore;
pub use locator::Locator;
pub use models::{AggregatedRow, DeltaDataset, HistoryRow, PriceRecord, ProviderConfig, TrackedItem};
pub use notifier::{Notify, StdoutNotifier, TelegramNotifier};
pub use resolver::Provider;
pub use retry::RetryPolicy;

use std::fmt;
use std::time::Duration;

use chrono::NaiveDateTime;
use tracing::info;

// ---------------------------------------------------------------------------
// PriceTrackerBuilder
// ---------------------------------------------------------------------------

/// Builder for configuring and constructing a [`PriceTracker`].
///
/// Use [`PriceTracker::builder()`] to obtain a builder, chain configuration
/// methods, and call [`build()`](PriceTrackerBuilder::build).
pub struct PriceTrackerBuilder {
    timeout: Duration,
    user_agent: String,
    retry: RetryPolicy,
    source: Option<Box<dyn PageSource>>,
}

impl Default for PriceTrackerBuilder {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(config::DEFAULT_TIMEOUT_SECS),
            user_agent: config::USER_AGENT.to_string(),
            retry: RetryPolicy::default(),
            source: None,
        }
    }
}

impl PriceTrackerBuilder {
    /// Set the HTTP request timeout for page downloads.
    ///
    /// Defaults to 30 seconds. Ignored when a custom page source is set.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Override the `User-Agent` header sent to shops.
    pub fn user_agent(mut self, user_agent: &str) -> Self {
        self.user_agent = user_agent.to_string();
        self
    }

    /// Set the retry policy applied to each provider's resolution.
    ///
    /// Defaults to five attempts with 1s, 2s, 4s, 8s between them.
    pub fn retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry = policy;
        self
    }

    /// Read pages from `source` instead of the network.
    pub fn page_source<S: PageSource + 'static>(self, source: S) -> Self {
        self.boxed_source(Box::new(source))
    }

    /// Like [`page_source`](Self::page_source) for an already boxed source.
    pub fn boxed_source(mut self, source: Box<dyn PageSource>) -> Self {
        self.source = Some(source);
        self
    }

    pub fn build(self) -> Result<PriceTracker> {
        let source = match self.source {
            Some(source) => source,
            None => Box::new(PageFetcher::new(self.timeout, &self.user_agent)?),
        };
        Ok(PriceTracker {
            source,
            retry: self.retry,
        })
    }
}

// ---------------------------------------------------------------------------
// PriceTracker
// ---------------------------------------------------------------------------

/// Resolves providers and merges their prices.
///
/// Created via [`PriceTracker::builder()`].
pub struct PriceTracker {
    source: Box<dyn PageSource>,
    retry: RetryPolicy,
}

impl PriceTracker {
    pub fn builder() -> PriceTrackerBuilder {
        PriceTrackerBuilder::default()
    }

    /// Resolve a single provider, retrying per the configured policy.
    pub fn resolve(&self, provider: &Provider, run_at: NaiveDateTime) -> Result<PriceRecord> {
        resolver::resolve(self.source.as_ref(), provider, run_at, &self.retry)
    }

    /// Resolve every provider in turn and aggregate the records.
    ///
    /// The total is computed over the union of all providers' items. The
    /// first provider that fails aborts the run.
    pub fn collect(&self, providers: &[Provider], run_at: NaiveDateTime) -> Result<DeltaDataset> {
        let records = providers
            .iter()
            .map(|provider| self.resolve(provider, run_at))
            .collect::<Result<Vec<_>>>()?;

        let keys = aggregate::item_keys(&records);
        let dataset = aggregate::aggregate(&records, &keys);
        info!(
            providers = records.len(),
            items = keys.len(),
            total = dataset.total(),
            "dataset aggregated"
        );
        Ok(dataset)
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    pub fn page_source(&self) -> &dyn PageSource {
        self.source.as_ref()
    }
}

// ---------------------------------------------------------------------------
// Display
// ---------------------------------------------------------------------------

impl fmt::Display for PriceTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let delays: Vec<String> = self
            .retry
            .delays()
            .iter()
            .map(|d| format!("{:?}", d))
            .collect();
        write!(
            f,
            "PriceTracker(max_attempts={}, backoff=[{}])",
            self.retry.max_attempts,
            delays.join(", ")
        )
    }
}
