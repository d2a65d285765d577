//! Async wrapper around [`PriceTracker`] for use in async runtimes (Tokio, etc.).
//!
//! Page downloads use the blocking HTTP client, so every operation runs on
//! the blocking thread pool via [`tokio::task::spawn_blocking`], keeping the
//! async event loop free.
//!
//! # Example
//!
//! ```no_run
//! use pc_price_tracker::{config, AsyncPriceTracker};
//!
//! #[tokio::main]
//! async fn main() {
//!     let tracker = AsyncPriceTracker::builder().build().await.unwrap();
//!     let run_at = chrono::Local::now().naive_local();
//!     let message = tracker
//!         .report(config::default_providers(), run_at, None)
//!         .await
//!         .unwrap();
//!     println!("{message}");
//!     tracker.close().await.unwrap();
//! }
//! ```

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDateTime;

use crate::error::{Result, TrackerError};
use crate::fetcher::PageSource;
use crate::history::HistoryStore;
use crate::models::{DeltaDataset, ProviderConfig};
use crate::resolver::Provider;
use crate::retry::RetryPolicy;
use crate::{config, pipeline, PriceTracker};

// ---------------------------------------------------------------------------
// AsyncPriceTrackerBuilder
// ---------------------------------------------------------------------------

/// Builder for configuring and constructing an [`AsyncPriceTracker`].
pub struct AsyncPriceTrackerBuilder {
    timeout: Duration,
    user_agent: String,
    retry: RetryPolicy,
    source: Option<Box<dyn PageSource>>,
}

impl Default for AsyncPriceTrackerBuilder {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(config::DEFAULT_TIMEOUT_SECS),
            user_agent: config::USER_AGENT.to_string(),
            retry: RetryPolicy::default(),
            source: None,
        }
    }
}

impl AsyncPriceTrackerBuilder {
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn user_agent(mut self, user_agent: &str) -> Self {
        self.user_agent = user_agent.to_string();
        self
    }

    pub fn retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry = policy;
        self
    }

    pub fn page_source<S: PageSource + 'static>(mut self, source: S) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Build the tracker on the blocking thread pool, where the blocking
    /// HTTP client may be created.
    pub async fn build(self) -> Result<AsyncPriceTracker> {
        tokio::task::spawn_blocking(move || {
            let mut builder = PriceTracker::builder()
                .timeout(self.timeout)
                .user_agent(&self.user_agent)
                .retry_policy(self.retry);
            if let Some(source) = self.source {
                builder = builder.boxed_source(source);
            }
            let tracker = builder.build()?;
            Ok(AsyncPriceTracker {
                inner: Arc::new(tracker),
            })
        })
        .await
        .map_err(join_error)?
    }
}

// ---------------------------------------------------------------------------
// AsyncPriceTracker
// ---------------------------------------------------------------------------

/// Async wrapper around [`PriceTracker`].
///
/// Call [`close()`](Self::close) when done: the wrapped blocking HTTP client
/// must not be dropped on an async worker thread.
pub struct AsyncPriceTracker {
    inner: Arc<PriceTracker>,
}

impl AsyncPriceTracker {
    pub fn builder() -> AsyncPriceTrackerBuilder {
        AsyncPriceTrackerBuilder::default()
    }

    /// Run a sync tracker operation on the blocking thread pool.
    pub async fn run<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&PriceTracker) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let tracker = self.inner.clone();
        tokio::task::spawn_blocking(move || f(&tracker))
            .await
            .map_err(join_error)?
    }

    /// Resolve and aggregate `providers`.
    pub async fn collect(
        &self,
        providers: Vec<Provider>,
        run_at: NaiveDateTime,
    ) -> Result<DeltaDataset> {
        self.run(move |t| t.collect(&providers, run_at)).await
    }

    /// Build the success message for one run; see [`pipeline::build_report`].
    pub async fn report(
        &self,
        providers: Vec<ProviderConfig>,
        run_at: NaiveDateTime,
        history: Option<HistoryStore>,
    ) -> Result<String> {
        self.run(move |t| pipeline::build_report(t, &providers, run_at, history.as_ref()))
            .await
    }

    /// Release the tracker on the blocking thread pool.
    pub async fn close(self) -> Result<()> {
        tokio::task::spawn_blocking(move || drop(self.inner))
            .await
            .map_err(join_error)
    }
}

fn join_error(e: tokio::task::JoinError) -> TrackerError {
    TrackerError::InvalidArgument(format!("Task join error: {e}"))
}
