//! Per-provider price resolution.
//!
//! A provider's record is all-or-nothing: the first item that cannot be
//! priced aborts the whole record, and the whole record is what gets retried.

use chrono::NaiveDateTime;
use tracing::{debug, info};

use crate::config::DATE_FORMAT;
use crate::error::{Result, TrackerError};
use crate::extractor::extract_price;
use crate::fetcher::PageSource;
use crate::locator::Locator;
use crate::models::{PriceRecord, ProviderConfig, TrackedItem};
use crate::retry::RetryPolicy;

// ---------------------------------------------------------------------------
// Provider
// ---------------------------------------------------------------------------

/// A price source ready to be resolved: items plus compiled locators.
#[derive(Debug, Clone)]
pub struct Provider {
    pub name: String,
    pub items: Vec<TrackedItem>,
    pub locators: Vec<Locator>,
    pub adjustment: f64,
}

impl Provider {
    /// Compile a [`ProviderConfig`], validating its locators.
    pub fn from_config(config: &ProviderConfig) -> Result<Self> {
        if config.name.trim().is_empty() {
            return Err(TrackerError::Configuration(
                "provider name must not be empty".into(),
            ));
        }
        let tracks_any = config.items.iter().any(|item| item.url.is_some());
        if tracks_any && config.locators.is_empty() {
            return Err(TrackerError::Configuration(format!(
                "provider {} tracks items but has no locators",
                config.name
            )));
        }

        Ok(Self {
            name: config.name.clone(),
            items: config.items.clone(),
            locators: Locator::parse_all(&config.locators)?,
            adjustment: config.adjustment,
        })
    }

    /// Item identifiers in declaration order.
    pub fn item_ids(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(|item| item.id.as_str())
    }
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// Resolve one provider once, without retrying.
///
/// Untracked items get a missing value. Tracked items are fetched, extracted
/// and shifted by the provider's adjustment.
pub fn resolve_once(
    source: &dyn PageSource,
    provider: &Provider,
    run_at: NaiveDateTime,
) -> Result<PriceRecord> {
    let mut prices = Vec::with_capacity(provider.items.len());

    for item in &provider.items {
        let price = match &item.url {
            None => {
                debug!(provider = %provider.name, item = %item.id, "not tracked");
                None
            }
            Some(url) => {
                let content = source.fetch(url)?;
                let price = extract_price(&content, &provider.locators, url)?;
                Some(price + provider.adjustment)
            }
        };
        prices.push((item.id.clone(), price));
    }

    Ok(PriceRecord {
        provider: provider.name.clone(),
        date: run_at.format(DATE_FORMAT).to_string(),
        prices,
    })
}

/// Resolve one provider under `policy`.
///
/// The whole record is retried while it fails with `PriceNotFound`; network
/// and HTTP errors are returned immediately.
pub fn resolve(
    source: &dyn PageSource,
    provider: &Provider,
    run_at: NaiveDateTime,
    policy: &RetryPolicy,
) -> Result<PriceRecord> {
    let record = policy.run(|attempt| {
        debug!(provider = %provider.name, attempt, "resolving prices");
        resolve_once(source, provider, run_at)
    })?;

    info!(
        provider = %record.provider,
        priced = record.prices.iter().filter(|(_, p)| p.is_some()).count(),
        "prices resolved"
    );
    Ok(record)
}
