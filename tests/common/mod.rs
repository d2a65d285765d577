//! Shared fixtures for the price tracker integration tests.
//!
//! Provides `FakePages`, an in-memory page source that counts fetches, plus
//! small HTML pages and records used across test files.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use pc_price_tracker::{PageSource, PriceRecord, Result, TrackerError};

/// Canned page content keyed by URL.
///
/// Unknown URLs fail with an HTTP 404. `fetches()` counts every call,
/// including failing ones.
#[derive(Clone, Default)]
pub struct FakePages {
    pages: HashMap<String, String>,
    fetches: Arc<AtomicUsize>,
}

impl FakePages {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, url: &str, content: &str) -> Self {
        self.pages.insert(url.to_string(), content.to_string());
        self
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    /// A handle sharing the fetch counter.
    pub fn counter(&self) -> Arc<AtomicUsize> {
        self.fetches.clone()
    }
}

impl PageSource for FakePages {
    fn fetch(&self, url: &str) -> Result<String> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| TrackerError::HttpStatus {
                url: url.to_string(),
                status: 404,
            })
    }
}

/// `<html><body>` wrapper around `body`.
pub fn page(body: &str) -> String {
    format!("<html><head><title>shop</title></head><body>{}</body></html>", body)
}

/// A product page in the style of Coolmod's template.
pub fn coolmod_page(price: &str) -> String {
    page(&format!(
        r#"<div class="product"><span id="actualprice">{}</span><span>€</span></div>"#,
        price
    ))
}

/// A product page in Amazon's second template (price in the second span).
pub fn amazon_page(price: &str) -> String {
    page(&format!(
        r#"<div id="corePriceDisplay_desktop_feature_div">
             <div>
               <span class="a-badge">Oferta</span>
               <span class="a-price">
                 <span class="a-offscreen">ignored</span>
                 <span aria-hidden="true"><span class="a-price-whole">{}</span></span>
               </span>
             </div>
           </div>"#,
        price
    ))
}

pub fn run_at() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, 1)
        .and_then(|d| d.and_hms_opt(9, 30, 0))
        .unwrap()
}

pub fn later_run_at() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, 2)
        .and_then(|d| d.and_hms_opt(9, 30, 0))
        .unwrap()
}

pub fn record(provider: &str, date: &str, prices: &[(&str, Option<f64>)]) -> PriceRecord {
    PriceRecord {
        provider: provider.to_string(),
        date: date.to_string(),
        prices: prices
            .iter()
            .map(|(id, price)| (id.to_string(), *price))
            .collect(),
    }
}

pub fn keys(ids: &[&str]) -> Vec<String> {
    ids.iter().map(|s| s.to_string()).collect()
}

pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}
