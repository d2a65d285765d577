use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// PriceRecord -- One provider's prices for one run
// ---------------------------------------------------------------------------

/// Prices scraped from a single provider during a single run.
///
/// `prices` keeps the provider's tracked items in declaration order. A `None`
/// value means the provider does not track that item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRecord {
    pub provider: String,
    pub date: String,
    pub prices: Vec<(String, Option<f64>)>,
}

impl PriceRecord {
    /// Price for `item`, `None` when missing or not tracked.
    pub fn price(&self, item: &str) -> Option<f64> {
        self.prices
            .iter()
            .find(|(id, _)| id == item)
            .and_then(|(_, price)| *price)
    }

    /// Item identifiers in declaration order.
    pub fn items(&self) -> impl Iterator<Item = &str> {
        self.prices.iter().map(|(id, _)| id.as_str())
    }
}

// ---------------------------------------------------------------------------
// AggregatedRow -- A PriceRecord carrying the run's combined total
// ---------------------------------------------------------------------------

/// A dataset row: one provider's record plus the run-wide cheapest total.
///
/// Every row of a run carries the same `total`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedRow {
    pub record: PriceRecord,
    pub total: f64,
}

impl AggregatedRow {
    pub fn provider(&self) -> &str {
        &self.record.provider
    }

    pub fn date(&self) -> &str {
        &self.record.date
    }

    pub fn price(&self, item: &str) -> Option<f64> {
        self.record.price(item)
    }
}

// ---------------------------------------------------------------------------
// HistoryRow -- An AggregatedRow as persisted in the history dataset
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRow {
    pub row: AggregatedRow,
    pub build: i64,
}

// ---------------------------------------------------------------------------
// DeltaDataset -- All rows of one run
// ---------------------------------------------------------------------------

/// The stacked rows of a single run together with the keys the total was
/// computed over.
///
/// Only [`aggregate`](crate::aggregate::aggregate) builds one, so `total`
/// always matches the rows it was derived from.
#[derive(Debug, Clone, PartialEq)]
pub struct DeltaDataset {
    pub(crate) keys: Vec<String>,
    pub(crate) rows: Vec<AggregatedRow>,
    pub(crate) total: f64,
    pub(crate) unpriced: Vec<String>,
}

impl DeltaDataset {
    /// Item identifiers the total is computed over, in column order.
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    /// One row per input record, in input order.
    pub fn rows(&self) -> &[AggregatedRow] {
        &self.rows
    }

    /// Sum of the per-item minimum prices, rounded to cents.
    pub fn total(&self) -> f64 {
        self.total
    }

    /// Keys no provider had a price for. They are left out of the total.
    pub fn unpriced(&self) -> &[String] {
        &self.unpriced
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
