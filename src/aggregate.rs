//! Merge per-provider records into a run's dataset.

use crate::models::{AggregatedRow, DeltaDataset, PriceRecord};

/// Stack `records` into one dataset and derive the cheapest total.
///
/// For every key the lowest price offered by any provider is taken, missing
/// values ignored; the minimums are summed and rounded to cents. A key no
/// provider prices is left out of the sum and listed in
/// [`DeltaDataset::unpriced`]. Duplicate keys count once.
///
/// The result does not depend on the order of `records` beyond the order of
/// the rows themselves.
pub fn aggregate(records: &[PriceRecord], keys: &[String]) -> DeltaDataset {
    let mut unique_keys: Vec<String> = Vec::with_capacity(keys.len());
    for key in keys {
        if !unique_keys.contains(key) {
            unique_keys.push(key.clone());
        }
    }

    let mut sum = 0.0;
    let mut unpriced = Vec::new();
    for key in &unique_keys {
        match cheapest(records, key) {
            Some(price) => sum += price,
            None => unpriced.push(key.clone()),
        }
    }
    let total = round_cents(sum);

    let rows = records
        .iter()
        .map(|record| AggregatedRow {
            record: record.clone(),
            total,
        })
        .collect();

    DeltaDataset {
        keys: unique_keys,
        rows,
        total,
        unpriced,
    }
}

/// Union of the item identifiers of `records`, in first-seen order.
pub fn item_keys(records: &[PriceRecord]) -> Vec<String> {
    let mut keys: Vec<String> = Vec::new();
    for record in records {
        for item in record.items() {
            if !keys.iter().any(|k| k == item) {
                keys.push(item.to_string());
            }
        }
    }
    keys
}

fn cheapest(records: &[PriceRecord], key: &str) -> Option<f64> {
    records
        .iter()
        .filter_map(|record| record.price(key))
        .fold(None, |best: Option<f64>, price| match best {
            Some(b) if b <= price => Some(b),
            _ => Some(price),
        })
}

pub(crate) fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
