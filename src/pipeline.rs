//! One complete run: scrape, aggregate, optionally persist, report.
//!
//! Whatever happens upstream, [`run_once`] hands exactly one message to the
//! notifier: the price report on success, the error otherwise.

use chrono::NaiveDateTime;
use tracing::{error, info};

use crate::error::Result;
use crate::history::HistoryStore;
use crate::models::{DeltaDataset, ProviderConfig};
use crate::notifier::Notify;
use crate::report::format_table;
use crate::resolver::Provider;
use crate::{PriceTracker, TrackerError};

/// Scrape all providers and build the success message.
///
/// When `history` is given the run's rows are appended to it before the
/// message is built.
pub fn build_report(
    tracker: &PriceTracker,
    providers: &[ProviderConfig],
    run_at: NaiveDateTime,
    history: Option<&HistoryStore>,
) -> Result<String> {
    let providers = providers
        .iter()
        .map(Provider::from_config)
        .collect::<Result<Vec<_>>>()?;

    let dataset = tracker.collect(&providers, run_at)?;

    if let Some(store) = history {
        let rows = store.append(&dataset)?;
        info!(path = %store.path().display(), rows = rows.len(), "history persisted");
    }

    Ok(success_message(run_at, &dataset))
}

/// `[YYYY-MM-DD] latest total is: <total>` followed by the report table in a
/// `<pre>` block.
pub fn success_message(run_at: NaiveDateTime, dataset: &DeltaDataset) -> String {
    let table = format_table(dataset.rows(), dataset.keys());
    format!(
        "[{}] latest total is: {:.2}\n\n<pre>{}</pre>",
        run_at.format("%Y-%m-%d"),
        dataset.total(),
        html_escape::encode_text(&table)
    )
}

/// The message sent in place of the report when a run fails.
pub fn failure_message(err: &TrackerError) -> String {
    format!(
        "Something went wrong!!\n{}",
        html_escape::encode_text(&err.to_string())
    )
}

/// Run the whole pipeline and notify exactly once.
///
/// Returns the pipeline error if the run failed, otherwise the delivery
/// error if the message could not be sent.
pub fn run_once(
    tracker: &PriceTracker,
    providers: &[ProviderConfig],
    run_at: NaiveDateTime,
    history: Option<&HistoryStore>,
    notifier: &dyn Notify,
) -> Result<()> {
    let outcome = build_report(tracker, providers, run_at, history);

    let message = match &outcome {
        Ok(report) => report.clone(),
        Err(e) => {
            error!(error = %e, "run failed");
            failure_message(e)
        }
    };

    let sent = notifier.send(&message);
    if let Err(e) = &sent {
        error!(error = %e, "could not deliver message");
    }

    outcome.and(sent)
}
