//! Price extraction from raw page markup.

use scraper::Html;
use tracing::{debug, warn};

use crate::error::{Result, TrackerError};
use crate::locator::Locator;

/// Extract a price from `content` using the first locator that yields text.
///
/// The document is parsed once and the locators are tried in the given order.
/// `source` identifies the page (usually its URL) in errors and logs; the
/// content itself is never included.
///
/// Fails with [`TrackerError::PriceNotFound`] when no locator matches or the
/// matched text is not a number.
pub fn extract_price(content: &str, locators: &[Locator], source: &str) -> Result<f64> {
    debug!(source, "extracting price");
    let doc = Html::parse_document(content);

    let found = locators
        .iter()
        .find_map(|loc| loc.first_text(&doc).map(|text| (loc, text)));

    let Some((locator, text)) = found else {
        warn!(source, tried = locators.len(), "no locator matched");
        return Err(TrackerError::PriceNotFound {
            url: source.to_string(),
        });
    };

    match parse_price(&text) {
        Some(price) => {
            debug!(source, locator = %locator, price, "price extracted");
            Ok(price)
        }
        None => {
            warn!(source, locator = %locator, text = %text, "matched text is not a price");
            Err(TrackerError::PriceNotFound {
                url: source.to_string(),
            })
        }
    }
}

/// Interpret shop price text as a number, reading `,` as the decimal point.
///
/// Currency symbols and whitespace around the number are ignored, so
/// `"199,99 €"` and `"199,99"` both give `199.99`. Thousands separators are
/// not supported.
pub fn parse_price(text: &str) -> Option<f64> {
    let trimmed = text.trim_matches(|c: char| !(c.is_ascii_digit() || c == ',' || c == '.' || c == '-'));
    if trimmed.is_empty() {
        return None;
    }
    trimmed
        .replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}
