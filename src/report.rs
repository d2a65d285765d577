//! Plain-text price report.
//!
//! Renders the latest run as a box-drawn grid: one line per item with the
//! lowest price and the provider offering it, then the combined total.
//!
//! ```text
//! ╒═══════╤════════════════╤══════════╕
//! │       │ Minimum Values │ Provider │
//! ╞═══════╪════════════════╪══════════╡
//! │ CPU   │         180.50 │ COM      │
//! ├───────┼────────────────┼──────────┤
//! │ total │         180.50 │          │
//! ╘═══════╧════════════════╧══════════╛
//! ```

use chrono::NaiveDateTime;

use crate::config::DATE_FORMAT;
use crate::models::AggregatedRow;

const MISSING: &str = "n/a";

/// Lowest price of one item in a run and who offered it.
#[derive(Debug, Clone, PartialEq)]
pub struct Cheapest {
    pub item: String,
    pub price: Option<f64>,
    pub provider: Option<String>,
}

/// Rows belonging to the most recent run date present in `rows`.
pub fn latest_rows(rows: &[AggregatedRow]) -> Vec<&AggregatedRow> {
    let key = |row: &AggregatedRow| {
        (
            NaiveDateTime::parse_from_str(row.date(), DATE_FORMAT).ok(),
            row.date().to_string(),
        )
    };
    let Some(latest) = rows.iter().map(key).max() else {
        return Vec::new();
    };
    rows.iter().filter(|row| key(*row) == latest).collect()
}

/// Per-item minimums over the latest run, in `columns` order.
///
/// Ties go to the first row holding the minimum.
pub fn cheapest_by_item(rows: &[AggregatedRow], columns: &[String]) -> Vec<Cheapest> {
    let latest = latest_rows(rows);
    columns
        .iter()
        .map(|item| {
            let mut best: Option<(f64, &str)> = None;
            for row in &latest {
                if let Some(price) = row.price(item) {
                    if best.map_or(true, |(b, _)| price < b) {
                        best = Some((price, row.provider()));
                    }
                }
            }
            Cheapest {
                item: item.clone(),
                price: best.map(|(p, _)| p),
                provider: best.map(|(_, name)| name.to_string()),
            }
        })
        .collect()
}

/// Combined total of the latest run, `None` for an empty row set.
pub fn latest_total(rows: &[AggregatedRow]) -> Option<f64> {
    latest_rows(rows)
        .iter()
        .map(|row| row.total)
        .fold(None, |acc: Option<f64>, t| Some(acc.map_or(t, |a| a.min(t))))
}

/// Render the latest run of `rows` as a grid over `columns`.
pub fn format_table(rows: &[AggregatedRow], columns: &[String]) -> String {
    let mut body: Vec<[String; 3]> = cheapest_by_item(rows, columns)
        .into_iter()
        .map(|c| {
            [
                c.item,
                format_price(c.price),
                c.provider.unwrap_or_else(|| "-".to_string()),
            ]
        })
        .collect();
    body.push([
        "total".to_string(),
        format_price(latest_total(rows)),
        String::new(),
    ]);

    let header = [
        String::new(),
        "Minimum Values".to_string(),
        "Provider".to_string(),
    ];
    render_grid(&header, &body)
}

fn format_price(price: Option<f64>) -> String {
    match price {
        Some(p) => format!("{:.2}", p),
        None => MISSING.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Grid rendering
// ---------------------------------------------------------------------------

/// Right-aligned columns; the rest are left-aligned.
const NUMERIC: [bool; 3] = [false, true, false];

fn render_grid(header: &[String; 3], body: &[[String; 3]]) -> String {
    let mut widths = [0usize; 3];
    for row in std::iter::once(header).chain(body.iter()) {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let rule = |left: char, fill: char, mid: char, right: char| {
        let segments: Vec<String> = widths
            .iter()
            .map(|w| fill.to_string().repeat(w + 2))
            .collect();
        format!("{}{}{}", left, segments.join(&mid.to_string()), right)
    };
    let line = |cells: &[String; 3]| {
        let padded: Vec<String> = cells
            .iter()
            .enumerate()
            .map(|(i, cell)| {
                if NUMERIC[i] {
                    format!(" {:>width$} ", cell, width = widths[i])
                } else {
                    format!(" {:<width$} ", cell, width = widths[i])
                }
            })
            .collect();
        format!("│{}│", padded.join("│"))
    };

    let mut out = Vec::with_capacity(body.len() * 2 + 3);
    out.push(rule('╒', '═', '╤', '╕'));
    out.push(line(header));
    out.push(rule('╞', '═', '╪', '╡'));
    for (i, row) in body.iter().enumerate() {
        if i > 0 {
            out.push(rule('├', '─', '┼', '┤'));
        }
        out.push(line(row));
    }
    out.push(rule('╘', '═', '╧', '╛'));
    out.join("\n")
}
