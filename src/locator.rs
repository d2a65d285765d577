//! Structural locators for price nodes.
//!
//! Shops publish prices in a handful of page templates, so each provider is
//! configured with an ordered chain of XPath-style locators. Only the subset
//! of XPath needed to address a node by path is accepted:
//!
//! - absolute (`/html/body/div[2]`) and descendant (`//*[@id="price"]`) paths
//! - name tests (`span`) and the wildcard `*`
//! - positional predicates (`div[3]`)
//! - attribute predicates (`[@id="x"]`, `[@id='x']`, `[@data-price]`)
//! - an optional trailing `/text()`
//!
//! Each locator is compiled once into a CSS selector and evaluated with
//! [`scraper`].
//!
//! # Example
//!
//! ```rust
//! use pc_price_tracker::Locator;
//!
//! let loc = Locator::parse(r#"//*[@id="box"]/span[2]"#).unwrap();
//! assert_eq!(loc.css(), r#"*[id="box"] > span:nth-of-type(2)"#);
//! ```

use std::fmt;

use scraper::{ElementRef, Html, Selector};

use crate::error::{Result, TrackerError};

/// A compiled structural path into an HTML document.
#[derive(Debug, Clone)]
pub struct Locator {
    source: String,
    css: String,
    selector: Selector,
}

impl Locator {
    /// Compile an XPath-style expression.
    ///
    /// Fails with [`TrackerError::InvalidLocator`] for syntax outside the
    /// supported subset.
    pub fn parse(expr: &str) -> Result<Self> {
        let invalid = |reason: String| TrackerError::InvalidLocator {
            locator: expr.to_string(),
            reason,
        };

        let css = xpath_to_css(expr).map_err(invalid)?;
        let selector = Selector::parse(&css).map_err(|e| invalid(e.to_string()))?;

        Ok(Self {
            source: expr.to_string(),
            css,
            selector,
        })
    }

    /// Compile a list of expressions, preserving order.
    pub fn parse_all<S: AsRef<str>>(exprs: &[S]) -> Result<Vec<Self>> {
        exprs.iter().map(|e| Self::parse(e.as_ref())).collect()
    }

    /// The expression this locator was compiled from.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// The equivalent CSS selector.
    pub fn css(&self) -> &str {
        &self.css
    }

    /// Text of the first node this locator resolves to.
    ///
    /// Returns the trimmed concatenation of the node's direct text children,
    /// or `None` when nothing matches or the text is empty.
    pub fn first_text(&self, doc: &Html) -> Option<String> {
        let element = doc.select(&self.selector).next()?;
        let text = own_text(element);
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

fn own_text(element: ElementRef<'_>) -> String {
    let mut out = String::new();
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            out.push_str(text);
        }
    }
    out.trim().to_string()
}

// ---------------------------------------------------------------------------
// XPath subset -> CSS
// ---------------------------------------------------------------------------

fn xpath_to_css(expr: &str) -> std::result::Result<String, String> {
    let mut rest = expr.trim();
    if let Some(stripped) = rest.strip_suffix("/text()") {
        rest = stripped;
    }
    if rest.is_empty() {
        return Err("empty path".into());
    }

    let mut css = String::new();
    let mut first = true;

    while !rest.is_empty() {
        let (descendant, after) = if let Some(r) = rest.strip_prefix("//") {
            (true, r)
        } else if let Some(r) = rest.strip_prefix('/') {
            (false, r)
        } else if first {
            return Err("path must start with '/' or '//'".into());
        } else {
            return Err(format!("unexpected input at '{}'", rest));
        };

        let end = step_end(after)?;
        let (step, tail) = after.split_at(end);
        if step.is_empty() {
            return Err("empty step".into());
        }

        let compound = step_to_css(step)?;
        if first {
            css.push_str(&compound);
            if !descendant {
                css.push_str(":root");
            }
        } else {
            css.push_str(if descendant { " " } else { " > " });
            css.push_str(&compound);
        }

        first = false;
        rest = tail;
    }

    Ok(css)
}

/// Byte offset of the `/` ending the step at the start of `input`, ignoring
/// slashes inside predicates and quoted strings.
fn step_end(input: &str) -> std::result::Result<usize, String> {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;

    for (i, c) in input.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"') | (None, '\'') => quote = Some(c),
            (None, '[') => depth += 1,
            (None, ']') => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| "unbalanced ']'".to_string())?;
            }
            (None, '/') if depth == 0 => return Ok(i),
            _ => {}
        }
    }

    if quote.is_some() {
        return Err("unterminated string literal".into());
    }
    if depth != 0 {
        return Err("unbalanced '['".into());
    }
    Ok(input.len())
}

fn step_to_css(step: &str) -> std::result::Result<String, String> {
    let name_end = step.find('[').unwrap_or(step.len());
    let (name, mut predicates) = step.split_at(name_end);

    let wildcard = name == "*";
    if !wildcard && !is_name(name) {
        return Err(format!("unsupported step '{}'", step));
    }

    let mut out = if wildcard {
        "*".to_string()
    } else {
        name.to_ascii_lowercase()
    };
    let mut seen_attribute = false;

    while !predicates.is_empty() {
        let close = predicate_end(predicates)?;
        let inner = predicates[1..close].trim();
        predicates = &predicates[close + 1..];

        if let Ok(position) = inner.parse::<usize>() {
            if position == 0 {
                return Err("positions start at 1".into());
            }
            if seen_attribute {
                return Err("positional predicate after attribute predicate".into());
            }
            let pseudo = if wildcard { "nth-child" } else { "nth-of-type" };
            out.push_str(&format!(":{}({})", pseudo, position));
        } else if let Some(attr) = inner.strip_prefix('@') {
            out.push_str(&attribute_to_css(attr)?);
            seen_attribute = true;
        } else {
            return Err(format!("unsupported predicate '[{}]'", inner));
        }
    }

    Ok(out)
}

/// Index of the `]` closing the predicate that opens at `input[0]`.
fn predicate_end(input: &str) -> std::result::Result<usize, String> {
    if !input.starts_with('[') {
        return Err(format!("unexpected input at '{}'", input));
    }
    let mut quote: Option<char> = None;
    for (i, c) in input.char_indices().skip(1) {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"') | (None, '\'') => quote = Some(c),
            (None, ']') => return Ok(i),
            _ => {}
        }
    }
    Err("unbalanced '['".into())
}

fn attribute_to_css(attr: &str) -> std::result::Result<String, String> {
    let (name, value) = match attr.split_once('=') {
        Some((name, value)) => (name.trim(), Some(value.trim())),
        None => (attr.trim(), None),
    };
    if !is_name(name) {
        return Err(format!("invalid attribute name '{}'", name));
    }

    match value {
        None => Ok(format!("[{}]", name)),
        Some(literal) => {
            let unquoted = literal
                .strip_prefix('"')
                .and_then(|v| v.strip_suffix('"'))
                .or_else(|| literal.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))
                .ok_or_else(|| format!("attribute value must be quoted: {}", literal))?;
            let escaped = unquoted.replace('\\', "\\\\").replace('"', "\\\"");
            Ok(format!("[{}=\"{}\"]", name, escaped))
        }
    }
}

fn is_name(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}
