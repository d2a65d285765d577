use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// TrackedItem -- One entry of a provider's price query
// ---------------------------------------------------------------------------

/// An item identifier and the product page it is scraped from.
///
/// A missing `url` marks an item the provider does not sell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedItem {
    pub id: String,
    #[serde(default)]
    pub url: Option<String>,
}

impl TrackedItem {
    pub fn new(id: &str, url: &str) -> Self {
        Self {
            id: id.to_string(),
            url: Some(url.to_string()),
        }
    }

    pub fn untracked(id: &str) -> Self {
        Self {
            id: id.to_string(),
            url: None,
        }
    }
}

// ---------------------------------------------------------------------------
// ProviderConfig -- Static description of a price source
// ---------------------------------------------------------------------------

/// Static configuration for one shop, as loaded from a provider file or the
/// built-in catalogue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub name: String,
    pub items: Vec<TrackedItem>,
    /// Locators tried in order against every product page of this shop.
    pub locators: Vec<String>,
    /// Constant added to every scraped price of this shop.
    #[serde(default)]
    pub adjustment: f64,
}
