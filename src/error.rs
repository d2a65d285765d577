#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    #[error("Fetch error on {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Fetch error on {url}: HTTP {status}")]
    HttpStatus { url: String, status: u16 },

    #[error("Price not found for {url}")]
    PriceNotFound { url: String },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid locator '{locator}': {reason}")]
    InvalidLocator { locator: String, reason: String },

    #[error("DuckDB error: {0}")]
    DuckDb(#[from] duckdb::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl TrackerError {
    /// True for the "no locator produced a usable price" condition, the only
    /// kind the resolver retries.
    pub fn is_price_not_found(&self) -> bool {
        matches!(self, TrackerError::PriceNotFound { .. })
    }

    /// True for network and HTTP status failures.
    pub fn is_fetch(&self) -> bool {
        matches!(
            self,
            TrackerError::Fetch { .. } | TrackerError::HttpStatus { .. } | TrackerError::Http(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, TrackerError>;
