//! Page download over HTTP.
//!
//! Shops tend to reject anonymous clients, so every request carries the
//! fixed browser [`USER_AGENT`](crate::config::USER_AGENT). Failures are
//! reported as-is; retrying is left to the resolver.

use std::time::Duration;

use reqwest::blocking::Client;
use tracing::{debug, error};

use crate::error::{Result, TrackerError};

/// Anything that can turn a URL into page content.
///
/// [`PageFetcher`] is the HTTP implementation; tests and offline runs can
/// plug in their own.
pub trait PageSource: Send + Sync {
    fn fetch(&self, url: &str) -> Result<String>;
}

/// Blocking HTTP page fetcher.
pub struct PageFetcher {
    client: Client,
}

impl PageFetcher {
    /// Build a fetcher sending `user_agent` with every request.
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()?;
        Ok(Self { client })
    }
}

impl PageSource for PageFetcher {
    /// GET `url` and return the body as text.
    ///
    /// Connection problems become [`TrackerError::Fetch`], non-2xx answers
    /// [`TrackerError::HttpStatus`].
    fn fetch(&self, url: &str) -> Result<String> {
        debug!(url, "start downloading");

        let fail = |source: reqwest::Error| {
            error!(url, error = %source, "error on downloading");
            TrackerError::Fetch {
                url: url.to_string(),
                source,
            }
        };

        let resp = self.client.get(url).send().map_err(fail)?;
        let status = resp.status();
        if !status.is_success() {
            error!(url, status = status.as_u16(), "error on downloading");
            return Err(TrackerError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        resp.text().map_err(fail)
    }
}
