//! Delivery of the end-of-run message.

use std::time::Duration;

use reqwest::blocking::Client;
use tracing::{info, warn};

use crate::config::{TelegramConfig, TELEGRAM_API_BASE};
use crate::error::{Result, TrackerError};

/// Sink for the single message a run produces.
pub trait Notify {
    /// Deliver an HTML-flavoured message.
    fn send(&self, html_message: &str) -> Result<()>;
}

// ---------------------------------------------------------------------------
// TelegramNotifier
// ---------------------------------------------------------------------------

/// Sends messages through the Telegram Bot API `sendMessage` method, with
/// HTML parse mode and the notification sound turned off.
pub struct TelegramNotifier {
    config: TelegramConfig,
    api_base: String,
    client: Client,
}

impl TelegramNotifier {
    pub fn new(config: TelegramConfig, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            config,
            api_base: TELEGRAM_API_BASE.to_string(),
            client,
        })
    }

    /// Point the notifier at a different API host.
    pub fn with_api_base(mut self, api_base: &str) -> Self {
        self.api_base = api_base.trim_end_matches('/').to_string();
        self
    }
}

impl Notify for TelegramNotifier {
    fn send(&self, html_message: &str) -> Result<()> {
        let url = format!("{}/bot{}/sendMessage", self.api_base, self.config.token);
        let params = [
            ("chat_id", self.config.chat_id.as_str()),
            ("text", html_message),
            ("parse_mode", "HTML"),
            ("disable_notification", "true"),
        ];

        let resp = self
            .client
            .post(&url)
            .form(&params)
            .send()
            .map_err(|e| TrackerError::Http(e.without_url()))?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().unwrap_or_default();
            warn!(status = status.as_u16(), body = %body, "Telegram API returned non-success status");
            // The bot token is part of the URL.
            return Err(TrackerError::HttpStatus {
                url: format!("{}/bot***/sendMessage", self.api_base),
                status: status.as_u16(),
            });
        }

        info!(chat_id = %self.config.chat_id, "message sent");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// StdoutNotifier
// ---------------------------------------------------------------------------

/// Prints the message instead of sending it.
pub struct StdoutNotifier;

impl Notify for StdoutNotifier {
    fn send(&self, html_message: &str) -> Result<()> {
        println!("{}", html_message);
        Ok(())
    }
}
