use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Result, TrackerError};
use crate::models::{ProviderConfig, TrackedItem};

pub const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:89.0) Gecko/20100101 Firefox/89.0";
pub const HISTORY_FILE_NAME: &str = "pc_prices.parquet";
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
pub const TELEGRAM_API_BASE: &str = "https://api.telegram.org";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub const ENV_LOCATION: &str = "LOCATION";
pub const ENV_TELEGRAM_TOKEN: &str = "TELEGRAM_TOKEN";
pub const ENV_TELEGRAM_CHAT_ID: &str = "TELEGRAM_CHAT_ID";

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// Credentials for the Telegram Bot API.
#[derive(Debug, Clone, PartialEq)]
pub struct TelegramConfig {
    pub token: String,
    pub chat_id: String,
}

/// Process-level settings read from the environment.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub location: Option<PathBuf>,
    pub telegram_token: Option<String>,
    pub telegram_chat_id: Option<String>,
}

impl Settings {
    /// Read `LOCATION`, `TELEGRAM_TOKEN` and `TELEGRAM_CHAT_ID`.
    ///
    /// A `.env` file in the working directory is loaded first if present;
    /// real environment variables take precedence.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        Self {
            location: non_empty_var(ENV_LOCATION).map(PathBuf::from),
            telegram_token: non_empty_var(ENV_TELEGRAM_TOKEN),
            telegram_chat_id: non_empty_var(ENV_TELEGRAM_CHAT_ID),
        }
    }

    /// Directory holding the history dataset.
    pub fn location(&self) -> PathBuf {
        self.location.clone().unwrap_or_else(default_data_dir)
    }

    /// Full path of the history dataset.
    pub fn history_path(&self) -> PathBuf {
        self.location().join(HISTORY_FILE_NAME)
    }

    /// Telegram credentials, or a configuration error naming the missing one.
    pub fn telegram(&self) -> Result<TelegramConfig> {
        let token = non_empty(&self.telegram_token).ok_or_else(|| {
            TrackerError::Configuration(format!("{} not found", ENV_TELEGRAM_TOKEN))
        })?;
        let chat_id = non_empty(&self.telegram_chat_id).ok_or_else(|| {
            TrackerError::Configuration(format!("{} not found", ENV_TELEGRAM_CHAT_ID))
        })?;
        Ok(TelegramConfig { token, chat_id })
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.clone().filter(|v| !v.trim().is_empty())
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

pub fn default_data_dir() -> PathBuf {
    if let Some(data) = dirs::data_dir() {
        data.join("pc-price-tracker")
    } else {
        PathBuf::from(".pc-price-tracker")
    }
}

// ---------------------------------------------------------------------------
// Providers
// ---------------------------------------------------------------------------

/// Load provider definitions from a JSON file holding an array of
/// [`ProviderConfig`].
pub fn load_providers<P: AsRef<Path>>(path: P) -> Result<Vec<ProviderConfig>> {
    let contents = fs::read_to_string(path.as_ref())?;
    let providers: Vec<ProviderConfig> = serde_json::from_str(&contents)?;
    if providers.is_empty() {
        return Err(TrackerError::Configuration(format!(
            "no providers defined in {}",
            path.as_ref().display()
        )));
    }
    Ok(providers)
}

/// The built-in catalogue: Amazon Spain and Coolmod.
///
/// Amazon serves several page templates, hence three locators, and gets a
/// flat `+1` on every price.
pub fn default_providers() -> Vec<ProviderConfig> {
    vec![
        ProviderConfig {
            name: "AMZ".into(),
            items: vec![
                TrackedItem::new("Caja", "https://www.amazon.es/dp/B09VMBJJ7L"),
                TrackedItem::new("CPU", "https://www.amazon.es/dp/B09MDFH5HY"),
                TrackedItem::new("Motherboard", "https://www.amazon.es/dp/B0BNQFXLJR"),
                TrackedItem::new("GPU", "https://www.amazon.es/dp/B08Y91QVG8"),
                TrackedItem::new("HDD", "https://www.amazon.es/dp/B0B25NTRGD"),
                TrackedItem::new("RAM", "https://www.amazon.es/dp/B0143UM4TC"),
            ],
            locators: vec![
                r#"//*[@id="corePriceDisplay_desktop_feature_div"]/div[1]/span[3]/span[2]/span[1]"#.into(),
                r#"//*[@id="corePriceDisplay_desktop_feature_div"]/div[1]/span[2]/span[2]/span[1]"#.into(),
                "/html/body/div[2]/div/div[8]/div[4]/div[4]/div[12]/div/div[1]/div[3]/div[1]/span[3]/span[2]/span[1]".into(),
            ],
            adjustment: 1.0,
        },
        ProviderConfig {
            name: "COM".into(),
            items: vec![
                TrackedItem::untracked("Caja"),
                TrackedItem::new(
                    "CPU",
                    "https://www.coolmod.com/intel-core-i5-12400f-4-4ghz-socket-1700-boxed-procesador/",
                ),
                TrackedItem::new(
                    "Motherboard",
                    "https://www.coolmod.com/asus-rog-strix-b760-i-gaming-wifi-socket-1700/",
                ),
                TrackedItem::new(
                    "GPU",
                    "https://www.coolmod.com/powercolor-fighter-amd-radeon-rx-6700-xt-12gb-gddr6-tarjeta-grafica/",
                ),
                TrackedItem::new(
                    "HDD",
                    "https://www.coolmod.com/crucial-p5-plus-500gb-pcie-nvme-disco-duro-m-2/",
                ),
                TrackedItem::new(
                    "RAM",
                    "https://www.coolmod.com/corsair-vengeance-lpx-negro-16gb-2x8gb-3200-mhz-pc4-25600-cl16-memoria-ddr4/",
                ),
            ],
            locators: vec![r#"//*[@id="actualprice"]"#.into()],
            adjustment: 0.0,
        },
    ]
}
