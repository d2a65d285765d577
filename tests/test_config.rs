//! Built-in catalogue, provider files and settings.

use std::fs;
use std::path::PathBuf;

use pc_price_tracker::config::{self, Settings, TelegramConfig};
use pc_price_tracker::{Provider, TrackerError};
use pretty_assertions::assert_eq;

#[test]
fn default_catalogue_compiles() {
    let providers = config::default_providers();
    let names: Vec<&str> = providers.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["AMZ", "COM"]);

    let amz = Provider::from_config(&providers[0]).unwrap();
    assert_eq!(amz.locators.len(), 3);
    assert_eq!(amz.adjustment, 1.0);

    let com = Provider::from_config(&providers[1]).unwrap();
    assert_eq!(com.locators.len(), 1);
    assert_eq!(com.adjustment, 0.0);
    assert_eq!(providers[1].items[0].id, "Caja");
    assert_eq!(providers[1].items[0].url, None);
}

#[test]
fn providers_share_item_ids() {
    let providers = config::default_providers();
    let ids = |i: usize| -> Vec<String> {
        providers[i].items.iter().map(|item| item.id.clone()).collect()
    };
    assert_eq!(ids(0), ids(1));
}

#[test]
fn load_providers_from_json() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("providers.json");
    fs::write(
        &path,
        r#"[
            {
                "name": "PCC",
                "items": [
                    {"id": "CPU", "url": "https://pcc.test/cpu"},
                    {"id": "Caja"}
                ],
                "locators": ["//span[@class=\"price\"]"]
            }
        ]"#,
    )
    .unwrap();

    let providers = config::load_providers(&path).unwrap();
    assert_eq!(providers.len(), 1);
    assert_eq!(providers[0].adjustment, 0.0);
    assert_eq!(providers[0].items[1].url, None);
    assert!(Provider::from_config(&providers[0]).is_ok());
}

#[test]
fn load_providers_rejects_empty_list() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("providers.json");
    fs::write(&path, "[]").unwrap();

    let err = config::load_providers(&path).unwrap_err();
    assert!(matches!(err, TrackerError::Configuration(_)));
}

#[test]
fn load_providers_reports_bad_json() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("providers.json");
    fs::write(&path, "{not json").unwrap();

    let err = config::load_providers(&path).unwrap_err();
    assert!(matches!(err, TrackerError::Json(_)));
}

#[test]
fn telegram_requires_both_credentials() {
    let missing_token = Settings {
        telegram_chat_id: Some("42".into()),
        ..Settings::default()
    };
    let err = missing_token.telegram().unwrap_err();
    assert_eq!(err.to_string(), "Configuration error: TELEGRAM_TOKEN not found");

    let missing_chat = Settings {
        telegram_token: Some("secret".into()),
        ..Settings::default()
    };
    let err = missing_chat.telegram().unwrap_err();
    assert_eq!(err.to_string(), "Configuration error: TELEGRAM_CHAT_ID not found");

    let blank_token = Settings {
        telegram_token: Some("  ".into()),
        telegram_chat_id: Some("42".into()),
        ..Settings::default()
    };
    assert!(matches!(
        blank_token.telegram(),
        Err(TrackerError::Configuration(_))
    ));

    let full = Settings {
        telegram_token: Some("secret".into()),
        telegram_chat_id: Some("42".into()),
        ..Settings::default()
    };
    assert_eq!(
        full.telegram().unwrap(),
        TelegramConfig {
            token: "secret".into(),
            chat_id: "42".into(),
        }
    );
}

#[test]
fn history_path_uses_location() {
    let settings = Settings {
        location: Some(PathBuf::from("/data/prices")),
        ..Settings::default()
    };
    assert_eq!(
        settings.history_path(),
        PathBuf::from("/data/prices").join(config::HISTORY_FILE_NAME)
    );

    let fallback = Settings::default();
    assert_eq!(fallback.location(), config::default_data_dir());
}
