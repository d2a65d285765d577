//! Price extraction and normalisation.

mod common;

use pc_price_tracker::extractor::{extract_price, parse_price};
use pc_price_tracker::{Locator, TrackerError};

fn locators(exprs: &[&str]) -> Vec<Locator> {
    Locator::parse_all(exprs).unwrap()
}

// ---------------------------------------------------------------------------
// parse_price
// ---------------------------------------------------------------------------

#[test]
fn comma_is_the_decimal_point() {
    assert_eq!(parse_price("1234,56"), Some(1234.56));
    assert_eq!(parse_price("199,99"), Some(199.99));
}

#[test]
fn matches_replace_then_parse() {
    for text in ["0,5", "12", "12,0", "999,99", "3.25"] {
        let expected: f64 = text.replace(',', ".").parse().unwrap();
        assert_eq!(parse_price(text), Some(expected), "{text}");
    }
}

#[test]
fn currency_and_whitespace_are_trimmed() {
    assert_eq!(parse_price(" 199,99 €"), Some(199.99));
    assert_eq!(parse_price("€\u{a0}42,10"), Some(42.10));
}

#[test]
fn non_numeric_text_is_rejected() {
    assert_eq!(parse_price("Agotado"), None);
    assert_eq!(parse_price(""), None);
    assert_eq!(parse_price("1.234,56"), None);
}

// ---------------------------------------------------------------------------
// extract_price
// ---------------------------------------------------------------------------

#[test]
fn falls_back_to_later_locator() {
    let html = common::page("<price>199,99</price>");
    let price = extract_price(&html, &locators(&["//missing", "//price"]), "urlA").unwrap();
    assert_eq!(price, 199.99);
}

#[test]
fn first_matching_locator_wins() {
    let html = common::page("<a>1,00</a><b>2,00</b>");
    let price = extract_price(&html, &locators(&["//b", "//a"]), "u").unwrap();
    assert_eq!(price, 2.00);
}

#[test]
fn moving_the_matching_locator_first_keeps_the_value() {
    let html = common::page("<price>15,75</price>");
    let back = extract_price(&html, &locators(&["//x", "//y", "//price"]), "u").unwrap();
    let front = extract_price(&html, &locators(&["//price", "//x", "//y"]), "u").unwrap();
    assert_eq!(back, front);
}

#[test]
fn amazon_second_template_is_found() {
    let locs = locators(&[
        r#"//*[@id="corePriceDisplay_desktop_feature_div"]/div[1]/span[3]/span[2]/span[1]"#,
        r#"//*[@id="corePriceDisplay_desktop_feature_div"]/div[1]/span[2]/span[2]/span[1]"#,
    ]);
    let price = extract_price(&common::amazon_page("89,90"), &locs, "amz").unwrap();
    assert_eq!(price, 89.90);
}

#[test]
fn no_match_is_price_not_found_with_source() {
    let html = common::page("<p>nope</p>");
    let err = extract_price(&html, &locators(&["//price"]), "https://shop/item").unwrap_err();
    match err {
        TrackerError::PriceNotFound { url } => assert_eq!(url, "https://shop/item"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn unparseable_text_is_price_not_found() {
    let html = common::page("<price>Agotado</price>");
    let err = extract_price(&html, &locators(&["//price"]), "u").unwrap_err();
    assert!(err.is_price_not_found());
}

#[test]
fn empty_locator_list_finds_nothing() {
    let err = extract_price(&common::page("<price>1</price>"), &[], "u").unwrap_err();
    assert!(err.is_price_not_found());
}
