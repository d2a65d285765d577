//! Locator compilation and node text lookup.

mod common;

use pc_price_tracker::{Locator, TrackerError};
use scraper::Html;

// ---------------------------------------------------------------------------
// XPath -> CSS
// ---------------------------------------------------------------------------

#[test]
fn id_predicate_with_positional_steps() {
    let loc = Locator::parse(
        r#"//*[@id="corePriceDisplay_desktop_feature_div"]/div[1]/span[3]/span[2]/span[1]"#,
    )
    .unwrap();
    assert_eq!(
        loc.css(),
        r#"*[id="corePriceDisplay_desktop_feature_div"] > div:nth-of-type(1) > span:nth-of-type(3) > span:nth-of-type(2) > span:nth-of-type(1)"#
    );
}

#[test]
fn absolute_path_is_anchored_at_root() {
    let loc = Locator::parse("/html/body/div[2]/span").unwrap();
    assert_eq!(loc.css(), "html:root > body > div:nth-of-type(2) > span");
}

#[test]
fn descendant_steps_and_single_quotes() {
    let loc = Locator::parse("//div//span[@class='price']").unwrap();
    assert_eq!(loc.css(), r#"div span[class="price"]"#);
}

#[test]
fn wildcard_position_uses_nth_child() {
    let loc = Locator::parse("//ul/*[2]").unwrap();
    assert_eq!(loc.css(), "ul > *:nth-child(2)");
}

#[test]
fn trailing_text_step_is_ignored() {
    let loc = Locator::parse("//price/text()").unwrap();
    assert_eq!(loc.css(), "price");
}

#[test]
fn attribute_presence_predicate() {
    let loc = Locator::parse("//span[@data-price]").unwrap();
    assert_eq!(loc.css(), "span[data-price]");
}

#[test]
fn keeps_source_expression() {
    let loc = Locator::parse("//price").unwrap();
    assert_eq!(loc.as_str(), "//price");
    assert_eq!(loc.to_string(), "//price");
}

#[test]
fn rejects_unsupported_syntax() {
    for expr in [
        "",
        "//div[contains(@class, 'x')]",
        "//div[0]",
        "//div[@id=unquoted]",
        "//div[@id=\"x\"][2]",
        "//div[1",
        "//ancestor::div",
        "//div///span",
        "span",
        "div[2]/span",
        "*[@id=\"x\"]",
    ] {
        let err = Locator::parse(expr).unwrap_err();
        assert!(
            matches!(err, TrackerError::InvalidLocator { .. }),
            "{expr:?} gave {err:?}"
        );
    }
}

// ---------------------------------------------------------------------------
// first_text
// ---------------------------------------------------------------------------

#[test]
fn first_text_reads_direct_text_of_first_match() {
    let doc = Html::parse_document(&common::page(
        "<p><price> 12,50 <small>EUR</small></price><price>99</price></p>",
    ));
    let loc = Locator::parse("//price").unwrap();
    assert_eq!(loc.first_text(&doc).as_deref(), Some("12,50"));
}

#[test]
fn first_text_none_when_nothing_matches() {
    let doc = Html::parse_document(&common::page("<p>nothing here</p>"));
    let loc = Locator::parse("//missing").unwrap();
    assert_eq!(loc.first_text(&doc), None);
}

#[test]
fn first_text_none_for_element_without_own_text() {
    let doc = Html::parse_document(&common::page("<div id=\"p\"><span>5</span></div>"));
    let loc = Locator::parse(r#"//*[@id="p"]"#).unwrap();
    assert_eq!(loc.first_text(&doc), None);
}

#[test]
fn absolute_path_matches_parsed_document() {
    let doc = Html::parse_document(&common::page("<div>a</div><div><span>7,00</span></div>"));
    let loc = Locator::parse("/html/body/div[2]/span[1]").unwrap();
    assert_eq!(loc.first_text(&doc).as_deref(), Some("7,00"));
}
