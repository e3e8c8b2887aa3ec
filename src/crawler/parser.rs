//! HTML parser for vehicle detail pages
//!
//! This module narrows a fetched page down to what the extractor needs:
//! - The page title
//! - Elements whose classes suggest pricing (price, msrp, sale, offer, ...)
//! - Elements whose classes suggest vehicle information (vehicle, specs, vin, ...)
//!
//! When no such element exists the (truncated) body is used instead.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

static RE_PRICE_CLASS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)price|pricing|cost|msrp|sale|offer|payment").unwrap());
static RE_VEHICLE_CLASS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)vehicle|details|specs|info|vin").unwrap());

/// Extracted information from a vehicle detail page
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedPage {
    /// The page title (from <title> tag)
    pub title: Option<String>,

    /// HTML fragments handed to the extractor
    pub content: String,
}

/// Parses a vehicle detail page
///
/// # Section Selection Rules
///
/// 1. `div`, `section` and `span` elements with a price-like class
/// 2. `div`, `section` and `table` elements with a vehicle-like class
///
/// Price sections come first, then vehicle sections, each in document
/// order; only the first `max_sections` are kept and joined by newlines.
/// If nothing matches, the `<body>` (or the whole document) is used,
/// truncated to `max_body_chars` characters.
///
/// # Example
///
/// ```
/// use vdp_scout::crawler::parse_vehicle_page;
///
/// let html = r#"<html><head><title>2024 Rogue</title></head>
/// <body><div class="price-box">$31,000</div></body></html>"#;
/// let parsed = parse_vehicle_page(html, 10, 20_000);
/// assert_eq!(parsed.title.as_deref(), Some("2024 Rogue"));
/// assert!(parsed.content.contains("$31,000"));
/// ```
pub fn parse_vehicle_page(html: &str, max_sections: usize, max_body_chars: usize) -> ParsedPage {
    let document = Html::parse_document(html);

    let title = extract_title(&document);

    let mut sections = select_by_class(&document, "div, section, span", &RE_PRICE_CLASS);
    sections.extend(select_by_class(
        &document,
        "div, section, table",
        &RE_VEHICLE_CLASS,
    ));

    let content = if sections.is_empty() {
        let fallback = Selector::parse("body")
            .ok()
            .and_then(|selector| document.select(&selector).next().map(|body| body.html()))
            .unwrap_or_else(|| document.root_element().html());
        truncate_chars(&fallback, max_body_chars)
    } else {
        sections
            .iter()
            .take(max_sections)
            .map(|element| element.html())
            .collect::<Vec<_>>()
            .join("\n")
    };

    ParsedPage { title, content }
}

/// Extracts the page title from the HTML document
fn extract_title(document: &Html) -> Option<String> {
    let title_selector = Selector::parse("title").ok()?;

    document
        .select(&title_selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Returns elements matching `selector` whose class attribute matches `pattern`
fn select_by_class<'a>(document: &'a Html, selector: &str, pattern: &Regex) -> Vec<ElementRef<'a>> {
    let Ok(selector) = Selector::parse(selector) else {
        return Vec::new();
    };

    document
        .select(&selector)
        .filter(|element| {
            element
                .value()
                .attr("class")
                .map(|class| pattern.is_match(class))
                .unwrap_or(false)
        })
        .collect()
}

/// Truncates a string to at most `max_chars` characters
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => text[..byte_index].to_string(),
        None => text.to_string(),
    }
}
