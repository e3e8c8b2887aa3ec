//! URL handling module for VDP-Scout
//!
//! This module provides host extraction, competitor labelling of sitemap
//! locators, and recognition of vehicle detail page URLs.

mod host;
mod vdp;

use crate::config::CompetitorEntry;

// Re-export main functions
pub use host::extract_host;
pub use vdp::is_vehicle_detail_page;

/// Derives a human-readable competitor name from a sitemap locator
///
/// The locator's host is checked against the configured competitor entries in
/// order; the first entry whose pattern occurs in the host wins. When nothing
/// matches, the host itself is the label. A locator without a host is
/// returned as-is, so this function never fails.
///
/// # Examples
///
/// ```
/// use vdp_scout::config::CompetitorEntry;
/// use vdp_scout::url::competitor_label;
///
/// let entries = vec![CompetitorEntry {
///     pattern: "gunnnissan".to_string(),
///     name: "Gunn Nissan".to_string(),
/// }];
///
/// assert_eq!(
///     competitor_label("https://www.gunnnissan.com/sitemap.xml", &entries),
///     "Gunn Nissan"
/// );
/// assert_eq!(
///     competitor_label("https://www.otherdealer.com/sitemap.xml", &entries),
///     "www.otherdealer.com"
/// );
/// ```
pub fn competitor_label(locator: &str, entries: &[CompetitorEntry]) -> String {
    let host = match extract_host(locator) {
        Some(host) => host,
        None => return locator.trim().to_string(),
    };

    entries
        .iter()
        .find(|entry| host.contains(&entry.pattern.to_lowercase()))
        .map(|entry| entry.name.clone())
        .unwrap_or(host)
}
