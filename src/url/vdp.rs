//! Vehicle detail page recognition
//!
//! Sitemaps list every page of a dealer site. Only new-vehicle detail pages
//! are worth sending to the extractor, and this module decides which ones
//! qualify from the URL alone.

use crate::config::VdpFilterConfig;
use regex::Regex;
use once_cell::sync::Lazy;

/// Fixed substrings that mark a detail page
const DETAIL_MARKERS: &[&str] = &["detail", "viewdetail", "/auto/", "/vehicle/"];

static RE_VIN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:^|[^a-z0-9])[a-hj-npr-z0-9]{17}(?:$|[^a-z0-9])").unwrap()
});
static RE_MODEL_YEAR_LISTING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/inventory/new-\d{4}").unwrap());

/// Returns true if the URL looks like a new-vehicle detail page
///
/// A URL qualifies when, compared case-insensitively, it:
/// - mentions a new vehicle (`new` or a `/n/` path segment),
/// - contains the configured make term,
/// - carries a detail marker (a 17-character VIN run, `detail`, `/auto/`,
///   `/vehicle/` or an `/inventory/new-YYYY` listing),
/// - contains none of the excluded terms.
///
/// # Examples
///
/// ```
/// use vdp_scout::config::VdpFilterConfig;
/// use vdp_scout::url::is_vehicle_detail_page;
///
/// let filter = VdpFilterConfig::default();
/// assert!(is_vehicle_detail_page(
///     "https://dealer.com/new-nissan-rogue-1N4BL4BV0PN123456",
///     &filter
/// ));
/// assert!(!is_vehicle_detail_page("https://dealer.com/used-nissan-detail", &filter));
/// ```
pub fn is_vehicle_detail_page(url: &str, filter: &VdpFilterConfig) -> bool {
    let url = url.to_lowercase();

    let is_new = url.contains("new") || url.contains("/n/");
    let has_make = url.contains(&filter.make_term.to_lowercase());
    let has_marker = DETAIL_MARKERS.iter().any(|m| url.contains(m))
        || RE_VIN.is_match(&url)
        || RE_MODEL_YEAR_LISTING.is_match(&url);
    let is_excluded = filter
        .exclude_terms
        .iter()
        .any(|term| url.contains(&term.to_lowercase()));

    is_new && has_make && has_marker && !is_excluded
}
