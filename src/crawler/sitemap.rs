//! Sitemap reader
//!
//! Collects `<loc>` entries from a sitemap document and narrows them down to
//! the vehicle detail pages worth scraping.

use crate::config::VdpFilterConfig;
use crate::crawler::FetchError;
use crate::url::is_vehicle_detail_page;
use quick_xml::events::Event;
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::NsReader;
use thiserror::Error;
use url::Url;

/// Namespace of the sitemaps.org protocol
const SITEMAP_NS: &[u8] = b"http://www.sitemaps.org/schemas/sitemap/0.9";

/// Errors raised while reading a sitemap
#[derive(Debug, Error)]
pub enum SitemapError {
    #[error("Invalid sitemap locator '{locator}': {source}")]
    InvalidLocator {
        locator: String,
        source: url::ParseError,
    },

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Malformed sitemap XML at byte {position}: {message}")]
    Malformed { position: usize, message: String },

    #[error("Document is not a sitemap (no <urlset> or <sitemapindex> root)")]
    NotASitemap,
}

/// Kind of sitemap document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SitemapKind {
    /// A `<urlset>` listing pages
    UrlSet,
    /// A `<sitemapindex>` listing further sitemaps
    Index,
}

/// Locations read from one sitemap document
#[derive(Debug, Clone)]
pub struct SitemapDocument {
    pub kind: SitemapKind,

    /// Absolute `<loc>` values in document order
    pub locations: Vec<String>,
}

/// Parses sitemap XML and returns its locations in document order
///
/// Elements are matched in the sitemaps.org namespace, whether it is the
/// default namespace or bound to a prefix. Documents without any namespace
/// are accepted too. Extension elements such as `<image:loc>` are ignored.
/// Relative locations are resolved against `base`.
///
/// # Example
///
/// ```
/// use url::Url;
/// use vdp_scout::crawler::{parse_sitemap_xml, SitemapKind};
///
/// let xml = r#"<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
///   <url><loc>https://dealer.com/a</loc></url>
///   <url><loc>/b</loc></url>
/// </urlset>"#;
/// let base = Url::parse("https://dealer.com/sitemap.xml").unwrap();
/// let doc = parse_sitemap_xml(xml, &base).unwrap();
/// assert_eq!(doc.kind, SitemapKind::UrlSet);
/// assert_eq!(doc.locations, vec!["https://dealer.com/a", "https://dealer.com/b"]);
/// ```
pub fn parse_sitemap_xml(xml: &str, base: &Url) -> Result<SitemapDocument, SitemapError> {
    let mut reader = NsReader::from_str(xml);
    reader.trim_text(true);

    let mut kind = None;
    let mut in_loc = false;
    let mut current = String::new();
    let mut locations = Vec::new();

    loop {
        let position = reader.buffer_position();
        let (namespace, event) = match reader.read_resolved_event() {
            Ok(resolved) => resolved,
            Err(e) => {
                return Err(SitemapError::Malformed {
                    position,
                    message: e.to_string(),
                })
            }
        };
        let in_sitemap_ns = is_sitemap_namespace(&namespace);

        match event {
            Event::Start(e) if in_sitemap_ns => match e.local_name().as_ref() {
                b"loc" => {
                    in_loc = true;
                    current.clear();
                }
                name => kind = kind.or(root_kind(name)),
            },
            // A self-closing root is a valid sitemap without entries
            Event::Empty(e) if in_sitemap_ns => kind = kind.or(root_kind(e.local_name().as_ref())),
            Event::End(e) if in_loc && e.local_name().as_ref() == b"loc" => {
                in_loc = false;
                if let Some(location) = resolve_location(&current, base) {
                    locations.push(location);
                }
            }
            Event::Text(t) if in_loc => {
                let text = t.unescape().map_err(|e| SitemapError::Malformed {
                    position,
                    message: e.to_string(),
                })?;
                current.push_str(&text);
            }
            Event::CData(c) if in_loc => {
                current.push_str(&String::from_utf8_lossy(&c.into_inner()));
            }
            Event::Eof => break,
            _ => {}
        }
    }

    let kind = kind.ok_or(SitemapError::NotASitemap)?;
    Ok(SitemapDocument { kind, locations })
}

/// Returns true for the sitemaps.org namespace or no namespace at all
fn is_sitemap_namespace(namespace: &ResolveResult) -> bool {
    match namespace {
        ResolveResult::Unbound => true,
        ResolveResult::Bound(Namespace(uri)) => *uri == SITEMAP_NS,
        ResolveResult::Unknown(_) => false,
    }
}

fn root_kind(local_name: &[u8]) -> Option<SitemapKind> {
    match local_name {
        b"urlset" => Some(SitemapKind::UrlSet),
        b"sitemapindex" => Some(SitemapKind::Index),
        _ => None,
    }
}

/// Keeps the vehicle detail pages among sitemap locations
///
/// Pages are kept in document order and the list stops growing at `limit`;
/// truncation is silent.
pub fn select_vehicle_pages(
    locations: &[String],
    filter: &VdpFilterConfig,
    limit: usize,
) -> Vec<String> {
    locations
        .iter()
        .filter(|location| is_vehicle_detail_page(location, filter))
        .take(limit)
        .cloned()
        .collect()
}

/// Resolves a `<loc>` value to an absolute URL string
fn resolve_location(raw: &str, base: &Url) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    match Url::parse(raw) {
        Ok(url) => Some(url.to_string()),
        Err(_) => base.join(raw).ok().map(|url| url.to_string()),
    }
}
