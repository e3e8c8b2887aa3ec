use url::Url;

/// Extracts the host of a locator, keeping a non-default port
///
/// This function parses the locator and returns its lowercase host, with the
/// port appended when one is given explicitly. Locators that do not parse or
/// have no host return None.
///
/// # Examples
///
/// ```
/// use vdp_scout::url::extract_host;
///
/// assert_eq!(
///     extract_host("https://www.GunnNissan.com/sitemap.xml"),
///     Some("www.gunnnissan.com".to_string())
/// );
/// assert_eq!(
///     extract_host("http://127.0.0.1:8080/sitemap.xml"),
///     Some("127.0.0.1:8080".to_string())
/// );
/// assert_eq!(extract_host("not a url"), None);
/// ```
pub fn extract_host(locator: &str) -> Option<String> {
    let url = Url::parse(locator.trim()).ok()?;
    let host = url.host_str()?.to_lowercase();

    match url.port() {
        Some(port) => Some(format!("{}:{}", host, port)),
        None => Some(host),
    }
}
