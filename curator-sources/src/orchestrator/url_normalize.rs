//! URL canonicalisation for deduplication keys.
//!
//! Two items pointing at the same page should collide even when their URLs
//! differ in host capitalisation, fragment, tracking parameters, query
//! order, or a trailing slash.

use url::Url;

/// Canonical form of `raw` for equality comparison.
///
/// - scheme and host lowercased, default port dropped (done by [`Url::parse`])
/// - fragment removed
/// - `utm_*`, `fbclid`, `gclid`, `mc_cid`, `mc_eid` parameters removed
/// - remaining query parameters sorted
/// - trailing slash removed unless the path is `/`
///
/// Strings that do not parse as absolute URLs are only trimmed.
///
/// ```
/// use curator_sources::orchestrator::url_normalize::normalize_url;
///
/// assert_eq!(
///     normalize_url("https://Docs.RS/tokio/?b=2&a=1&utm_source=x#top"),
///     normalize_url("https://docs.rs/tokio?a=1&b=2"),
/// );
/// ```
pub fn normalize_url(raw: &str) -> String {
    let trimmed = raw.trim();
    let Ok(mut url) = Url::parse(trimmed) else {
        return trimmed.to_string();
    };

    url.set_fragment(None);

    let mut params: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| !is_tracking_param(key))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    params.sort();

    if params.is_empty() {
        url.set_query(None);
    } else {
        url.query_pairs_mut().clear().extend_pairs(params.iter());
    }

    let path = url.path().to_string();
    if path.len() > 1 && path.ends_with('/') {
        url.set_path(path.trim_end_matches('/'));
    }

    url.to_string()
}

fn is_tracking_param(key: &str) -> bool {
    let key = key.to_ascii_lowercase();
    key.starts_with("utm_") || matches!(key.as_str(), "fbclid" | "gclid" | "mc_cid" | "mc_eid")
}
