//! URL validation helpers.

use reqwest::Url;

/// Whether `input` parses as an absolute http or https URL with a host.
pub fn is_valid_url(input: &str) -> bool {
    parse_http_url(input).is_some()
}

/// Parse an absolute http(s) URL.
pub fn parse_http_url(input: &str) -> Option<Url> {
    let url = Url::parse(input.trim()).ok()?;
    match url.scheme() {
        "http" | "https" if url.host_str().is_some() => Some(url),
        _ => None,
    }
}

/// Trim and prepend `https://` when no scheme is given.
pub fn normalize_url(input: &str) -> String {
    let trimmed = input.trim();
    if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    }
}

/// Host part of a URL, if it has one.
pub fn extract_domain(input: &str) -> Option<String> {
    Url::parse(input.trim())
        .ok()?
        .host_str()
        .map(str::to_string)
}
