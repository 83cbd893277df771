//! Click context extraction from HTTP request headers.
//!
//! The engine stores `source`, `country` and `device` as opaque strings. This
//! module is the presentation-side code that derives them from a request.

use crate::domain::entities::ClickContext;
use axum::http::{HeaderMap, header};
use url::Url;

/// Source recorded when no usable `Referer` is present.
pub const DIRECT_SOURCE: &str = "direct";

/// Country recorded when no upstream proxy supplied one.
pub const UNKNOWN_COUNTRY: &str = "Unknown";

/// Headers set by CDNs / reverse proxies carrying the client's country.
const COUNTRY_HEADERS: &[&str] = &["cf-ipcountry", "x-country-code"];

/// Builds the click context for a redirect request.
pub fn click_context_from_headers(headers: &HeaderMap) -> ClickContext {
    let user_agent = header_str(headers, header::USER_AGENT.as_str()).unwrap_or_default();

    ClickContext {
        source: source_from_referer(header_str(headers, header::REFERER.as_str())),
        country: country_from_headers(headers),
        device: device_class(user_agent).to_string(),
        user_agent: user_agent.to_string(),
    }
}

/// Referrer host, or [`DIRECT_SOURCE`] when absent or unparsable.
///
/// ```ignore
/// assert_eq!(source_from_referer(Some("https://www.google.com/search?q=x")), "www.google.com");
/// assert_eq!(source_from_referer(None), "direct");
/// ```
pub fn source_from_referer(referer: Option<&str>) -> String {
    referer
        .and_then(|r| Url::parse(r).ok())
        .and_then(|u| u.host_str().map(str::to_ascii_lowercase))
        .filter(|host| !host.is_empty())
        .unwrap_or_else(|| DIRECT_SOURCE.to_string())
}

fn country_from_headers(headers: &HeaderMap) -> String {
    COUNTRY_HEADERS
        .iter()
        .filter_map(|name| header_str(headers, name))
        .map(str::trim)
        .find(|value| !value.is_empty() && *value != "XX")
        .map(str::to_string)
        .unwrap_or_else(|| UNKNOWN_COUNTRY.to_string())
}

/// Coarse device class from a User-Agent string.
pub fn device_class(user_agent: &str) -> &'static str {
    if user_agent.trim().is_empty() {
        return "Unknown";
    }

    let ua = user_agent.to_ascii_lowercase();

    if ["bot", "crawler", "spider", "curl/", "wget/"]
        .iter()
        .any(|m| ua.contains(m))
    {
        "Bot"
    } else if ua.contains("ipad") || ua.contains("tablet") {
        "Tablet"
    } else if ["mobi", "iphone", "android"].iter().any(|m| ua.contains(m)) {
        "Mobile"
    } else {
        "Desktop"
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_source_from_referer_host() {
        assert_eq!(
            source_from_referer(Some("https://www.Google.com/search?q=rust")),
            "www.google.com"
        );
    }

    #[test]
    fn test_source_without_referer_is_direct() {
        assert_eq!(source_from_referer(None), DIRECT_SOURCE);
        assert_eq!(source_from_referer(Some("not a url")), DIRECT_SOURCE);
    }

    #[test]
    fn test_device_classes() {
        assert_eq!(
            device_class("Mozilla/5.0 (iPhone; CPU iPhone OS 14_7_1 like Mac OS X)"),
            "Mobile"
        );
        assert_eq!(
            device_class("Mozilla/5.0 (iPad; CPU OS 13_2 like Mac OS X)"),
            "Tablet"
        );
        assert_eq!(
            device_class("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36"),
            "Desktop"
        );
        assert_eq!(device_class("Googlebot/2.1"), "Bot");
        assert_eq!(device_class(""), "Unknown");
    }

    #[test]
    fn test_context_from_full_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::REFERER,
            HeaderValue::from_static("https://news.ycombinator.com/item?id=1"),
        );
        headers.insert(header::USER_AGENT, HeaderValue::from_static("Mozilla/5.0 (Android 14; Mobile)"));
        headers.insert("cf-ipcountry", HeaderValue::from_static("DE"));

        let ctx = click_context_from_headers(&headers);

        assert_eq!(ctx.source, "news.ycombinator.com");
        assert_eq!(ctx.country, "DE");
        assert_eq!(ctx.device, "Mobile");
        assert_eq!(ctx.user_agent, "Mozilla/5.0 (Android 14; Mobile)");
    }

    #[test]
    fn test_context_from_empty_headers() {
        let ctx = click_context_from_headers(&HeaderMap::new());

        assert_eq!(ctx.source, DIRECT_SOURCE);
        assert_eq!(ctx.country, UNKNOWN_COUNTRY);
        assert_eq!(ctx.device, "Unknown");
        assert!(ctx.user_agent.is_empty());
    }

    #[test]
    fn test_cloudflare_unknown_country_falls_through() {
        let mut headers = HeaderMap::new();
        headers.insert("cf-ipcountry", HeaderValue::from_static("XX"));
        headers.insert("x-country-code", HeaderValue::from_static("FR"));

        assert_eq!(click_context_from_headers(&headers).country, "FR");
    }
}
