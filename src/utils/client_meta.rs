//! Client metadata extraction from HTTP request headers.

use axum::http::{HeaderMap, header};

use crate::domain::click_event::ClientMeta;

/// Edge headers carrying the visitor's ISO country code, in priority order.
///
/// `CF-IPCountry` is set by Cloudflare; `X-Country-Code` is a common
/// convention for other reverse proxies.
const COUNTRY_HEADERS: &[&str] = &["cf-ipcountry", "x-country-code"];

/// Builds [`ClientMeta`] from request headers.
///
/// Missing or non-UTF-8 headers are treated as absent. Country codes are
/// uppercased; Cloudflare's `XX` (unknown) and `T1` (Tor) markers are dropped.
pub fn client_meta_from_headers(headers: &HeaderMap) -> ClientMeta {
    let referrer = header_str(headers, header::REFERER.as_str()).map(str::to_string);
    let user_agent = header_str(headers, header::USER_AGENT.as_str());

    let country = COUNTRY_HEADERS
        .iter()
        .find_map(|name| header_str(headers, name))
        .map(|c| c.trim().to_ascii_uppercase())
        .filter(|c| c.len() == 2 && c != "XX" && c != "T1");

    ClientMeta::new(referrer, country, user_agent)
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}
