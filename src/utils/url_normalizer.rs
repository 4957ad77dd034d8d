//! Destination URL parsing and sanitization.
//!
//! Redirect targets must be absolute `http`/`https` URLs with a host. Hostnames
//! are lowercased and default ports dropped so that equal destinations compare
//! equal. Fragments are kept, since they are meaningful to the browser after
//! the redirect.

use url::Url;

/// Errors that can occur while parsing a redirect target.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TargetUrlError {
    #[error("Invalid URL format: {0}")]
    InvalidFormat(String),

    #[error("Only HTTP and HTTPS protocols are allowed")]
    UnsupportedProtocol,

    #[error("URL must include a host")]
    MissingHost,
}

/// Parses `input` into a normalized absolute redirect target.
///
/// # Rules
///
/// 1. **Protocol**: only HTTP and HTTPS are allowed
/// 2. **Host**: required, converted to lowercase
/// 3. **Default ports**: removed (80 for HTTP, 443 for HTTPS)
/// 4. **Path, query, fragment**: preserved as-is
///
/// Rejects `javascript:`, `data:`, `file:` and other non-web schemes, as well
/// as relative references like `/foo` or `example.com`.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(
///     parse_target("HTTPS://EXAMPLE.COM:443/Path").unwrap().as_str(),
///     "https://example.com/Path"
/// );
/// assert!(parse_target("javascript:alert(1)").is_err());
/// ```
pub fn parse_target(input: &str) -> Result<Url, TargetUrlError> {
    let url = Url::parse(input.trim()).map_err(|e| TargetUrlError::InvalidFormat(e.to_string()))?;

    match url.scheme() {
        "http" | "https" => {}
        _ => return Err(TargetUrlError::UnsupportedProtocol),
    }

    match url.host_str() {
        Some(host) if !host.is_empty() => {}
        _ => return Err(TargetUrlError::MissingHost),
    }

    // The url crate already lowercases special-scheme hosts and strips
    // default ports during parsing.
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_https() {
        let url = parse_target("https://example.com").unwrap();
        assert_eq!(url.as_str(), "https://example.com/");
    }

    #[test]
    fn test_parse_uppercase_host() {
        let url = parse_target("https://EXAMPLE.COM/Path").unwrap();
        assert_eq!(url.as_str(), "https://example.com/Path");
    }

    #[test]
    fn test_parse_removes_default_port() {
        let url = parse_target("https://example.com:443/path").unwrap();
        assert_eq!(url.as_str(), "https://example.com/path");

        let url = parse_target("http://example.com:80/path").unwrap();
        assert_eq!(url.as_str(), "http://example.com/path");
    }

    #[test]
    fn test_parse_keeps_custom_port() {
        let url = parse_target("http://example.com:8080/path").unwrap();
        assert_eq!(url.as_str(), "http://example.com:8080/path");
    }

    #[test]
    fn test_parse_keeps_fragment_and_query() {
        let url = parse_target("https://example.com/page?key=value#section").unwrap();
        assert_eq!(url.as_str(), "https://example.com/page?key=value#section");
    }

    #[test]
    fn test_parse_trims_whitespace() {
        let url = parse_target("  https://example.com/x  ").unwrap();
        assert_eq!(url.as_str(), "https://example.com/x");
    }

    #[test]
    fn test_reject_relative() {
        assert!(matches!(
            parse_target("/relative/path"),
            Err(TargetUrlError::InvalidFormat(_))
        ));
        assert!(matches!(
            parse_target("example.com"),
            Err(TargetUrlError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_reject_javascript_protocol() {
        assert_eq!(
            parse_target("javascript:alert('xss')"),
            Err(TargetUrlError::UnsupportedProtocol)
        );
    }

    #[test]
    fn test_reject_data_and_file_protocols() {
        assert_eq!(
            parse_target("data:text/html,<h1>hi</h1>"),
            Err(TargetUrlError::UnsupportedProtocol)
        );
        assert_eq!(
            parse_target("file:///etc/passwd"),
            Err(TargetUrlError::UnsupportedProtocol)
        );
    }

    #[test]
    fn test_reject_empty() {
        assert!(parse_target("").is_err());
    }
}
