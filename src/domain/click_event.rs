//! Click event model for asynchronous analytics.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Coarse classification of the client's User-Agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UserAgentClass {
    Browser,
    Mobile,
    Bot,
    Unknown,
}

impl UserAgentClass {
    /// Classifies a raw User-Agent header value.
    ///
    /// Bot markers win over device markers, since crawlers routinely
    /// impersonate mobile browsers.
    pub fn classify(user_agent: Option<&str>) -> Self {
        let Some(ua) = user_agent.map(str::to_ascii_lowercase) else {
            return Self::Unknown;
        };

        const BOT_MARKERS: &[&str] = &[
            "bot", "crawler", "spider", "slurp", "curl", "wget", "python-requests",
            "httpclient", "preview", "headless",
        ];
        const MOBILE_MARKERS: &[&str] = &["mobile", "android", "iphone", "ipad", "ipod"];

        if BOT_MARKERS.iter().any(|m| ua.contains(m)) {
            Self::Bot
        } else if MOBILE_MARKERS.iter().any(|m| ua.contains(m)) {
            Self::Mobile
        } else if ua.starts_with("mozilla/") || ua.starts_with("opera/") {
            Self::Browser
        } else {
            Self::Unknown
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Browser => "browser",
            Self::Mobile => "mobile",
            Self::Bot => "bot",
            Self::Unknown => "unknown",
        }
    }
}

/// Request metadata attached to a click.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientMeta {
    pub referrer: Option<String>,
    pub country: Option<String>,
    pub user_agent_class: UserAgentClass,
}

impl ClientMeta {
    pub fn new(referrer: Option<String>, country: Option<String>, user_agent: Option<&str>) -> Self {
        Self {
            referrer,
            country,
            user_agent_class: UserAgentClass::classify(user_agent),
        }
    }

    /// Metadata for clicks with no request context (CLI, internal callers).
    pub fn anonymous() -> Self {
        Self {
            referrer: None,
            country: None,
            user_agent_class: UserAgentClass::Unknown,
        }
    }
}

/// Identity of a click used for deduplication: `(slug, timestamp, nonce)`.
pub type EventKey = (String, i64, u64);

/// A single successful redirect.
///
/// Events are append-only: once built they are moved into the
/// [`crate::application::services::AnalyticsRecorder`] and never mutated.
///
/// # Usage Flow
///
/// 1. Built by the redirect handler after a successful resolution
/// 2. Moved into the recorder (non-blocking `try_send`)
/// 3. Batched by [`crate::domain::click_worker::run_click_worker`]
/// 4. Delivered to a [`crate::domain::repositories::ClickSink`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClickEvent {
    pub slug: String,
    pub timestamp: DateTime<Utc>,
    pub nonce: u64,
    pub client: ClientMeta,
}

impl ClickEvent {
    /// Creates an event with a fresh random nonce.
    pub fn new(slug: impl Into<String>, timestamp: DateTime<Utc>, client: ClientMeta) -> Self {
        Self {
            slug: slug.into(),
            timestamp,
            nonce: rand::random(),
            client,
        }
    }

    /// Deduplication key for this event.
    pub fn key(&self) -> EventKey {
        (
            self.slug.clone(),
            self.timestamp.timestamp_micros(),
            self.nonce,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_desktop_browser() {
        let ua = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 Chrome/120.0";
        assert_eq!(UserAgentClass::classify(Some(ua)), UserAgentClass::Browser);
    }

    #[test]
    fn test_classify_mobile() {
        let ua = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) Mobile/15E148";
        assert_eq!(UserAgentClass::classify(Some(ua)), UserAgentClass::Mobile);
    }

    #[test]
    fn test_classify_bots() {
        for ua in [
            "Googlebot/2.1 (+http://www.google.com/bot.html)",
            "curl/8.4.0",
            "Mozilla/5.0 (compatible; bingbot/2.0)",
            "Mozilla/5.0 (Linux; Android 6.0.1) Mobile Googlebot/2.1",
        ] {
            assert_eq!(UserAgentClass::classify(Some(ua)), UserAgentClass::Bot, "{ua}");
        }
    }

    #[test]
    fn test_classify_unknown() {
        assert_eq!(UserAgentClass::classify(None), UserAgentClass::Unknown);
        assert_eq!(
            UserAgentClass::classify(Some("SomeCustomClient/1.0")),
            UserAgentClass::Unknown
        );
    }

    #[test]
    fn test_click_event_creation() {
        let now = Utc::now();
        let meta = ClientMeta::new(
            Some("https://google.com".to_string()),
            Some("DE".to_string()),
            Some("Mozilla/5.0"),
        );
        let event = ClickEvent::new("abc123", now, meta);

        assert_eq!(event.slug, "abc123");
        assert_eq!(event.timestamp, now);
        assert_eq!(event.client.referrer.as_deref(), Some("https://google.com"));
        assert_eq!(event.client.country.as_deref(), Some("DE"));
        assert_eq!(event.client.user_agent_class, UserAgentClass::Browser);
    }

    #[test]
    fn test_nonce_distinguishes_same_instant() {
        let now = Utc::now();
        let a = ClickEvent::new("x", now, ClientMeta::anonymous());
        let b = ClickEvent::new("x", now, ClientMeta::anonymous());

        assert_ne!(a.key(), b.key());
    }

    #[test]
    fn test_key_is_stable_for_clones() {
        let event = ClickEvent::new("x", Utc::now(), ClientMeta::anonymous());
        assert_eq!(event.key(), event.clone().key());
    }

    #[test]
    fn test_serializes_user_agent_class_lowercase() {
        let json = serde_json::to_value(ClientMeta::new(None, None, Some("curl/8"))).unwrap();
        assert_eq!(json["user_agent_class"], "bot");
    }
}
