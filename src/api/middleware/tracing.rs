//! HTTP request spans.

use axum::http::Request;
use std::time::Duration;
use tower_http::classify::{ServerErrorsAsFailures, ServerErrorsFailureClass, SharedClassifier};
use tower_http::trace::{DefaultOnResponse, MakeSpan, TraceLayer};
use tower_http::LatencyUnit;
use tracing::{Level, Span};

/// Span factory for incoming requests.
///
/// Health checks get a `DEBUG` span so they stay out of the default `info`
/// output; everything else, including redirects, is spanned at `INFO`.
#[derive(Clone, Copy, Debug, Default)]
pub struct RequestSpan;

impl<B> MakeSpan<B> for RequestSpan {
    fn make_span(&mut self, request: &Request<B>) -> Span {
        let path = request.uri().path();

        if path == "/health" {
            tracing::debug_span!("request", method = %request.method(), path)
        } else {
            tracing::info_span!("request", method = %request.method(), path)
        }
    }
}

/// Builds the tracing layer applied to the whole router.
///
/// ```text
/// INFO request{method=GET path=/promo}: finished processing request latency=0 ms status=307
/// WARN request{method=GET path=/promo}: request failed class=Status code 503 latency_ms=500
/// ```
pub fn layer() -> TraceLayer<
    SharedClassifier<ServerErrorsAsFailures>,
    RequestSpan,
    tower_http::trace::DefaultOnRequest,
    DefaultOnResponse,
    tower_http::trace::DefaultOnBodyChunk,
    tower_http::trace::DefaultOnEos,
    fn(ServerErrorsFailureClass, Duration, &Span),
> {
    TraceLayer::new_for_http()
        .make_span_with(RequestSpan)
        .on_response(
            DefaultOnResponse::new()
                .level(Level::INFO)
                .latency_unit(LatencyUnit::Millis),
        )
        .on_failure(on_failure as fn(ServerErrorsFailureClass, Duration, &Span))
}

fn on_failure(class: ServerErrorsFailureClass, latency: Duration, _span: &Span) {
    tracing::warn!(
        class = %class,
        latency_ms = latency.as_millis() as u64,
        "request failed"
    );
}
