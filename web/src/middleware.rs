//! Request tracking and cross-origin policy.
//!
//! - [`correlation_id_layer`]: every request runs inside an `http_request` span
//!   tagged with a correlation id, which is echoed back in `X-Correlation-ID`
//! - [`cors_layer`]: browser origins allowed to call the API
//!
//! # Example
//!
//! ```ignore
//! let app = Router::new()
//!     .route("/api/health", get(health))
//!     .layer(cors_layer(&["https://book.example.com".to_string()]))
//!     .layer(correlation_id_layer());
//! ```

use crate::extractors::CorrelationId;
use axum::{
    extract::Request,
    http::{HeaderName, HeaderValue, Method, header, request},
    response::Response,
};
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Instant;
use tower::{Layer, Service};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::Instrument;

/// Header name for correlation ID.
pub const CORRELATION_ID_HEADER: &str = "x-correlation-id";

/// Origins with this prefix are always accepted (local development).
const LOCAL_ORIGIN_PREFIX: &str = "http://localhost";

/// Create a layer that adds correlation ID tracking to all requests.
#[must_use]
pub const fn correlation_id_layer() -> CorrelationIdLayer {
    CorrelationIdLayer
}

/// Layer for correlation ID tracking.
#[derive(Clone, Copy, Debug)]
pub struct CorrelationIdLayer;

impl<S> Layer<S> for CorrelationIdLayer {
    type Service = CorrelationIdMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        CorrelationIdMiddleware { inner }
    }
}

/// Middleware service for correlation ID tracking.
#[derive(Clone, Debug)]
pub struct CorrelationIdMiddleware<S> {
    inner: S,
}

impl<S> Service<Request> for CorrelationIdMiddleware<S>
where
    S: Service<Request, Response = Response> + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request) -> Self::Future {
        let correlation_id = CorrelationId::from_headers(req.headers());
        req.extensions_mut().insert(correlation_id);

        let method = req.method().clone();
        let span = tracing::info_span!(
            "http_request",
            correlation_id = %correlation_id,
            method = %method,
            path = %req.uri().path(),
        );
        let started = Instant::now();
        let fut = self.inner.call(req);

        Box::pin(async move {
            let mut response = fut.instrument(span.clone()).await?;

            let elapsed = started.elapsed();
            let status = response.status();
            span.in_scope(|| {
                tracing::debug!(
                    status = status.as_u16(),
                    elapsed_ms = elapsed.as_millis(),
                    "Request completed"
                );
            });
            metrics::histogram!(
                "http_request_duration_seconds",
                "method" => method.to_string(),
                "status" => status.as_u16().to_string()
            )
            .record(elapsed.as_secs_f64());

            if let Ok(header_value) = HeaderValue::from_str(&correlation_id.to_string()) {
                response
                    .headers_mut()
                    .insert(CORRELATION_ID_HEADER, header_value);
            }

            Ok(response)
        })
    }
}

/// Whether a browser origin may call the API.
///
/// Any `http://localhost*` origin is accepted, plus exact matches against
/// `allowed` (trailing slashes ignored).
#[must_use]
pub fn origin_allowed(origin: &str, allowed: &[String]) -> bool {
    origin.starts_with(LOCAL_ORIGIN_PREFIX)
        || allowed
            .iter()
            .any(|candidate| candidate.trim_end_matches('/') == origin.trim_end_matches('/'))
}

/// CORS policy for the API.
///
/// Requests without an `Origin` header (curl, server-to-server) are never
/// rejected by CORS; this layer only decides which browser origins get the
/// `Access-Control-Allow-Origin` header.
#[must_use]
pub fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let allowed: Arc<[String]> = allowed_origins
        .iter()
        .map(|origin| origin.trim().to_string())
        .filter(|origin| !origin.is_empty())
        .collect();
    let correlation_header = HeaderName::from_static(CORRELATION_ID_HEADER);

    CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(
            move |origin: &HeaderValue, _parts: &request::Parts| {
                let accepted = origin
                    .to_str()
                    .is_ok_and(|origin| origin_allowed(origin, &allowed));
                if !accepted {
                    tracing::warn!(origin = ?origin, "Rejected cross-origin request");
                }
                accepted
            },
        ))
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, correlation_header.clone()])
        .expose_headers([correlation_header])
}
