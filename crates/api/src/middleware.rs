//! Request gate (rate limiting / bot filtering) ahead of the router.
//!
//! The gate runs before every handler. Denials answer with plain bodies,
//! not the API envelope: a gated request never reached the API proper.

use std::net::IpAddr;
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::extract::Extension;
use axum::http::{HeaderMap, Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use serde_json::json;

use crate::context::AppContext;

/// What the gate learns about a request before deciding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateRequest {
    pub ip: Option<IpAddr>,
    pub method: String,
    pub path: String,
}

/// Verdict for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    Allow,
    RateLimited { retry_after: Option<DateTime<Utc>> },
    BotDenied,
    Denied,
}

/// Pluggable admission check.
///
/// Implementations must fail open: an evaluation error is an `Allow`, so an
/// unreachable gate backend never takes the API down with it.
#[async_trait]
pub trait RequestGate: Send + Sync {
    async fn evaluate(&self, request: &GateRequest) -> GateDecision;
}

pub async fn gate_middleware(
    Extension(context): Extension<Arc<AppContext>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let Some(gate) = context.gate.as_ref() else {
        return next.run(request).await;
    };

    let info = GateRequest {
        ip: client_ip(request.headers()),
        method: request.method().to_string(),
        path: request.uri().path().to_string(),
    };

    match gate.evaluate(&info).await {
        GateDecision::Allow => next.run(request).await,
        GateDecision::RateLimited { retry_after } => (
            StatusCode::TOO_MANY_REQUESTS,
            Json(json!({ "error": "Too Many Requests", "retryAfter": retry_after })),
        )
            .into_response(),
        GateDecision::BotDenied => {
            (StatusCode::FORBIDDEN, Json(json!({ "error": "Bot detected" }))).into_response()
        }
        GateDecision::Denied => {
            (StatusCode::FORBIDDEN, Json(json!({ "error": "Forbidden" }))).into_response()
        }
    }
}

/// Client address as reported by the reverse proxy.
fn client_ip(headers: &HeaderMap) -> Option<IpAddr> {
    let forwarded = headers.get("x-forwarded-for")?.to_str().ok()?;
    forwarded.split(',').next()?.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_ip_takes_the_first_forwarded_hop() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", "203.0.113.9, 10.0.0.1".parse().unwrap());
        assert_eq!(
            client_ip(&headers),
            Some("203.0.113.9".parse::<IpAddr>().unwrap())
        );
    }

    #[test]
    fn client_ip_is_none_without_the_header() {
        assert_eq!(client_ip(&HeaderMap::new()), None);

        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", "not-an-ip".parse().unwrap());
        assert_eq!(client_ip(&headers), None);
    }
}
