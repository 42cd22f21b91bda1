//! HTTP application wiring (Axum router + layers).
//!
//! - `routes/`: HTTP routes + handlers (one file per area)
//! - `dto.rs`: request DTOs and field validation
//! - `errors.rs`: the response envelope and handler error policy

use std::sync::Arc;

use axum::extract::Extension;
use axum::http::{header, HeaderValue, Method};
use axum::Router;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::config::AppConfig;
use crate::context::AppContext;
use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;

/// Build the full HTTP router (public entrypoint used by `main.rs` and the
/// black-box tests).
pub fn build_app(context: Arc<AppContext>) -> Router {
    let cors = cors_layer(&context.config);

    // Outermost first: CORS answers preflights before anything else, the
    // context extension must be in place before the gate reads it.
    Router::new()
        .merge(routes::router())
        .layer(axum::middleware::from_fn(middleware::gate_middleware))
        .layer(ServiceBuilder::new().layer(cors).layer(Extension(context)))
}

/// Browser origins from config; without an allowlist the layer mirrors the
/// request origin, which is the only wildcard-ish mode legal alongside
/// credentials.
fn cors_layer(config: &AppConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true);

    match &config.allowed_origins {
        Some(origins) => {
            let parsed: Vec<HeaderValue> = origins
                .iter()
                .filter_map(|origin| match origin.parse::<HeaderValue>() {
                    Ok(value) => Some(value),
                    Err(_) => {
                        tracing::warn!(%origin, "skipping unparseable allowed origin");
                        None
                    }
                })
                .collect();
            layer.allow_origin(parsed)
        }
        None => layer.allow_origin(AllowOrigin::mirror_request()),
    }
}
