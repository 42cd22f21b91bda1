//! Landing page and the hello round-trip.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::Extension;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};

use forgekit_core::ErrorCode;

use crate::app::{dto, errors};
use crate::context::AppContext;

pub fn router() -> Router {
    Router::new().route("/", get(landing).post(greet))
}

pub async fn landing(Extension(context): Extension<Arc<AppContext>>) -> impl IntoResponse {
    tracing::info!("response success");
    Html(landing_page(&context.config.app_name))
}

pub async fn greet(payload: Result<Json<dto::PersonRequest>, JsonRejection>) -> Response {
    let Json(body) = match payload {
        Ok(json) => json,
        Err(rejection) => return errors::json_rejection(rejection),
    };
    if let Err(reason) = dto::validate_name(&body.name) {
        return errors::api_error(ErrorCode::ValidationError, reason);
    }
    tracing::info!("person response success");
    errors::api_success(body, None)
}

fn landing_page(app_name: &str) -> String {
    format!(
        r##"<!DOCTYPE html>
<html lang="en">
  <head>
    <meta charset="UTF-8" />
    <meta name="viewport" content="width=device-width, initial-scale=1.0" />
    <title>{app_name} - Production-Ready Starter</title>
    <style>
      * {{ margin: 0; padding: 0; box-sizing: border-box; }}
      body {{
        font-family: 'Inter', -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
        background-color: #0B1120;
        background-image: radial-gradient(circle at 15% 50%, rgba(6, 182, 212, 0.08), transparent 25%),
          radial-gradient(circle at 85% 30%, rgba(56, 189, 248, 0.08), transparent 25%);
        color: #F8FAFC;
        min-height: 100vh;
        line-height: 1.6;
      }}
      .container {{ max-width: 1000px; margin: 0 auto; padding: 4rem 2rem; }}
      header {{ text-align: center; margin-bottom: 4rem; }}
      h1 {{
        font-size: 3.5rem;
        font-weight: 800;
        letter-spacing: -0.05em;
        margin-bottom: 1rem;
        background: linear-gradient(135deg, #22d3ee, #38bdf8);
        -webkit-background-clip: text;
        -webkit-text-fill-color: transparent;
        background-clip: text;
      }}
      .tagline {{ color: #94A3B8; font-size: 1.25rem; margin: 0 auto 2rem; max-width: 600px; }}
      .badges {{ display: flex; flex-wrap: wrap; justify-content: center; gap: 0.75rem; }}
      .badge {{
        background: rgba(6, 182, 212, 0.1);
        color: #22d3ee;
        padding: 0.35rem 1rem;
        border-radius: 9999px;
        font-size: 0.875rem;
        border: 1px solid rgba(6, 182, 212, 0.2);
      }}
      .grid {{ display: grid; grid-template-columns: repeat(auto-fit, minmax(260px, 1fr)); gap: 1rem; margin-bottom: 4rem; }}
      .card {{
        background: rgba(30, 41, 59, 0.4);
        border: 1px solid rgba(148, 163, 184, 0.1);
        border-radius: 0.75rem;
        padding: 1.5rem;
      }}
      .card h3 {{ color: #e2e8f0; font-size: 1.125rem; margin-bottom: 0.75rem; }}
      .card p {{ font-size: 0.95rem; color: #94A3B8; }}
      footer {{ text-align: center; padding-top: 2rem; border-top: 1px solid rgba(148, 163, 184, 0.1); color: #475569; font-size: 0.875rem; }}
    </style>
  </head>
  <body>
    <div class="container">
      <header>
        <h1>{app_name}</h1>
        <p class="tagline">The production-ready scaffold for building high-performance APIs.</p>
        <div class="badges">
          <span class="badge">Axum</span>
          <span class="badge">Tokio</span>
          <span class="badge">PostgreSQL</span>
          <span class="badge">Background Jobs</span>
          <span class="badge">Email Ready</span>
        </div>
      </header>
      <div class="grid">
        <div class="card">
          <h3>&#128452;&#65039; Typed Postgres</h3>
          <p>Schema-aware queries over a lazily-connected pool, with migrations checked in next to the code.</p>
        </div>
        <div class="card">
          <h3>&#9889; Background Jobs</h3>
          <p>Durable async task processing through an external job service, with batching, scheduling, and replay.</p>
        </div>
        <div class="card">
          <h3>&#128231; Email Ready</h3>
          <p>Transactional email with templates, queued off the request path.</p>
        </div>
        <div class="card">
          <h3>&#128737;&#65039; Gated Requests</h3>
          <p>Pluggable rate limiting and bot filtering in front of every route.</p>
        </div>
      </div>
      <footer>Check <code>/health</code> for service status.</footer>
    </div>
  </body>
</html>
"##
    )
}
