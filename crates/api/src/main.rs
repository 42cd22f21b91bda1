use std::sync::Arc;

use forgekit_api::config::AppConfig;
use forgekit_api::context::AppContext;
use forgekit_observability::LogFormat;

#[tokio::main]
async fn main() {
    // Logging must be up before config parsing so failures are reported;
    // peek at NODE_ENV directly to pick the format.
    let format = match std::env::var("NODE_ENV").as_deref() {
        Ok("production") => LogFormat::Json,
        _ => LogFormat::Pretty,
    };
    forgekit_observability::init(format);

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            tracing::error!(error = %err, "invalid environment configuration");
            std::process::exit(1);
        }
    };

    let port = config.listen_port();
    let app_name = config.app_name.clone();

    let context = match AppContext::new(config) {
        Ok(context) => Arc::new(context),
        Err(err) => {
            tracing::error!(error = %err, "failed to build application context");
            std::process::exit(1);
        }
    };

    let app = forgekit_api::app::build_app(context);

    let listener = match tokio::net::TcpListener::bind(("0.0.0.0", port)).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!(error = %err, port, "failed to start server");
            std::process::exit(1);
        }
    };

    tracing::info!(%app_name, port, "server is running");
    axum::serve(listener, app).await.expect("server error");
}
