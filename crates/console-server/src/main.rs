//! HTTP host for the FixIt QC admin console
//!
//! Serves sign-in, the console bootstrap and command endpoints, the
//! marketing site's contact form and a health check on port 8081.

mod config;
mod routes;
mod session;
mod state;

use anyhow::Context;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fixit_core::config::Settings;

use crate::config::ServerConfig;
use crate::state::AppState;

pub(crate) fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(routes::health::router())
        .merge(routes::auth::router())
        .merge(routes::console::router())
        .merge(routes::site::router())
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "console_server=debug,fixit_core=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = Settings::from_env().context("Invalid backend settings")?;
    let server = ServerConfig::from_env()?;

    let backend = settings
        .build_backend()
        .await
        .context("Failed to initialize backend")?;
    tracing::info!(backend = backend.name(), "Backend ready");

    let app = build_router(AppState::new(
        backend,
        settings.auth_timeout,
        server.session_secret,
    ));

    tracing::info!("REST API listening on {}", server.listen_addr);
    let listener = tokio::net::TcpListener::bind(server.listen_addr)
        .await
        .with_context(|| format!("Failed to bind {}", server.listen_addr))?;
    axum::serve(listener, app).await?;
    Ok(())
}
