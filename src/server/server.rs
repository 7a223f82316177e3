use anyhow::{Context, Result};
use std::time::Duration;

use axum::{extract::State, middleware, response::IntoResponse, routing::get, Json, Router};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tracing::info;

use super::error::ApiError;
use super::jobs::make_jobs_routes;
use super::state::ServerState;
use super::tools::make_tools_routes;
use super::log_requests;

#[derive(Serialize)]
struct ServerStats {
    pub name: &'static str,
    pub version: &'static str,
    pub uptime: String,
    pub jobs: usize,
}

fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

async fn home(State(state): State<ServerState>) -> impl IntoResponse {
    let stats = ServerStats {
        name: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        uptime: format_uptime(state.start_time.elapsed()),
        jobs: state.job_store.len(),
    };
    Json(stats)
}

async fn not_found() -> ApiError {
    ApiError::NotFound("Not Found")
}

async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

fn mount(app: Router, prefix: &str, routes: Router) -> Router {
    if prefix.is_empty() {
        app.merge(routes)
    } else {
        app.nest(prefix, routes)
    }
}

pub fn make_app(state: ServerState) -> Router {
    let prefix = state.config.api_prefix.clone();

    let mut app: Router = Router::new()
        .route("/", get(home))
        .with_state(state.clone());
    app = mount(app, &prefix, make_tools_routes(state.clone()));
    app = mount(app, &prefix, make_jobs_routes(state.clone()));

    // Registered after mounting so every route gets the JSON envelope.
    let app = app
        .fallback(not_found)
        .method_not_allowed_fallback(method_not_allowed);

    app.layer(middleware::from_fn_with_state(state, log_requests))
        .layer(CorsLayer::permissive())
}

/// Serves the API until `shutdown` is cancelled.
pub async fn run_server(state: ServerState, shutdown: CancellationToken) -> Result<()> {
    let address = format!("{}:{}", state.config.bind_address, state.config.port);
    let app = make_app(state);

    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;
    info!("Listening on {}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;
    Ok(())
}
