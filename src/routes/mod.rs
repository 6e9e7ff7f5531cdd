//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! Google redirects back to `/` (the registered redirect URI), so the index
//! route doubles as the OAuth callback: with `code`/`state` (or `error`) in
//! the query it completes the login, otherwise it renders the current screen.

pub mod auth;
pub mod dashboard;

use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;

use crate::state::AppState;
use crate::view::{LOGIN_PATH, LOGOUT_PATH};

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(dashboard::index))
        .route(LOGIN_PATH, get(auth::login))
        .route(LOGOUT_PATH, post(auth::logout))
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

/// Ready when the backend answers its health probe.
async fn readyz(State(state): State<AppState>) -> StatusCode {
    match state.backend.health().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "backend health check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
