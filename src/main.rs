mod config;
mod routes;
mod services;
mod state;
mod view;

use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // A missing .env is fine; the variables may come from the environment.
    // Loaded first so RUST_LOG from .env reaches the filter.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = match config::Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "configuration invalid");
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    let state = match state::AppState::from_config(&config) {
        Ok(state) => state,
        Err(e) => {
            tracing::error!(error = %e, "startup failed");
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    if config.verify_claims {
        tracing::info!("ID token issuer/audience/expiry checks enabled (signatures are not verified)");
    } else {
        tracing::warn!("ID token claims are decoded without verification");
    }

    tracing::info!(
        backend = %state.backend.base_url(),
        revoke_on_logout = state.flow.revoke_on_logout(),
        "clients ready"
    );

    let port = config.port;
    let app = routes::app(state);
    let listener = match tokio::net::TcpListener::bind(format!("0.0.0.0:{port}")).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(error = %e, %port, "failed to bind");
            std::process::exit(1);
        }
    };

    tracing::info!(%port, "gavel listening");
    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!(error = %e, "server failed");
        std::process::exit(1);
    }
}
