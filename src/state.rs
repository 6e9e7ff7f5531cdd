//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. It
//! holds the per-browser session map plus the clients and templates built
//! once at startup. Nothing in here is persisted.

use std::sync::Arc;

use crate::config::Config;
use crate::services::auth::AuthFlow;
use crate::services::backend::{BackendClient, ClientInitError};
use crate::services::oauth::{GoogleOAuth, OAuthProvider};
use crate::services::session::SessionStore;
use crate::services::verify::ClaimsPolicy;
use crate::view::{ViewError, Views};

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("Error initializing backend client: {0}")]
    Client(#[from] ClientInitError),
    #[error("Error compiling templates: {0}")]
    View(#[from] ViewError),
}

/// Shared application state. Clone is required by Axum; all inner fields are
/// Arc-wrapped or cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub sessions: SessionStore,
    pub flow: Arc<AuthFlow>,
    pub oauth: Arc<dyn OAuthProvider>,
    pub backend: Arc<BackendClient>,
    pub views: Arc<Views>,
    pub cookie_secure: bool,
}

impl AppState {
    #[must_use]
    pub fn new(
        flow: AuthFlow,
        oauth: Arc<dyn OAuthProvider>,
        backend: BackendClient,
        views: Views,
        cookie_secure: bool,
    ) -> Self {
        Self {
            sessions: SessionStore::new(),
            flow: Arc::new(flow),
            oauth,
            backend: Arc::new(backend),
            views: Arc::new(views),
            cookie_secure,
        }
    }

    /// Build every long-lived client from configuration.
    ///
    /// # Errors
    ///
    /// Returns a [`StartupError`] if the backend client cannot be constructed
    /// or the templates fail to compile.
    pub fn from_config(config: &Config) -> Result<Self, StartupError> {
        let backend = BackendClient::new(&config.backend_url, &config.backend_key)?;
        let oauth = GoogleOAuth::new(
            reqwest::Client::builder().build().map_err(ClientInitError::from)?,
            &config.google_client_id,
            &config.google_client_secret,
        );
        let policy = config
            .verify_claims
            .then(|| ClaimsPolicy::google(&config.google_client_id));
        let flow = AuthFlow::new(policy, config.revoke_on_logout);

        Ok(Self::new(flow, Arc::new(oauth), backend, Views::new()?, config.cookie_secure))
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================


#[cfg(test)]
#[path = "state_test.rs"]
mod tests;
