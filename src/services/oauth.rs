//! Google OAuth2 authorization-code client.
//!
//! SYSTEM CONTEXT
//! ==============
//! The login button sends the browser to Google's authorization endpoint;
//! Google redirects back to `REDIRECT_URI` with a one-time `code`, which is
//! exchanged here for the token bundle the auth flow decodes. Routes depend on
//! the `OAuthProvider` trait so tests can substitute a canned provider.

use async_trait::async_trait;
use serde_json::{Map, Value};
use url::Url;

use super::auth::AuthorizationResult;
use super::session::TokenBundle;

pub const AUTHORIZE_ENDPOINT: &str = "https://accounts.google.com/o/oauth2/v2/auth";
/// Also serves refresh-token grants.
pub const TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";
pub const REVOKE_ENDPOINT: &str = "https://oauth2.googleapis.com/revoke";
pub const SCOPES: &[&str] = &["openid", "email", "profile"];
/// Must match the redirect URI registered with Google exactly.
pub const REDIRECT_URI: &str = "http://localhost:8501";
pub const LOGIN_ICON: &str = "https://www.google.com.tw/favicon.ico";

#[derive(Debug, thiserror::Error)]
pub enum OAuthError {
    #[error("token exchange failed: {0}")]
    TokenExchange(String),
    #[error("token revocation failed: {0}")]
    Revoke(String),
    #[error("invalid endpoint url: {0}")]
    Url(#[from] url::ParseError),
}

#[async_trait]
pub trait OAuthProvider: Send + Sync {
    /// URL that starts the hosted flow, carrying `state` for CSRF protection.
    fn authorize_url(&self, state: &str) -> Result<String, OAuthError>;

    /// Exchange an authorization code for the provider's token response.
    async fn exchange_code(&self, code: &str) -> Result<AuthorizationResult, OAuthError>;

    /// Revoke an access or refresh token.
    async fn revoke(&self, token: &str) -> Result<(), OAuthError>;
}

/// Endpoint set; tests point it at a local server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthEndpoints {
    pub authorize: String,
    pub token: String,
    pub revoke: String,
}

impl Default for OAuthEndpoints {
    fn default() -> Self {
        Self { authorize: AUTHORIZE_ENDPOINT.into(), token: TOKEN_ENDPOINT.into(), revoke: REVOKE_ENDPOINT.into() }
    }
}

#[derive(Debug, Clone)]
pub struct GoogleOAuth {
    http: reqwest::Client,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
    endpoints: OAuthEndpoints,
}

impl GoogleOAuth {
    #[must_use]
    pub fn new(http: reqwest::Client, client_id: &str, client_secret: &str) -> Self {
        Self {
            http,
            client_id: client_id.to_owned(),
            client_secret: client_secret.to_owned(),
            redirect_uri: REDIRECT_URI.to_owned(),
            endpoints: OAuthEndpoints::default(),
        }
    }

    #[cfg(test)]
    #[must_use]
    pub fn with_endpoints(mut self, endpoints: OAuthEndpoints) -> Self {
        self.endpoints = endpoints;
        self
    }
}

/// Parse a token endpoint body into a bundle, surfacing `error` responses.
pub(crate) fn parse_token_response(body: &str) -> Result<TokenBundle, OAuthError> {
    let fields: Map<String, Value> =
        serde_json::from_str(body).map_err(|_| OAuthError::TokenExchange(format!("unexpected response: {body}")))?;

    if let Some(error) = fields.get("error").and_then(Value::as_str) {
        let detail = fields
            .get("error_description")
            .and_then(Value::as_str)
            .unwrap_or_default();
        return Err(OAuthError::TokenExchange(format!("{error} {detail}").trim_end().to_owned()));
    }

    Ok(TokenBundle::new(fields))
}

#[async_trait]
impl OAuthProvider for GoogleOAuth {
    fn authorize_url(&self, state: &str) -> Result<String, OAuthError> {
        let scope = SCOPES.join(" ");
        let url = Url::parse_with_params(
            &self.endpoints.authorize,
            &[
                ("client_id", self.client_id.as_str()),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("response_type", "code"),
                ("scope", scope.as_str()),
                ("state", state),
            ],
        )?;
        Ok(url.into())
    }

    async fn exchange_code(&self, code: &str) -> Result<AuthorizationResult, OAuthError> {
        let resp = self
            .http
            .post(&self.endpoints.token)
            .header("Accept", "application/json")
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
            ])
            .send()
            .await
            .map_err(|e| OAuthError::TokenExchange(e.to_string()))?;

        let body = resp
            .text()
            .await
            .map_err(|e| OAuthError::TokenExchange(e.to_string()))?;
        Ok(AuthorizationResult::with_token(parse_token_response(&body)?))
    }

    async fn revoke(&self, token: &str) -> Result<(), OAuthError> {
        let resp = self
            .http
            .post(&self.endpoints.revoke)
            .form(&[("token", token)])
            .send()
            .await
            .map_err(|e| OAuthError::Revoke(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(OAuthError::Revoke(format!("{status}: {body}")));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "oauth_test.rs"]
mod tests;
