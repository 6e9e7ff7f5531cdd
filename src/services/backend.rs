//! Backend-as-a-service handle.
//!
//! Built once at startup from the backend base URL and public (anon) key,
//! and held for the life of the process. Sessions never go through it; the
//! readiness probe uses it to confirm the backend is reachable.

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use url::Url;

const HEALTH_PATH: &str = "auth/v1/health";

#[derive(Debug, thiserror::Error)]
pub enum ClientInitError {
    #[error("invalid backend url: {0}")]
    Url(#[from] url::ParseError),
    #[error("backend url must be http or https, got '{0}'")]
    Scheme(String),
    #[error("backend key is not a valid header value")]
    Key,
    #[error("http client build failed: {0}")]
    Http(#[from] reqwest::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("backend request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("backend unhealthy: {0}")]
    Status(reqwest::StatusCode),
    #[error("invalid backend url: {0}")]
    Url(#[from] url::ParseError),
}

#[derive(Debug, Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    base_url: Url,
}

impl BackendClient {
    /// Validate the URL and key and build a client that sends the key on
    /// every request.
    ///
    /// # Errors
    ///
    /// Returns a [`ClientInitError`] if the URL does not parse, is not
    /// http(s), the key cannot be sent as a header, or the HTTP client fails
    /// to build.
    pub fn new(base_url: &str, api_key: &str) -> Result<Self, ClientInitError> {
        let mut base_url = Url::parse(base_url)?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(ClientInitError::Scheme(base_url.scheme().to_owned()));
        }
        // Keep a trailing slash so `join` appends instead of replacing.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let mut key = HeaderValue::from_str(api_key).map_err(|_| ClientInitError::Key)?;
        key.set_sensitive(true);
        let mut bearer = HeaderValue::from_str(&format!("Bearer {api_key}")).map_err(|_| ClientInitError::Key)?;
        bearer.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert("apikey", key);
        headers.insert(AUTHORIZATION, bearer);

        let http = reqwest::Client::builder().default_headers(headers).build()?;
        Ok(Self { http, base_url })
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// URL of the backend's auth health endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error only if the base URL cannot be joined.
    pub fn health_url(&self) -> Result<Url, url::ParseError> {
        self.base_url.join(HEALTH_PATH)
    }

    /// Probe the backend's auth health endpoint.
    ///
    /// # Errors
    ///
    /// Returns a [`BackendError`] on transport failure or a non-2xx status.
    pub async fn health(&self) -> Result<(), BackendError> {
        let resp = self.http.get(self.health_url()?).send().await?;
        if !resp.status().is_success() {
            return Err(BackendError::Status(resp.status()));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "backend_test.rs"]
mod tests;
