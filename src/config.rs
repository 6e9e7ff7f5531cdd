//! Startup configuration parsed from environment variables.

use crate::services::oauth::REDIRECT_URI;

pub const DEFAULT_PORT: u16 = 8501;

const REQUIRED_VARS: [&str; 4] = ["SUPABASE_URL", "SUPABASE_ANON_KEY", "GOOGLE_CLIENT_ID", "GOOGLE_CLIENT_SECRET"];

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required environment variables: {}", .0.join(", "))]
    Missing(Vec<&'static str>),
    #[error("invalid PORT: {0}")]
    Port(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub backend_url: String,
    pub backend_key: String,
    pub google_client_id: String,
    pub google_client_secret: String,
    pub port: u16,
    pub revoke_on_logout: bool,
    pub verify_claims: bool,
    pub cookie_secure: bool,
}

/// Parse a boolean flag: `1/true/yes/on` or `0/false/no/off`, any case.
pub(crate) fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl Config {
    /// Build typed config from the process environment.
    ///
    /// Required (empty counts as missing):
    /// - `SUPABASE_URL`, `SUPABASE_ANON_KEY`
    /// - `GOOGLE_CLIENT_ID`, `GOOGLE_CLIENT_SECRET`
    ///
    /// Optional:
    /// - `PORT`: default 8501
    /// - `REVOKE_ON_LOGOUT`: default false
    /// - `VERIFY_ID_TOKEN_CLAIMS`: default false
    /// - `COOKIE_SECURE`: default true only for an https redirect URI
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] naming every absent required variable,
    /// or [`ConfigError::Port`] when `PORT` is not a valid port number.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`Self::from_env`] over an arbitrary lookup.
    ///
    /// # Errors
    ///
    /// See [`Self::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let missing: Vec<&'static str> = REQUIRED_VARS
            .iter()
            .copied()
            .filter(|key| required(*key).is_none())
            .collect();
        if !missing.is_empty() {
            return Err(ConfigError::Missing(missing));
        }
        let take = |key: &str| required(key).unwrap_or_default();

        let port = match lookup("PORT") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|_| ConfigError::Port(raw))?,
            None => DEFAULT_PORT,
        };
        let flag = |key: &str| lookup(key).as_deref().and_then(parse_bool);

        Ok(Self {
            backend_url: take("SUPABASE_URL"),
            backend_key: take("SUPABASE_ANON_KEY"),
            google_client_id: take("GOOGLE_CLIENT_ID"),
            google_client_secret: take("GOOGLE_CLIENT_SECRET"),
            port,
            revoke_on_logout: flag("REVOKE_ON_LOGOUT").unwrap_or(false),
            verify_claims: flag("VERIFY_ID_TOKEN_CLAIMS").unwrap_or(false),
            cookie_secure: flag("COOKIE_SECURE").unwrap_or_else(|| REDIRECT_URI.starts_with("https://")),
        })
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
