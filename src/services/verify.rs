//! Optional issuer / audience / expiry checks over decoded claims.
//!
//! This is NOT signature verification. It only rejects payloads that were
//! clearly minted for another client or have expired; a forged token with the
//! right fields still passes. Disabled unless `VERIFY_ID_TOKEN_CLAIMS` is set.

use serde_json::Value;

use super::token::Claims;

/// Issuers Google puts in ID tokens.
pub const GOOGLE_ISSUERS: &[&str] = &["https://accounts.google.com", "accounts.google.com"];

/// Clock skew tolerated on `exp`.
const DEFAULT_LEEWAY_SECS: i64 = 60;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ClaimsError {
    #[error("missing claim: {0}")]
    Missing(&'static str),
    #[error("iss: unexpected issuer '{0}'")]
    Issuer(String),
    #[error("aud: token not issued for this client")]
    Audience,
    #[error("exp: token expired at {exp} (now {now})")]
    Expired { exp: i64, now: i64 },
}

#[derive(Debug, Clone)]
pub struct ClaimsPolicy {
    audience: String,
    issuers: Vec<String>,
    leeway_secs: i64,
}

impl ClaimsPolicy {
    /// Policy for ID tokens issued by Google to `client_id`.
    #[must_use]
    pub fn google(client_id: &str) -> Self {
        Self {
            audience: client_id.to_owned(),
            issuers: GOOGLE_ISSUERS.iter().map(|s| (*s).to_owned()).collect(),
            leeway_secs: DEFAULT_LEEWAY_SECS,
        }
    }

    /// Check `iss`, `aud` and `exp` against the policy at unix time `now`.
    ///
    /// # Errors
    ///
    /// Returns the first failing check.
    pub fn check(&self, claims: &Claims, now: i64) -> Result<(), ClaimsError> {
        let issuer = claims
            .get("iss")
            .and_then(Value::as_str)
            .ok_or(ClaimsError::Missing("iss"))?;
        if !self.issuers.iter().any(|i| i == issuer) {
            return Err(ClaimsError::Issuer(issuer.to_owned()));
        }

        // `aud` is either a single string or an array of strings.
        let audience_ok = match claims.get("aud") {
            Some(Value::String(aud)) => *aud == self.audience,
            Some(Value::Array(auds)) => auds.iter().any(|a| a.as_str() == Some(self.audience.as_str())),
            _ => return Err(ClaimsError::Missing("aud")),
        };
        if !audience_ok {
            return Err(ClaimsError::Audience);
        }

        let exp = claims
            .get("exp")
            .and_then(Value::as_i64)
            .ok_or(ClaimsError::Missing("exp"))?;
        if exp + self.leeway_secs < now {
            return Err(ClaimsError::Expired { exp, now });
        }

        Ok(())
    }

    /// [`Self::check`] against the current wall clock.
    ///
    /// # Errors
    ///
    /// Returns the first failing check.
    pub fn check_now(&self, claims: &Claims) -> Result<(), ClaimsError> {
        self.check(claims, time::OffsetDateTime::now_utc().unix_timestamp())
    }
}

#[cfg(test)]
#[path = "verify_test.rs"]
mod tests;
