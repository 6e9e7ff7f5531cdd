//! Login/logout transitions over `SessionState`.
//!
//! DESIGN
//! ======
//! The OAuth round trip itself is handled by the provider (`services::oauth`);
//! this module only consumes its result. `complete_login` moves a session
//! from `LoggedOut` to `LoggedIn` when the ID token decodes to claims with an
//! email, and `logout` clears the session unconditionally. Failures leave the
//! session logged out and are returned for inline display; nothing retries.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::session::{IdentityClaims, SessionState, TokenBundle};
use super::token::{self, Claims, TokenDecodeError};
use super::verify::{ClaimsError, ClaimsPolicy};

/// What the authorization flow hands back: usually `{"token": {...}}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthorizationResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<TokenBundle>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AuthorizationResult {
    #[must_use]
    pub fn with_token(token: TokenBundle) -> Self {
        Self { token: Some(token), extra: Map::new() }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LoginError {
    #[error("Login successful, but ID token not found in the response.")]
    IdTokenNotFound { received: AuthorizationResult },
    #[error("Login successful, but could not decode user information from ID token or email is missing.")]
    UndecodableClaims {
        decoded: Option<Claims>,
        token: TokenBundle,
        cause: Option<TokenDecodeError>,
    },
    #[error("Login successful, but the ID token was rejected: {cause}")]
    ClaimsRejected { cause: ClaimsError, token: TokenBundle },
}

/// Pull `IdentityClaims` out of a decoded payload. `None` without a
/// non-empty string `email`.
#[must_use]
pub fn identity_from_claims(claims: &Claims) -> Option<IdentityClaims> {
    let text = |key: &str| claims.get(key).and_then(Value::as_str).map(str::to_owned);

    let email = text("email").filter(|e| !e.is_empty())?;
    Some(IdentityClaims { email, name: text("name"), picture: text("picture"), subject: text("sub") })
}

/// Login/logout controller. Built once from configuration.
#[derive(Debug, Clone, Default)]
pub struct AuthFlow {
    policy: Option<ClaimsPolicy>,
    revoke_on_logout: bool,
}

impl AuthFlow {
    #[must_use]
    pub fn new(policy: Option<ClaimsPolicy>, revoke_on_logout: bool) -> Self {
        Self { policy, revoke_on_logout }
    }

    #[must_use]
    pub fn revoke_on_logout(&self) -> bool {
        self.revoke_on_logout
    }

    /// Apply an authorization result to a logged-out session.
    ///
    /// The token bundle (or its absence) is stored before anything is
    /// decoded, so a failed login can leave `token` set with no `user_info`.
    ///
    /// # Errors
    ///
    /// Returns a [`LoginError`] when the bundle has no ID token, the token
    /// does not decode to claims with an email, or the claims policy rejects
    /// it. The session stays logged out in every error case.
    pub fn complete_login(
        &self,
        session: &mut SessionState,
        result: AuthorizationResult,
    ) -> Result<IdentityClaims, LoginError> {
        session.user_info = None;
        session.token.clone_from(&result.token);

        let Some(id_token) = result.token.as_ref().and_then(TokenBundle::id_token) else {
            return Err(LoginError::IdTokenNotFound { received: result });
        };

        let decoded = match token::decode_payload(id_token) {
            Ok(claims) => claims,
            Err(cause) => {
                return Err(LoginError::UndecodableClaims {
                    decoded: None,
                    token: result.token.unwrap_or_default(),
                    cause: Some(cause),
                });
            }
        };

        let Some(identity) = identity_from_claims(&decoded) else {
            return Err(LoginError::UndecodableClaims {
                decoded: Some(decoded),
                token: result.token.unwrap_or_default(),
                cause: None,
            });
        };

        if let Some(policy) = &self.policy {
            if let Err(cause) = policy.check_now(&decoded) {
                return Err(LoginError::ClaimsRejected { cause, token: result.token.unwrap_or_default() });
            }
        }

        session.user_info = Some(identity.clone());
        Ok(identity)
    }

    /// Clear the session. Returns the previous token bundle when it should be
    /// revoked remotely, i.e. only with `revoke_on_logout` enabled.
    pub fn logout(&self, session: &mut SessionState) -> Option<TokenBundle> {
        let previous = session.token.take();
        session.clear();
        if self.revoke_on_logout { previous } else { None }
    }
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
