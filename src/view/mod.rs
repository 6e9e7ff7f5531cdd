//! HTML rendering for the two screens.
//!
//! DESIGN
//! ======
//! Rendering is a pure function of `SessionState` plus an optional inline
//! login failure: logged out renders "Login Required", logged in renders the
//! dashboard. Templates are compiled into the binary and auto-escaped.

use minijinja::{Environment, UndefinedBehavior, context};
use serde::Serialize;
use serde_json::Value;

use crate::services::auth::LoginError;
use crate::services::oauth::LOGIN_ICON;
use crate::services::session::{IdentityClaims, SessionState};

pub const APP_TITLE: &str = "The Gavel ⚖️";
pub const LOGIN_PATH: &str = "/auth/google";
pub const LOGOUT_PATH: &str = "/logout";

const BASE_TEMPLATE: &str = include_str!("../../templates/base.html");
const LOGIN_TEMPLATE: &str = include_str!("../../templates/login.html");
const DASHBOARD_TEMPLATE: &str = include_str!("../../templates/dashboard.html");

#[derive(Debug, thiserror::Error)]
pub enum ViewError {
    #[error("template error: {0}")]
    Template(#[from] minijinja::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// One labelled JSON block shown under a failure message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailureDetail {
    pub label: String,
    pub json: String,
}

/// Login error as shown on the "Login Required" screen.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoginFailure {
    pub message: String,
    pub details: Vec<FailureDetail>,
}

impl LoginFailure {
    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        Self { message: message.into(), details: Vec::new() }
    }

    /// Attach a pretty-printed JSON block.
    #[must_use]
    pub fn with_json(mut self, label: &str, value: &impl Serialize) -> Self {
        let json = serde_json::to_string_pretty(value).unwrap_or_else(|e| format!("<unprintable: {e}>"));
        self.details.push(FailureDetail { label: label.to_owned(), json });
        self
    }
}

impl From<&LoginError> for LoginFailure {
    fn from(err: &LoginError) -> Self {
        let failure = Self::message(err.to_string());
        match err {
            LoginError::IdTokenNotFound { received } => failure.with_json("Received data:", received),
            LoginError::UndecodableClaims { decoded, token, cause } => {
                let decoded = decoded.clone().map_or(Value::Object(serde_json::Map::new()), Value::Object);
                let failure = match cause {
                    Some(cause) => Self { message: format!("{} ({cause})", failure.message), ..failure },
                    None => failure,
                };
                failure
                    .with_json("Decoded Payload:", &decoded)
                    .with_json("Raw Token Data:", token)
            }
            LoginError::ClaimsRejected { token, .. } => failure.with_json("Raw Token Data:", token),
        }
    }
}

/// Compiled template set, built once at startup.
pub struct Views {
    env: Environment<'static>,
}

impl Views {
    /// Compile the embedded templates.
    ///
    /// # Errors
    ///
    /// Returns [`ViewError::Template`] if a template fails to parse.
    pub fn new() -> Result<Self, ViewError> {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.add_template("base.html", BASE_TEMPLATE)?;
        env.add_template("login.html", LOGIN_TEMPLATE)?;
        env.add_template("dashboard.html", DASHBOARD_TEMPLATE)?;
        Ok(Self { env })
    }

    /// Render the screen for `session`. `failure` is only shown when logged out.
    ///
    /// # Errors
    ///
    /// Returns a [`ViewError`] if rendering fails.
    pub fn render(&self, session: &SessionState, failure: Option<&LoginFailure>) -> Result<String, ViewError> {
        match &session.user_info {
            Some(identity) => self.render_dashboard(identity),
            None => self.render_login(failure),
        }
    }

    fn render_login(&self, failure: Option<&LoginFailure>) -> Result<String, ViewError> {
        let html = self.env.get_template("login.html")?.render(context! {
            app_title => APP_TITLE,
            login_url => LOGIN_PATH,
            login_icon => LOGIN_ICON,
            failure => failure,
        })?;
        Ok(html)
    }

    fn render_dashboard(&self, identity: &IdentityClaims) -> Result<String, ViewError> {
        let user_info = serde_json::to_string_pretty(identity)?;
        let html = self.env.get_template("dashboard.html")?.render(context! {
            app_title => APP_TITLE,
            logout_url => LOGOUT_PATH,
            email => identity.email,
            name => identity.display_name(),
            picture => identity.picture,
            user_info => user_info,
        })?;
        Ok(html)
    }
}

#[cfg(test)]
#[path = "view_test.rs"]
mod tests;
