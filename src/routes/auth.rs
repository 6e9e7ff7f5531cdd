//! Auth routes — Google OAuth redirect, callback completion, logout.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use time::Duration;

use super::dashboard::render_page;
use crate::services::session::{self, SessionState, TokenBundle};
use crate::state::AppState;
use crate::view::LoginFailure;

pub(crate) const SESSION_COOKIE_NAME: &str = "gavel_session";
pub(crate) const OAUTH_STATE_COOKIE_NAME: &str = "oauth_state";

fn build_cookie(name: &'static str, value: String, secure: bool) -> Cookie<'static> {
    Cookie::build((name, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .build()
}

fn session_cookie(sid: String, secure: bool) -> Cookie<'static> {
    let mut cookie = build_cookie(SESSION_COOKIE_NAME, sid, secure);
    cookie.set_max_age(session::SESSION_IDLE_TTL);
    cookie
}

pub(crate) fn expired_cookie(name: &'static str, secure: bool) -> Cookie<'static> {
    let mut cookie = build_cookie(name, String::new(), secure);
    cookie.set_max_age(Duration::ZERO);
    cookie
}

/// Browser session id from the session cookie, if any.
pub(crate) fn session_id(jar: &CookieJar) -> Option<String> {
    jar.get(SESSION_COOKIE_NAME)
        .map(Cookie::value)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
}

/// Query parameters Google appends when redirecting back to `/`.
#[derive(Debug, Default, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

impl CallbackQuery {
    #[must_use]
    pub fn is_callback(&self) -> bool {
        self.code.is_some() || self.error.is_some()
    }
}

// =============================================================================
// HANDLERS
// =============================================================================

/// `GET /auth/google` — ensure a session cookie, set the CSRF state cookie
/// and redirect to Google's authorization page.
pub async fn login(State(state): State<AppState>, jar: CookieJar) -> Response {
    let oauth_state = session::generate_token();
    let url = match state.oauth.authorize_url(&oauth_state) {
        Ok(url) => url,
        Err(e) => {
            tracing::error!(error = %e, "authorize url build failed");
            return (StatusCode::INTERNAL_SERVER_ERROR, "OAuth not configured").into_response();
        }
    };

    let sid = session_id(&jar).unwrap_or_else(session::generate_token);
    let mut state_cookie = build_cookie(OAUTH_STATE_COOKIE_NAME, oauth_state, state.cookie_secure);
    state_cookie.set_max_age(Duration::minutes(10));

    let jar = jar
        .add(session_cookie(sid, state.cookie_secure))
        .add(state_cookie);
    (jar, Redirect::temporary(&url)).into_response()
}

/// Finish the authorization round trip for a logged-out session.
///
/// Every failure is rendered inline on the login screen; only a successful
/// login redirects (back to `/`, which then shows the dashboard).
pub(crate) async fn complete_callback(state: &AppState, jar: CookieJar, params: CallbackQuery) -> Response {
    let secure = state.cookie_secure;
    let sid = session_id(&jar).unwrap_or_else(session::generate_token);
    let expected_state = jar
        .get(OAUTH_STATE_COOKIE_NAME)
        .map(Cookie::value)
        .unwrap_or_default()
        .to_owned();
    let jar = jar
        .add(session_cookie(sid.clone(), secure))
        .add(expired_cookie(OAUTH_STATE_COOKIE_NAME, secure));
    let logged_out = SessionState::default();

    if let Some(error) = params.error {
        tracing::warn!(%error, "authorization denied by provider");
        let detail = params.error_description.map(|d| format!(": {d}")).unwrap_or_default();
        let failure = LoginFailure::message(format!("Authorization failed ({error}){detail}"));
        return (jar, render_page(state, &logged_out, Some(&failure), StatusCode::BAD_REQUEST)).into_response();
    }

    // Verify OAuth CSRF state from cookie.
    let callback_state = params.state.unwrap_or_default();
    if expected_state.is_empty() || expected_state != callback_state {
        tracing::warn!("oauth state mismatch");
        let failure = LoginFailure::message("Invalid OAuth state. Please try logging in again.");
        return (jar, render_page(state, &logged_out, Some(&failure), StatusCode::UNAUTHORIZED)).into_response();
    }

    let code = params.code.unwrap_or_default();
    let result = match state.oauth.exchange_code(&code).await {
        Ok(result) => result,
        Err(e) => {
            tracing::error!(error = %e, "oauth code exchange failed");
            let failure = LoginFailure::message(e.to_string());
            return (jar, render_page(state, &logged_out, Some(&failure), StatusCode::BAD_GATEWAY)).into_response();
        }
    };

    let (outcome, session) = state
        .sessions
        .update(&sid, |session| (state.flow.complete_login(session, result), session.clone()))
        .await;

    match outcome {
        Ok(_) => {
            tracing::info!("login complete");
            (jar, Redirect::to("/")).into_response()
        }
        Err(e) => {
            tracing::warn!(error = %e, "login incomplete");
            let failure = LoginFailure::from(&e);
            (jar, render_page(state, &session, Some(&failure), StatusCode::OK)).into_response()
        }
    }
}

/// `POST /logout` — clear session state, expire the cookie, back to `/`.
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> Response {
    if let Some(sid) = session_id(&jar) {
        let to_revoke = state.sessions.update(&sid, |session| state.flow.logout(session)).await;

        if let Some(token) = to_revoke.as_ref().and_then(TokenBundle::access_token) {
            if let Err(e) = state.oauth.revoke(token).await {
                tracing::warn!(error = %e, "token revocation failed");
            }
        }
    }

    let jar = jar.add(expired_cookie(SESSION_COOKIE_NAME, state.cookie_secure));
    (jar, Redirect::to("/")).into_response()
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
