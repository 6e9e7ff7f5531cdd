//! Index route: the "Login Required" or "Dashboard" screen.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::CookieJar;

use super::auth::{self, CallbackQuery};
use crate::services::session::SessionState;
use crate::state::AppState;
use crate::view::LoginFailure;

/// Render the screen for `session` with `status`.
pub(crate) fn render_page(
    state: &AppState,
    session: &SessionState,
    failure: Option<&LoginFailure>,
    status: StatusCode,
) -> Response {
    match state.views.render(session, failure) {
        Ok(html) => (status, Html(html)).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "page render failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to render page").into_response()
        }
    }
}

/// `GET /` — render the current screen, completing a login first when the
/// provider has just redirected back here.
pub async fn index(State(state): State<AppState>, jar: CookieJar, Query(params): Query<CallbackQuery>) -> Response {
    let session = match auth::session_id(&jar) {
        Some(id) => state.sessions.load(&id).await,
        None => SessionState::default(),
    };

    if params.is_callback() {
        // Already signed in: drop the stale callback parameters.
        if session.is_logged_in() {
            let jar = jar.add(auth::expired_cookie(auth::OAUTH_STATE_COOKIE_NAME, state.cookie_secure));
            return (jar, Redirect::to("/")).into_response();
        }
        return auth::complete_callback(&state, jar, params).await;
    }

    render_page(&state, &session, None, StatusCode::OK)
}

#[cfg(test)]
#[path = "dashboard_test.rs"]
mod tests;
