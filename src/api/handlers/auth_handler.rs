//! Sign-in and sign-out handlers.

use axum::{
    extract::State,
    http::{header::SET_COOKIE, HeaderMap},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Deserializer};
use utoipa::ToSchema;
use validator::Validate;

use crate::api::extractors::ValidatedForm;
use crate::api::middleware::resolve_session;
use crate::api::AppState;
use crate::config::{AUTHENTICATED_REDIRECT_PATH, SIGNED_OUT_REDIRECT_PATH};
use crate::errors::AppResult;
use crate::utils::templates;

/// User login form
#[derive(Deserialize, Validate, ToSchema)]
pub struct LoginForm {
    /// User email address
    #[serde(default, deserialize_with = "trimmed")]
    #[validate(email(message = "Email address is invalid."))]
    #[schema(example = "user@example.com")]
    pub email: String,
    /// User password
    #[serde(default)]
    #[validate(length(min = 1, message = "Password is required."))]
    #[schema(example = "SecurePass123")]
    pub password: String,
}

impl std::fmt::Debug for LoginForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginForm")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

/// Surrounding whitespace is dropped before validation, as at registration.
fn trimmed<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    String::deserialize(deserializer).map(|value| value.trim().to_string())
}

/// Create sign-in routes
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(login_page).post(login))
        .route("/logout", post(logout))
}

/// Show the sign-in form
#[utoipa::path(
    get,
    path = "/login",
    tag = "Authentication",
    responses(
        (status = 200, description = "Sign-in form"),
        (status = 303, description = "Already signed in, redirected to /")
    )
)]
pub async fn login_page(State(state): State<AppState>, headers: HeaderMap) -> AppResult<Response> {
    if resolve_session(&state, &headers).await?.is_some() {
        return Ok(Redirect::to(AUTHENTICATED_REDIRECT_PATH).into_response());
    }

    Ok(Html(templates::login_page()).into_response())
}

/// Sign in with email and password
#[utoipa::path(
    post,
    path = "/login",
    tag = "Authentication",
    request_body(content = LoginForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Signed in, session cookie set"),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    ValidatedForm(form): ValidatedForm<LoginForm>,
) -> AppResult<Response> {
    let issued = state.auth_service.login(form.email, form.password).await?;
    let cookie = state
        .cookies
        .set_cookie_header(issued.user.id, &issued.token, issued.expires_at)?;

    Ok((
        [(SET_COOKIE, cookie)],
        Redirect::to(AUTHENTICATED_REDIRECT_PATH),
    )
        .into_response())
}

/// End the current session and clear the cookie
#[utoipa::path(
    post,
    path = "/logout",
    tag = "Authentication",
    responses(
        (status = 303, description = "Signed out, redirected to /register")
    )
)]
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> AppResult<Response> {
    if let Some(claims) = state.cookies.read(&headers) {
        state.auth_service.logout(&claims.session_token()).await?;
    }

    let cookie = state.cookies.clear_cookie_header()?;

    Ok(([(SET_COOKIE, cookie)], Redirect::to(SIGNED_OUT_REDIRECT_PATH)).into_response())
}
