//! Registration page handlers.

use axum::{
    extract::{rejection::FormRejection, State},
    http::{header::SET_COOKIE, HeaderMap},
    response::{Html, IntoResponse, Json, Redirect, Response},
    routing::{get, post},
    Form, Router,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::api::middleware::resolve_session;
use crate::api::AppState;
use crate::config::AUTHENTICATED_REDIRECT_PATH;
use crate::domain::{form_hints, RegisterForm};
use crate::errors::{AppError, AppResult};
use crate::utils::templates;

/// Password fields submitted for live hints
#[derive(Deserialize, ToSchema)]
pub struct HintsForm {
    #[serde(default)]
    pub password: String,
    #[serde(default, rename = "confirm-password")]
    pub confirm_password: String,
}

impl std::fmt::Debug for HintsForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HintsForm").finish_non_exhaustive()
    }
}

/// Outstanding password requirements
#[derive(Debug, Serialize, ToSchema)]
pub struct HintsResponse {
    #[schema(example = json!(["Include at least one number."]))]
    pub hints: Vec<String>,
}

/// Create registration routes
pub fn register_routes() -> Router<AppState> {
    Router::new()
        .route("/register", get(register_page).post(register))
        .route("/register/hints", post(password_hints))
}

/// Show the registration form, or skip it for signed-in visitors
#[utoipa::path(
    get,
    path = "/register",
    tag = "Registration",
    responses(
        (status = 200, description = "Registration form"),
        (status = 303, description = "Already signed in, redirected to /")
    )
)]
pub async fn register_page(State(state): State<AppState>, headers: HeaderMap) -> AppResult<Response> {
    if let Some(current) = resolve_session(&state, &headers).await? {
        tracing::debug!(user_id = %current.user_id, "Signed-in visitor skipped registration");
        return Ok(Redirect::to(AUTHENTICATED_REDIRECT_PATH).into_response());
    }

    Ok(Html(templates::register_page()).into_response())
}

/// Register a new account and sign it in
#[utoipa::path(
    post,
    path = "/register",
    tag = "Registration",
    request_body(content = RegisterForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Account created, session cookie set"),
        (status = 400, description = "Validation error"),
        (status = 500, description = "Account could not be created")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    form: Result<Form<RegisterForm>, FormRejection>,
) -> AppResult<Response> {
    let Form(form) = form.map_err(|e| AppError::bad_request(e.body_text()))?;

    let issued = state.auth_service.register(form).await?;
    let cookie = state
        .cookies
        .set_cookie_header(issued.user.id, &issued.token, issued.expires_at)?;

    Ok((
        [(SET_COOKIE, cookie)],
        Redirect::to(AUTHENTICATED_REDIRECT_PATH),
    )
        .into_response())
}

/// Password requirements the current input still misses
#[utoipa::path(
    post,
    path = "/register/hints",
    tag = "Registration",
    request_body(content = HintsForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Outstanding hints", body = HintsResponse)
    )
)]
pub async fn password_hints(
    form: Result<Form<HintsForm>, FormRejection>,
) -> AppResult<Json<HintsResponse>> {
    let Form(form) = form.map_err(|e| AppError::bad_request(e.body_text()))?;

    Ok(Json(HintsResponse {
        hints: form_hints(&form.password, &form.confirm_password),
    }))
}
