//! Account handlers for signed-in users.

use axum::{
    extract::{Extension, State},
    response::Json,
    routing::get,
    Router,
};

use crate::api::AppState;
use crate::domain::{CurrentUser, UserResponse};
use crate::errors::AppResult;

/// Create account routes. Expects the session middleware to be layered on.
pub fn account_routes() -> Router<AppState> {
    Router::new().route("/me", get(get_current_user))
}

/// Get the signed-in user
#[utoipa::path(
    get,
    path = "/me",
    tag = "Account",
    security(("session_cookie" = [])),
    responses(
        (status = 200, description = "Current user profile", body = UserResponse),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn get_current_user(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
) -> AppResult<Json<UserResponse>> {
    let user = state.auth_service.current_user(&current_user).await?;

    Ok(Json(UserResponse::from(user)))
}
