//! Session authentication middleware.

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use crate::api::AppState;
use crate::domain::CurrentUser;
use crate::errors::{AppError, AppResult};

/// Resolve the request's session cookie to a live session.
///
/// Missing, undecodable, unknown and expired sessions all resolve to `None`.
pub async fn resolve_session(state: &AppState, headers: &HeaderMap) -> AppResult<Option<CurrentUser>> {
    let Some(claims) = state.cookies.read(headers) else {
        return Ok(None);
    };

    state
        .auth_service
        .authenticate(claims.sub, &claims.session_token())
        .await
}

/// Require a valid session.
///
/// Injects the `CurrentUser` into the request extensions, or rejects the
/// request with 401.
pub async fn session_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let current_user = resolve_session(&state, request.headers())
        .await?
        .ok_or(AppError::Unauthorized)?;

    request.extensions_mut().insert(current_user);

    Ok(next.run(request).await)
}
