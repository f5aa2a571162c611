// handlers/auth/whoami.rs - GET /api/users/me handler

use axum::extract::State;

use crate::database::UserView;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;

/// Current user, resolved from the bearer token
pub async fn whoami_get(State(state): State<AppState>, caller: AuthUser) -> ApiResult<UserView> {
    let user = state
        .store
        .users
        .find(caller.id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    Ok(ApiResponse::success(UserView::from(user)))
}
