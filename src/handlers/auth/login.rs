// handlers/auth/login.rs - POST /api/users/login handler

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde_json::Value;
use tracing::{info, warn};

use super::Session;
use crate::auth::{password::verify_password_blocking, AuthError};
use crate::database::UserView;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::pipeline::into_object;
use crate::state::AppState;
use crate::validation::{Credentials, Mode, Shape};

/**
 * POST /api/users/login - Exchange email and password for a token
 *
 * An unknown email and a wrong password give the same 401 and take the same
 * time, so the response never reveals whether an account exists.
 */
pub async fn login_post(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Session> {
    let Json(payload) = body?;
    let payload = into_object(payload)?;
    let credentials = Credentials::validate(&payload, Mode::Create).map_err(ApiError::validation_error)?;

    let user = state.store.directory.find_by_email(&credentials.email).await?;
    let hash = user.as_ref().map(|u| u.password_hash.clone());

    if !verify_password_blocking(credentials.password, hash).await {
        warn!("Failed login attempt");
        return Err(AuthError::InvalidCredentials.into());
    }
    let user = user.ok_or(AuthError::InvalidCredentials)?;

    let token = state.tokens.issue(user.id, user.role)?;
    info!(user_id = %user.id, "User logged in");

    Ok(ApiResponse::success(Session {
        token,
        user: UserView::from(user),
    }))
}
