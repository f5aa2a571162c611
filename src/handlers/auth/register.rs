// handlers/auth/register.rs - POST /api/users/register handler

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde_json::Value;
use tracing::info;

use super::Session;
use crate::database::UserView;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::pipeline::{into_object, Resource, UserResource};
use crate::policy::restrict_payload;
use crate::state::AppState;
use crate::validation::{Mode, Shape, UserInput};

/**
 * POST /api/users/register - Create an account and sign in
 *
 * Self-registered accounts always get the `user` role; a `role` field in the
 * body is dropped. A taken email answers 409.
 */
pub async fn register_post(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Session> {
    let Json(payload) = body?;
    let mut payload = into_object(payload)?;
    restrict_payload(None, &mut payload);

    let input = UserInput::validate(&payload, Mode::Create).map_err(ApiError::validation_error)?;
    let new = UserResource::prepare(input, None).await?;
    let user = state.store.users.insert(new).await?;

    let token = state.tokens.issue(user.id, user.role)?;
    info!(user_id = %user.id, "User registered");

    Ok(ApiResponse::created(Session {
        token,
        user: UserView::from(user),
    }))
}
