// handlers/users.rs - /api/users[/:id]
//
// Listing and creating are admin-only. A user may read, change or remove
// their own record; admins may act on any.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use serde_json::Value;

use crate::database::UserView;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::pipeline::{payload, CrudPipeline, UserResource};
use crate::state::AppState;

fn pipeline(state: &AppState) -> CrudPipeline<UserResource> {
    CrudPipeline::new(&state.store)
}

pub async fn user_list(
    State(state): State<AppState>,
    caller: Option<AuthUser>,
) -> ApiResult<Vec<UserView>> {
    let users = pipeline(&state).list(caller.as_ref()).await?;
    Ok(ApiResponse::list(users))
}

pub async fn user_get(
    State(state): State<AppState>,
    caller: Option<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<UserView> {
    let user = pipeline(&state).get(caller.as_ref(), &id).await?;
    Ok(ApiResponse::success(user))
}

pub async fn user_create(
    State(state): State<AppState>,
    caller: Option<AuthUser>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<UserView> {
    let user = pipeline(&state).create(caller.as_ref(), payload(body)).await?;
    Ok(ApiResponse::created(user))
}

pub async fn user_update(
    State(state): State<AppState>,
    caller: Option<AuthUser>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<UserView> {
    let user = pipeline(&state).update(caller.as_ref(), &id, payload(body)).await?;
    Ok(ApiResponse::success(user))
}

pub async fn user_delete(
    State(state): State<AppState>,
    caller: Option<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    pipeline(&state).delete(caller.as_ref(), &id).await?;
    Ok(ApiResponse::<()>::no_content())
}
