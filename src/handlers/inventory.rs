// handlers/inventory.rs - /api/inventory[/:id]
//
// Reads are public; writes need any authenticated caller.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use serde_json::Value;

use crate::database::InventoryItem;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::pipeline::{payload, CrudPipeline, InventoryResource};
use crate::state::AppState;

fn pipeline(state: &AppState) -> CrudPipeline<InventoryResource> {
    CrudPipeline::new(&state.store)
}

/// GET /api/inventory - all items, newest first
pub async fn inventory_list(
    State(state): State<AppState>,
    caller: Option<AuthUser>,
) -> ApiResult<Vec<InventoryItem>> {
    let items = pipeline(&state).list(caller.as_ref()).await?;
    Ok(ApiResponse::list(items))
}

/// GET /api/inventory/:id
pub async fn inventory_get(
    State(state): State<AppState>,
    caller: Option<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<InventoryItem> {
    let item = pipeline(&state).get(caller.as_ref(), &id).await?;
    Ok(ApiResponse::success(item))
}

/// POST /api/inventory
pub async fn inventory_create(
    State(state): State<AppState>,
    caller: Option<AuthUser>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<InventoryItem> {
    let item = pipeline(&state).create(caller.as_ref(), payload(body)).await?;
    Ok(ApiResponse::created(item))
}

/// PUT /api/inventory/:id - partial payloads are merged over the stored item
pub async fn inventory_update(
    State(state): State<AppState>,
    caller: Option<AuthUser>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<InventoryItem> {
    let item = pipeline(&state).update(caller.as_ref(), &id, payload(body)).await?;
    Ok(ApiResponse::success(item))
}

/// DELETE /api/inventory/:id
pub async fn inventory_delete(
    State(state): State<AppState>,
    caller: Option<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    pipeline(&state).delete(caller.as_ref(), &id).await?;
    Ok(ApiResponse::<()>::no_content())
}
