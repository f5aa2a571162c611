// handlers/ops.rs - POST /api/query
//
// Named query and mutation operations over inventory, dispatched to the same
// pipeline the REST routes use. Request:
//
//   { "operation": "updateInventory", "variables": { "id": "...", "quantity": 4 } }
//
// Response data is keyed by the operation name.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::pipeline::{CrudPipeline, InventoryResource};
use crate::state::AppState;
use crate::types::Operation;

pub const OPERATIONS: &[&str] = &["inventory", "inventories", "addInventory", "updateInventory"];

#[derive(Debug, Deserialize)]
pub struct OperationRequest {
    pub operation: String,
    #[serde(default)]
    pub variables: Map<String, Value>,
}

fn take_id(variables: &mut Map<String, Value>) -> Result<String, ApiError> {
    match variables.remove("id") {
        Some(Value::String(id)) => Ok(id),
        _ => Err(ApiError::bad_request("Variable 'id' is required")),
    }
}

fn to_data<T: Serialize>(value: T) -> Result<Value, ApiError> {
    serde_json::to_value(value).map_err(|e| ApiError::internal(format!("Failed to serialize result: {}", e)))
}

pub async fn query_post(
    State(state): State<AppState>,
    caller: Option<AuthUser>,
    body: Result<Json<OperationRequest>, JsonRejection>,
) -> ApiResult<Value> {
    let Json(OperationRequest { operation, mut variables }) = body?;
    let pipeline = CrudPipeline::<InventoryResource>::new(&state.store);
    let caller = caller.as_ref();

    let result = match operation.as_str() {
        "inventory" => {
            let id = take_id(&mut variables)?;
            to_data(pipeline.get(caller, &id).await?)?
        }
        "inventories" => to_data(pipeline.list(caller).await?)?,
        "addInventory" => to_data(pipeline.create(caller, Ok(Value::Object(variables))).await?)?,
        "updateInventory" => {
            CrudPipeline::<InventoryResource>::authenticate(caller, Operation::Update)?;
            let id = take_id(&mut variables)?;
            to_data(pipeline.update(caller, &id, Ok(Value::Object(variables))).await?)?
        }
        other => {
            return Err(ApiError::bad_request(format!(
                "Unknown operation '{}'. Expected one of: {}",
                other,
                OPERATIONS.join(", ")
            )))
        }
    };

    let mut data = Map::new();
    data.insert(operation, result);
    Ok(ApiResponse::success(Value::Object(data)))
}
