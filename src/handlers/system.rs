// handlers/system.rs - service info and health

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::state::AppState;

pub async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "data": {
            "name": "Inventory API",
            "version": version,
            "description": "Inventory and user management API",
            "endpoints": {
                "health": "/health (public)",
                "inventory": "/api/inventory[/:id] (reads public, writes authenticated)",
                "users": "/api/users[/:id] (owner or admin)",
                "register": "/api/users/register (public)",
                "login": "/api/users/login (public)",
                "me": "/api/users/me (authenticated)",
                "query": "/api/query (inventory operations)",
            }
        }
    }))
}

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();
    let backend = state.store.backend.name();

    match state.store.backend.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": backend
                }
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "data": {
                        "status": "unavailable",
                        "timestamp": now,
                        "database": backend
                    }
                })),
            )
        }
    }
}

/// Fallback for unmatched routes
pub async fn not_found() -> ApiError {
    ApiError::not_found("Route Not Found")
}
