pub mod auth;
pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod pipeline;
pub mod policy;
pub mod state;
pub mod types;
pub mod validation;

use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    middleware::{from_fn_with_state, map_response},
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::handlers::{auth as session, inventory, ops, system, users};

pub use error::ApiError;
pub use state::AppState;

/// Build the full application router
pub fn app(state: AppState) -> Router {
    let config = state.config.clone();

    let mut router = Router::new()
        // Public
        .route("/", get(system::root))
        .route("/health", get(system::health))
        .merge(inventory_routes())
        .merge(user_routes())
        .route("/api/query", post(ops::query_post))
        .fallback(system::not_found)
        // Global middleware
        .layer(from_fn_with_state(state.clone(), middleware::authenticate))
        .layer(DefaultBodyLimit::max(config.api.max_request_size_bytes))
        .layer(cors_layer(&config));

    if config.api.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }
    if config.is_development() {
        router = router.layer(map_response(middleware::expose_error_detail));
    }

    router.with_state(state)
}

fn inventory_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/inventory",
            get(inventory::inventory_list).post(inventory::inventory_create),
        )
        .route(
            "/api/inventory/:id",
            get(inventory::inventory_get)
                .put(inventory::inventory_update)
                .delete(inventory::inventory_delete),
        )
}

fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/api/users", get(users::user_list).post(users::user_create))
        .route("/api/users/register", post(session::register_post))
        .route("/api/users/login", post(session::login_post))
        .route("/api/users/me", get(session::whoami_get))
        .route(
            "/api/users/:id",
            get(users::user_get)
                .put(users::user_update)
                .delete(users::user_delete),
        )
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    let origins = &config.security.cors_origins;
    if origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods(Any)
        .allow_headers(Any)
}
