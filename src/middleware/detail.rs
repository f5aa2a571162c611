use axum::response::{IntoResponse, Json, Response};

use crate::error::ApiError;

/// Re-render internal errors with their private detail attached.
/// Only installed in development.
pub async fn expose_error_detail(mut response: Response) -> Response {
    let Some(err) = response.extensions_mut().remove::<ApiError>() else {
        return response;
    };

    match err {
        ApiError::InternalServerError { detail: Some(_), .. } => {
            (response.status(), Json(err.to_json_verbose())).into_response()
        }
        _ => response,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    #[tokio::test]
    async fn adds_detail_to_internal_errors() {
        let response = expose_error_detail(ApiError::internal("disk on fire").into_response()).await;
        assert_eq!(response.status(), 500);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["detail"], "disk on fire");
        assert_eq!(body["status"], "error");
    }

    #[tokio::test]
    async fn leaves_client_errors_alone() {
        let response = expose_error_detail(ApiError::not_found("Item not found").into_response()).await;
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert!(body.get("detail").is_none());
        assert_eq!(body["message"], "Item not found");
    }
}
