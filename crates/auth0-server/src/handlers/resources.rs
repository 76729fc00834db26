//! Resource operation handlers

use axum::{
    extract::{Path, State},
    Json,
};
use tracing::info;

use auth0_resources::{Operation, ResourceRequest, ResourceResponse};

use super::{bad_request, not_found, HandlerError};
use crate::state::AppState;

/// Run `operation` on a resource of type `type_name`.
///
/// Provider failures are reported as diagnostics in a 200 response; only an
/// unknown operation (400) or type (404) is rejected.
pub async fn apply_operation(
    State(state): State<AppState>,
    Path((type_name, operation)): Path<(String, String)>,
    Json(request): Json<ResourceRequest>,
) -> Result<Json<ResourceResponse>, HandlerError> {
    let operation: Operation = operation.parse().map_err(bad_request)?;
    state.registry.resource(&type_name).map_err(not_found)?;

    info!("{} {}", operation, type_name);
    let response = state.registry.apply(&type_name, operation, request).await;
    Ok(Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::handlers::test_support::offline_state;

    fn body(value: serde_json::Value) -> Json<ResourceRequest> {
        Json(serde_json::from_value(value).unwrap())
    }

    #[tokio::test]
    async fn test_unknown_operation_is_bad_request() {
        let result = apply_operation(
            State(offline_state()),
            Path(("auth0_connection".to_string(), "upsert".to_string())),
            body(json!({})),
        )
        .await;
        let (status, Json(error)) = result.unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(error.message.contains("upsert"));
    }

    #[tokio::test]
    async fn test_unknown_type_is_not_found() {
        let result = apply_operation(
            State(offline_state()),
            Path(("auth0_widget".to_string(), "read".to_string())),
            body(json!({ "id": "w_1" })),
        )
        .await;
        let (status, _) = result.unwrap_err();
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_validation_failure_is_reported_as_diagnostics() {
        let Json(response) = apply_operation(
            State(offline_state()),
            Path(("auth0_connection".to_string(), "create".to_string())),
            body(json!({ "config": { "name": "users", "strategy": "myspace" } })),
        )
        .await
        .unwrap();

        assert!(response.id.is_none());
        assert!(response.diagnostics.has_error());
    }
}
