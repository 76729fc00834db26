//! Data source handlers

use axum::{
    extract::{Path, State},
    Json,
};
use tracing::info;

use auth0_resources::{ResourceRequest, ResourceResponse};

use super::{not_found, HandlerError};
use crate::state::AppState;

pub async fn read_data_source(
    State(state): State<AppState>,
    Path(type_name): Path<String>,
    Json(request): Json<ResourceRequest>,
) -> Result<Json<ResourceResponse>, HandlerError> {
    state.registry.data_source(&type_name).map_err(not_found)?;

    info!("read data source {}", type_name);
    Ok(Json(state.registry.read_data_source(&type_name, request).await))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    use crate::handlers::test_support::offline_state;

    #[tokio::test]
    async fn test_connection_lookup_requires_id_or_name() {
        let Json(response) = read_data_source(
            State(offline_state()),
            Path("auth0_connection".to_string()),
            Json(serde_json::from_value(json!({ "config": {} })).unwrap()),
        )
        .await
        .unwrap();
        assert!(response.diagnostics.has_error());
        assert!(response.state.is_none());
    }
}
