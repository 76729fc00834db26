//! Schema listing

use axum::{extract::State, Json};

use auth0_resources::ProviderSchema;

use crate::state::AppState;

/// Schemas of every resource and data source type
pub async fn list_schemas(State(state): State<AppState>) -> Json<ProviderSchema> {
    Json(state.registry.schemas())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::test_support::offline_state;

    #[tokio::test]
    async fn test_schema_marks_sensitive_and_immutable_fields() {
        let Json(schemas) = list_schemas(State(offline_state())).await;
        let body = serde_json::to_value(&schemas).unwrap();

        let connection = &body["resources"]["auth0_connection"]["fields"];
        assert_eq!(connection["strategy"]["force_new"], true);
        assert_eq!(connection["name"]["required"], true);

        let verification = &body["resources"]["auth0_custom_domain_verification"]["fields"];
        assert_eq!(verification["cname_api_key"]["sensitive"], true);

        assert!(body["data_sources"]["auth0_signing_keys"].is_object());
    }
}
