//! API request handlers

pub mod data_sources;
pub mod health;
pub mod resources;
pub mod schemas;

use axum::{http::StatusCode, Json};
use serde::Serialize;

use auth0_core::Auth0Error;

pub use health::{health_check, liveness};

/// Body of requests rejected before reaching the provider
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: &'static str,
    pub message: String,
}

pub type HandlerError = (StatusCode, Json<ApiError>);

pub fn bad_request(e: Auth0Error) -> HandlerError {
    (
        StatusCode::BAD_REQUEST,
        Json(ApiError {
            code: "invalid_request",
            message: e.to_string(),
        }),
    )
}

pub fn not_found(e: Auth0Error) -> HandlerError {
    (
        StatusCode::NOT_FOUND,
        Json(ApiError {
            code: "unknown_type",
            message: e.to_string(),
        }),
    )
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use auth0_management::{ManagementClient, ManagementConfig};
    use auth0_resources::{ProviderContext, ProviderRegistry};

    use crate::state::AppState;

    /// State whose client points at an address nothing listens on
    pub fn offline_state() -> AppState {
        let client =
            ManagementClient::new(ManagementConfig::with_token("http://127.0.0.1:9", "unused")).unwrap();
        AppState::new(ProviderRegistry::new(ProviderContext::new(Arc::new(client))))
    }
}
