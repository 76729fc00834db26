//! Health check handlers

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use std::time::Instant;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub resource_types: usize,
    pub data_source_types: usize,
}

#[derive(Serialize)]
pub struct SimpleHealthResponse {
    pub status: String,
}

/// Start time for uptime calculation
static START_TIME: std::sync::OnceLock<Instant> = std::sync::OnceLock::new();

fn get_uptime_seconds() -> u64 {
    let start = START_TIME.get_or_init(Instant::now);
    start.elapsed().as_secs()
}

/// Process status with the number of registered types.
///
/// The Management API is not contacted; credentials are exercised by the
/// first resource operation.
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let response = HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: get_uptime_seconds(),
        resource_types: state.registry.resource_types().count(),
        data_source_types: state.registry.data_source_types().count(),
    };
    (StatusCode::OK, Json(response))
}

/// Liveness probe
pub async fn liveness() -> (StatusCode, Json<SimpleHealthResponse>) {
    (
        StatusCode::OK,
        Json(SimpleHealthResponse {
            status: "alive".to_string(),
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::test_support::offline_state;

    #[tokio::test]
    async fn test_health_reports_registered_types() {
        let (status, Json(body)) = health_check(State(offline_state())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.status, "healthy");
        assert_eq!(body.resource_types, 10);
        assert_eq!(body.data_source_types, 4);
    }

    #[tokio::test]
    async fn test_liveness() {
        let (status, Json(body)) = liveness().await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.status, "alive");
    }
}
