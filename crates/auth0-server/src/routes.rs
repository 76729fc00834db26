//! API route definitions

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Create the full router with application state
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health endpoints
        .route("/health", get(handlers::health_check))
        .route("/health/live", get(handlers::liveness))
        .nest("/v1", v1_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn v1_routes() -> Router<AppState> {
    Router::new()
        .route("/schemas", get(handlers::schemas::list_schemas))
        .route(
            "/resources/{type_name}/{operation}",
            post(handlers::resources::apply_operation),
        )
        .route(
            "/data-sources/{type_name}/read",
            post(handlers::data_sources::read_data_source),
        )
}
