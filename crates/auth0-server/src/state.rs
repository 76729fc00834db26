//! Application state for API handlers

use std::sync::Arc;

use auth0_resources::ProviderRegistry;

#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<ProviderRegistry>,
}

impl AppState {
    pub fn new(registry: ProviderRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }
}
