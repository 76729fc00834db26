//! Auth0 Resource Provider - HTTP host

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod config;
mod handlers;
mod routes;
mod state;

use auth0_management::{ManagementClient, ManagementConfig};
use auth0_resources::{ProviderContext, ProviderRegistry};
use config::{Auth0Settings, Settings};
use state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    init_tracing();

    let settings = Settings::load().context("Failed to load configuration")?;

    info!(
        "Starting Auth0 resource provider v{}",
        env!("CARGO_PKG_VERSION")
    );

    let management = management_config(&settings.auth0)?;
    info!("Managing tenant at {}", management.base_url);
    let client = ManagementClient::new(management).context("Failed to build Management API client")?;

    let registry = ProviderRegistry::new(ProviderContext::new(Arc::new(client)));
    info!(
        "Registered {} resource types and {} data source types",
        registry.resource_types().count(),
        registry.data_source_types().count()
    );

    let app = routes::create_router(AppState::new(registry));

    let addr: SocketAddr = format!("{}:{}", settings.server.host, settings.server.port)
        .parse()
        .context("Invalid server address")?;

    info!("Server listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("info,auth0_resources=debug,auth0_management=debug,tower_http=debug")
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(true))
        .init();
}

fn management_config(settings: &Auth0Settings) -> Result<ManagementConfig> {
    let mut config = ManagementConfig::from_arguments(
        settings.domain.as_deref(),
        settings.base_url.as_deref(),
        settings.api_token.as_deref(),
        settings.client_id.as_deref(),
        settings.client_secret.as_deref(),
        settings.audience.as_deref(),
    )
    .context("Invalid Auth0 provider arguments")?;

    config.timeout_secs = settings.timeout_secs;
    config.max_retries = settings.max_retries;
    config.debug = settings.debug;
    Ok(config)
}
