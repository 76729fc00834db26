//! Enabled clients of a connection
//!
//! The API exposes `enabled_clients` as one replace-whole-list field, so every
//! read-modify-write runs under the connection's entry in the process-wide
//! lock table.

use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, info, instrument};

use auth0_core::{Auth0Error, CompositeId, Connection};

use crate::data::{AttrReader, ResourceData};
use crate::diag::{DiagResult, Diagnostic, Diagnostics};
use crate::provider::{
    ignore_not_found, remove_if_not_found, required_string, ProviderContext, Resource,
};
use crate::schema::{Field, Schema};

fn set_connection_fields(d: &mut ResourceData, connection: &Connection) {
    d.set("name", json!(connection.name));
    d.set("strategy", json!(connection.strategy.map(|s| s.as_str())));
}

// =============================================================================
// One client
// =============================================================================

/// Enables a single client on a connection
pub struct ConnectionClientResource;

#[async_trait]
impl Resource for ConnectionClientResource {
    fn type_name(&self) -> &'static str {
        "auth0_connection_client"
    }

    fn schema(&self) -> Schema {
        Schema::new()
            .field("connection_id", Field::string().required().force_new())
            .field("client_id", Field::string().required().force_new())
            .field("name", Field::string().computed())
            .field("strategy", Field::string().computed())
    }

    #[instrument(skip_all)]
    async fn create(&self, ctx: &ProviderContext, d: &mut ResourceData) -> DiagResult {
        let connection_id = required_string(d, "connection_id")?;
        let client_id = required_string(d, "client_id")?;

        let _guard = ctx.locks.lock(&connection_id).await;

        let connection = ctx.api.read_connection(&connection_id).await?;
        let mut enabled = connection.enabled_clients.clone().unwrap_or_default();
        if !enabled.contains(&client_id) {
            enabled.push(client_id.clone());
        }
        ctx.api
            .update_connection(&connection_id, &Connection::with_enabled_clients(enabled))
            .await?;
        info!("Enabled client {} on connection {}", client_id, connection_id);

        d.set_id(CompositeId::new(&connection_id, &client_id).to_string());
        set_connection_fields(d, &connection);
        Ok(Diagnostics::new())
    }

    #[instrument(skip_all, fields(id = d.id().unwrap_or_default()))]
    async fn read(&self, ctx: &ProviderContext, d: &mut ResourceData) -> DiagResult {
        let (connection_id, client_id) = CompositeId::parse_connection_client(d.require_id()?)?;

        let Some(connection) =
            remove_if_not_found(d, ctx.api.read_connection(connection_id.as_str()).await)?
        else {
            return Ok(Diagnostics::new());
        };

        let enabled = connection.enabled_clients.as_deref().unwrap_or_default();
        if !enabled.iter().any(|c| c == client_id.as_str()) {
            debug!("Client {} is no longer enabled on {}", client_id, connection_id);
            d.clear_id();
            return Ok(Diagnostics::new());
        }

        d.set("connection_id", connection_id.as_str());
        d.set("client_id", client_id.as_str());
        set_connection_fields(d, &connection);
        Ok(Diagnostics::new())
    }

    async fn update(&self, ctx: &ProviderContext, d: &mut ResourceData) -> DiagResult {
        self.read(ctx, d).await
    }

    #[instrument(skip_all, fields(id = d.id().unwrap_or_default()))]
    async fn delete(&self, ctx: &ProviderContext, d: &mut ResourceData) -> DiagResult {
        let (connection_id, client_id) = CompositeId::parse_connection_client(d.require_id()?)?;

        let _guard = ctx.locks.lock(connection_id.as_str()).await;

        let connection = match ctx.api.read_connection(connection_id.as_str()).await {
            Ok(connection) => connection,
            Err(e) if e.is_not_found() => return Ok(Diagnostics::new()),
            Err(e) => return Err(e.into()),
        };

        let enabled = connection.enabled_clients.unwrap_or_default();
        if !enabled.iter().any(|c| c == client_id.as_str()) {
            return Ok(Diagnostics::new());
        }
        let remaining: Vec<String> = enabled
            .into_iter()
            .filter(|c| c != client_id.as_str())
            .collect();

        let result = ctx
            .api
            .update_connection(connection_id.as_str(), &Connection::with_enabled_clients(remaining))
            .await
            .map(|_| ());
        if result.is_ok() {
            info!("Disabled client {} on connection {}", client_id, connection_id);
        }
        ignore_not_found(result)
    }
}

// =============================================================================
// Whole list
// =============================================================================

/// Manages the complete enabled clients list of a connection
pub struct ConnectionClientsResource;

impl ConnectionClientsResource {
    async fn write(
        ctx: &ProviderContext,
        connection_id: &str,
        enabled: Vec<String>,
    ) -> Result<Connection, Auth0Error> {
        ctx.api
            .update_connection(connection_id, &Connection::with_enabled_clients(enabled))
            .await
    }
}

#[async_trait]
impl Resource for ConnectionClientsResource {
    fn type_name(&self) -> &'static str {
        "auth0_connection_clients"
    }

    fn schema(&self) -> Schema {
        Schema::new()
            .field("connection_id", Field::string().required().force_new())
            .field("enabled_clients", Field::set().required())
            .field("name", Field::string().computed())
            .field("strategy", Field::string().computed())
    }

    #[instrument(skip_all)]
    async fn create(&self, ctx: &ProviderContext, d: &mut ResourceData) -> DiagResult {
        let connection_id = required_string(d, "connection_id")?;
        let declared = d.string_list("enabled_clients").unwrap_or_default();

        let _guard = ctx.locks.lock(&connection_id).await;

        let connection = ctx.api.read_connection(&connection_id).await?;
        if connection
            .enabled_clients
            .as_ref()
            .is_some_and(|clients| !clients.is_empty())
        {
            return Err(Diagnostic::error("Connection with non-empty enabled clients")
                .with_detail(format!(
                    "Connection {:?} already has enabled clients. Import the resource with the \
                     connection ID instead of creating it, to avoid overwriting them.",
                    connection_id
                ))
                .into());
        }

        let updated = Self::write(ctx, &connection_id, declared).await?;
        info!("Set enabled clients of connection {}", connection_id);

        d.set_id(connection_id);
        d.set("enabled_clients", json!(updated.enabled_clients));
        set_connection_fields(d, &connection);
        Ok(Diagnostics::new())
    }

    #[instrument(skip_all, fields(id = d.id().unwrap_or_default()))]
    async fn read(&self, ctx: &ProviderContext, d: &mut ResourceData) -> DiagResult {
        let connection_id = d.require_id()?.to_string();
        let Some(connection) = remove_if_not_found(d, ctx.api.read_connection(&connection_id).await)?
        else {
            return Ok(Diagnostics::new());
        };

        d.set("connection_id", connection_id);
        d.set("enabled_clients", json!(connection.enabled_clients.clone().unwrap_or_default()));
        set_connection_fields(d, &connection);
        Ok(Diagnostics::new())
    }

    #[instrument(skip_all, fields(id = d.id().unwrap_or_default()))]
    async fn update(&self, ctx: &ProviderContext, d: &mut ResourceData) -> DiagResult {
        let connection_id = d.require_id()?.to_string();
        let declared = d.string_list("enabled_clients").unwrap_or_default();

        let _guard = ctx.locks.lock(&connection_id).await;
        let updated = Self::write(ctx, &connection_id, declared).await?;

        d.set("enabled_clients", json!(updated.enabled_clients));
        Ok(Diagnostics::new())
    }

    #[instrument(skip_all, fields(id = d.id().unwrap_or_default()))]
    async fn delete(&self, ctx: &ProviderContext, d: &mut ResourceData) -> DiagResult {
        let connection_id = d.require_id()?.to_string();

        let _guard = ctx.locks.lock(&connection_id).await;
        ignore_not_found(Self::write(ctx, &connection_id, Vec::new()).await.map(|_| ()))
    }
}
