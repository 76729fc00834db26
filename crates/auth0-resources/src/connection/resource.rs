//! `auth0_connection` resource and data source

use async_trait::async_trait;
use serde_json::json;
use tracing::{info, instrument};

use auth0_core::{Auth0Error, ConnectionFilter};

use crate::data::{AttrReader, ResourceData};
use crate::diag::{DiagResult, Diagnostics};
use crate::provider::{ignore_not_found, remove_if_not_found, DataSource, ProviderContext, Resource};
use crate::schema::Schema;

use super::expand::expand_connection;
use super::flatten::flatten_connection;
use super::schema::{connection_data_source_schema, connection_schema};

pub struct ConnectionResource;

#[async_trait]
impl Resource for ConnectionResource {
    fn type_name(&self) -> &'static str {
        "auth0_connection"
    }

    fn schema(&self) -> Schema {
        connection_schema()
    }

    #[instrument(skip_all)]
    async fn create(&self, ctx: &ProviderContext, d: &mut ResourceData) -> DiagResult {
        let request = expand_connection(d, ctx.api.as_ref()).await?;
        let connection = ctx.api.create_connection(&request).await?;

        let id = connection.id()?;
        info!("Created connection {}", id);
        d.set_id(id);

        flatten_connection(d, &connection).into_result()
    }

    #[instrument(skip_all, fields(id = d.id().unwrap_or_default()))]
    async fn read(&self, ctx: &ProviderContext, d: &mut ResourceData) -> DiagResult {
        let id = d.require_id()?.to_string();
        let Some(connection) = remove_if_not_found(d, ctx.api.read_connection(&id).await)? else {
            return Ok(Diagnostics::new());
        };
        flatten_connection(d, &connection).into_result()
    }

    #[instrument(skip_all, fields(id = d.id().unwrap_or_default()))]
    async fn update(&self, ctx: &ProviderContext, d: &mut ResourceData) -> DiagResult {
        let id = d.require_id()?.to_string();
        let request = expand_connection(d, ctx.api.as_ref()).await?;
        let connection = ctx.api.update_connection(&id, &request).await?;
        info!("Updated connection {}", id);

        flatten_connection(d, &connection).into_result()
    }

    #[instrument(skip_all, fields(id = d.id().unwrap_or_default()))]
    async fn delete(&self, ctx: &ProviderContext, d: &mut ResourceData) -> DiagResult {
        let id = d.require_id()?.to_string();
        ignore_not_found(ctx.api.delete_connection(&id).await)
    }
}

/// Look up one connection by ID or by name
pub struct ConnectionDataSource;

#[async_trait]
impl DataSource for ConnectionDataSource {
    fn type_name(&self) -> &'static str {
        "auth0_connection"
    }

    fn schema(&self) -> Schema {
        connection_data_source_schema()
    }

    #[instrument(skip_all)]
    async fn read(&self, ctx: &ProviderContext, d: &mut ResourceData) -> DiagResult {
        let connection = match (d.string("connection_id"), d.string("name")) {
            (Some(id), _) if !id.is_empty() => ctx.api.read_connection(&id).await?,
            (_, Some(name)) if !name.is_empty() => {
                let filter = ConnectionFilter {
                    name: Some(name.clone()),
                    ..Default::default()
                };
                ctx.api
                    .list_connections(&filter)
                    .await?
                    .into_iter()
                    .find(|c| c.name.as_deref() == Some(name.as_str()))
                    .ok_or_else(|| {
                        Auth0Error::not_found("connection", format!("name {:?}", name))
                    })?
            }
            _ => {
                return Err(Auth0Error::invalid_input(
                    "one of \"connection_id\" or \"name\" must be specified",
                )
                .into())
            }
        };

        let id = connection.id()?.to_string();
        d.set_id(id.clone());
        d.set("connection_id", id);
        d.set("enabled_clients", json!(connection.enabled_clients));
        flatten_connection(d, &connection).into_result()
    }
}
