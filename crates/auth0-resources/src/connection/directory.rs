//! `auth0_connection_directory`: directory provisioning of a connection

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{info, instrument};

use auth0_core::{DirectoryMapping, DirectoryProvisioning};

use crate::data::{AttrReader, ResourceData};
use crate::diag::{DiagResult, Diagnostics};
use crate::provider::{
    ignore_not_found, remove_if_not_found, required_string, ProviderContext, Resource,
};
use crate::schema::{Field, Schema, Validator};

pub struct ConnectionDirectoryResource;

fn expand_directory(d: &ResourceData) -> DirectoryProvisioning {
    let mapping = d.is_set("mapping").then(|| {
        let mut mapping: Vec<DirectoryMapping> = d
            .blocks("mapping")
            .iter()
            .map(|b| DirectoryMapping {
                auth0: b.string("auth0").unwrap_or_default(),
                idp: b.string("idp").unwrap_or_default(),
            })
            .collect();
        mapping.sort();
        mapping
    });
    DirectoryProvisioning::request(mapping, d.bool("synchronize_automatically"))
}

fn flatten_directory(d: &mut ResourceData, directory: &DirectoryProvisioning) {
    let mapping: Value = match &directory.mapping {
        Some(mapping) => mapping
            .iter()
            .map(|m| json!({ "auth0": m.auth0, "idp": m.idp }))
            .collect(),
        None => Value::Null,
    };
    d.set("connection_name", json!(directory.connection_name));
    d.set("strategy", json!(directory.strategy));
    d.set("mapping", mapping);
    d.set("synchronize_automatically", json!(directory.synchronize_automatically));
    d.set("created_at", json!(directory.created_at));
    d.set("updated_at", json!(directory.updated_at));
    d.set("last_synchronization_at", json!(directory.last_synchronization_at));
    d.set("last_synchronization_status", json!(directory.last_synchronization_status));
    d.set("last_synchronization_error", json!(directory.last_synchronization_error));
}

#[async_trait]
impl Resource for ConnectionDirectoryResource {
    fn type_name(&self) -> &'static str {
        "auth0_connection_directory"
    }

    fn schema(&self) -> Schema {
        let mapping = Schema::new()
            .field("auth0", Field::string().required().validate(Validator::NonEmpty))
            .field("idp", Field::string().required().validate(Validator::NonEmpty));

        Schema::new()
            .field("connection_id", Field::string().required().force_new())
            .field("mapping", Field::blocks(mapping).optional_computed())
            .field("synchronize_automatically", Field::bool().optional_computed())
            .field("connection_name", Field::string().computed())
            .field("strategy", Field::string().computed())
            .field("created_at", Field::string().computed())
            .field("updated_at", Field::string().computed())
            .field("last_synchronization_at", Field::string().computed())
            .field("last_synchronization_status", Field::string().computed())
            .field("last_synchronization_error", Field::string().computed())
    }

    #[instrument(skip_all)]
    async fn create(&self, ctx: &ProviderContext, d: &mut ResourceData) -> DiagResult {
        let connection_id = required_string(d, "connection_id")?;
        // A missing connection is an error here, not a removal
        let directory = ctx
            .api
            .create_directory_provisioning(&connection_id, &expand_directory(d))
            .await?;
        info!("Created directory provisioning for {}", connection_id);

        d.set_id(connection_id);
        flatten_directory(d, &directory);
        Ok(Diagnostics::new())
    }

    #[instrument(skip_all, fields(id = d.id().unwrap_or_default()))]
    async fn read(&self, ctx: &ProviderContext, d: &mut ResourceData) -> DiagResult {
        let connection_id = d.require_id()?.to_string();
        let Some(directory) = remove_if_not_found(
            d,
            ctx.api.read_directory_provisioning(&connection_id).await,
        )?
        else {
            return Ok(Diagnostics::new());
        };

        d.set("connection_id", connection_id);
        flatten_directory(d, &directory);
        Ok(Diagnostics::new())
    }

    #[instrument(skip_all, fields(id = d.id().unwrap_or_default()))]
    async fn update(&self, ctx: &ProviderContext, d: &mut ResourceData) -> DiagResult {
        let connection_id = d.require_id()?.to_string();
        let directory = ctx
            .api
            .update_directory_provisioning(&connection_id, &expand_directory(d))
            .await?;
        flatten_directory(d, &directory);
        Ok(Diagnostics::new())
    }

    #[instrument(skip_all, fields(id = d.id().unwrap_or_default()))]
    async fn delete(&self, ctx: &ProviderContext, d: &mut ResourceData) -> DiagResult {
        let connection_id = d.require_id()?.to_string();
        ignore_not_found(ctx.api.delete_directory_provisioning(&connection_id).await)
    }
}
