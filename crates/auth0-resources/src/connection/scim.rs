//! SCIM provisioning of a connection: configuration and bearer tokens

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{info, instrument};

use auth0_core::{CompositeId, ScimConfiguration, ScimMapping, ScimToken, ScimTokenRequest};

use crate::data::{AttrReader, ResourceData};
use crate::diag::{DiagResult, Diagnostics};
use crate::provider::{
    ignore_not_found, remove_if_not_found, required_string, DataSource, ProviderContext, Resource,
};
use crate::schema::{Field, Schema, Validator};

fn mapping_schema() -> Schema {
    Schema::new()
        .field("auth0", Field::string().required().validate(Validator::NonEmpty))
        .field("scim", Field::string().required().validate(Validator::NonEmpty))
}

fn flatten_mapping(mapping: &[ScimMapping]) -> Value {
    mapping
        .iter()
        .map(|m| json!({ "auth0": m.auth0, "scim": m.scim }))
        .collect()
}

/// Declared configuration, or `None` to let the server pick its default mapping
fn expand_scim_configuration(d: &ResourceData) -> Option<ScimConfiguration> {
    let user_id_attribute = d.string("user_id_attribute").filter(|s| !s.is_empty());
    let mapping: Vec<ScimMapping> = d
        .blocks("mapping")
        .iter()
        .map(|b| ScimMapping {
            auth0: b.string("auth0").unwrap_or_default(),
            scim: b.string("scim").unwrap_or_default(),
        })
        .collect();

    if user_id_attribute.is_none() && mapping.is_empty() {
        return None;
    }
    Some(ScimConfiguration {
        user_id_attribute,
        mapping: Some(mapping),
        ..Default::default()
    })
}

fn flatten_scim_configuration(d: &mut ResourceData, configuration: &ScimConfiguration) {
    d.set("connection_name", json!(configuration.connection_name));
    d.set("strategy", json!(configuration.strategy));
    d.set("tenant_name", json!(configuration.tenant_name));
    d.set("user_id_attribute", json!(configuration.user_id_attribute));
    d.set(
        "mapping",
        flatten_mapping(configuration.mapping.as_deref().unwrap_or_default()),
    );
}

fn configuration_fields(schema: Schema) -> Schema {
    schema
        .field("connection_name", Field::string().computed())
        .field("strategy", Field::string().computed())
        .field("tenant_name", Field::string().computed())
}

// =============================================================================
// Configuration
// =============================================================================

pub struct ScimConfigurationResource;

#[async_trait]
impl Resource for ScimConfigurationResource {
    fn type_name(&self) -> &'static str {
        "auth0_connection_scim_configuration"
    }

    fn schema(&self) -> Schema {
        configuration_fields(
            Schema::new()
                .field("connection_id", Field::string().required().force_new())
                .field("user_id_attribute", Field::string().optional_computed())
                .field("mapping", Field::blocks(mapping_schema()).optional_computed()),
        )
        .required_together(&["user_id_attribute", "mapping"])
    }

    #[instrument(skip_all)]
    async fn create(&self, ctx: &ProviderContext, d: &mut ResourceData) -> DiagResult {
        let connection_id = required_string(d, "connection_id")?;
        let request = expand_scim_configuration(d).unwrap_or_default();
        let configuration = ctx
            .api
            .create_scim_configuration(&connection_id, &request)
            .await?;
        info!("Created SCIM configuration for {}", connection_id);

        d.set_id(connection_id);
        flatten_scim_configuration(d, &configuration);
        Ok(Diagnostics::new())
    }

    #[instrument(skip_all, fields(id = d.id().unwrap_or_default()))]
    async fn read(&self, ctx: &ProviderContext, d: &mut ResourceData) -> DiagResult {
        let connection_id = d.require_id()?.to_string();
        let Some(configuration) =
            remove_if_not_found(d, ctx.api.read_scim_configuration(&connection_id).await)?
        else {
            return Ok(Diagnostics::new());
        };

        d.set("connection_id", connection_id);
        flatten_scim_configuration(d, &configuration);
        Ok(Diagnostics::new())
    }

    #[instrument(skip_all, fields(id = d.id().unwrap_or_default()))]
    async fn update(&self, ctx: &ProviderContext, d: &mut ResourceData) -> DiagResult {
        let connection_id = d.require_id()?.to_string();
        let request = match expand_scim_configuration(d) {
            Some(request) => request,
            None => {
                let default = ctx.api.read_scim_default_mapping(&connection_id).await?;
                ScimConfiguration {
                    mapping: Some(default.mapping),
                    ..Default::default()
                }
            }
        };
        let configuration = ctx
            .api
            .update_scim_configuration(&connection_id, &request)
            .await?;
        flatten_scim_configuration(d, &configuration);
        Ok(Diagnostics::new())
    }

    #[instrument(skip_all, fields(id = d.id().unwrap_or_default()))]
    async fn delete(&self, ctx: &ProviderContext, d: &mut ResourceData) -> DiagResult {
        let connection_id = d.require_id()?.to_string();
        ignore_not_found(ctx.api.delete_scim_configuration(&connection_id).await)
    }
}

/// SCIM configuration of a connection, with the server's default mapping
pub struct ScimConfigurationDataSource;

#[async_trait]
impl DataSource for ScimConfigurationDataSource {
    fn type_name(&self) -> &'static str {
        "auth0_connection_scim_configuration"
    }

    fn schema(&self) -> Schema {
        configuration_fields(
            Schema::new()
                .field("connection_id", Field::string().required())
                .field("user_id_attribute", Field::string().computed())
                .field("mapping", Field::blocks(mapping_schema()).computed())
                .field("default_mapping", Field::blocks(mapping_schema()).computed()),
        )
    }

    #[instrument(skip_all)]
    async fn read(&self, ctx: &ProviderContext, d: &mut ResourceData) -> DiagResult {
        let connection_id = required_string(d, "connection_id")?;
        let configuration = ctx.api.read_scim_configuration(&connection_id).await?;
        let default = ctx.api.read_scim_default_mapping(&connection_id).await?;

        d.set_id(connection_id);
        flatten_scim_configuration(d, &configuration);
        d.set("default_mapping", flatten_mapping(&default.mapping));
        Ok(Diagnostics::new())
    }
}

// =============================================================================
// Tokens
// =============================================================================

/// Bearer token for SCIM requests; the secret is only returned at creation
pub struct ScimTokenResource;

fn parse_token_id(id: &str) -> auth0_core::Result<CompositeId> {
    CompositeId::parse(id, "connectionID", "tokenID")
}

fn flatten_token(d: &mut ResourceData, token: &ScimToken) {
    d.set("token_id", token.token_id.as_str());
    d.set("scopes", json!(token.scopes));
    d.set("created_at", json!(token.created_at));
    d.set("valid_until", json!(token.valid_until));
    d.set("last_used_at", json!(token.last_used_at));
    // Only present in the creation response
    if let Some(secret) = &token.token {
        d.set("token", secret.as_str());
    }
}

#[async_trait]
impl Resource for ScimTokenResource {
    fn type_name(&self) -> &'static str {
        "auth0_connection_scim_token"
    }

    fn schema(&self) -> Schema {
        Schema::new()
            .field("connection_id", Field::string().required().force_new())
            .field("scopes", Field::set().optional_computed().force_new())
            .field("token_lifetime", Field::int().force_new())
            .field("token_id", Field::string().computed())
            .field("token", Field::string().computed().sensitive())
            .field("created_at", Field::string().computed())
            .field("valid_until", Field::string().computed())
            .field("last_used_at", Field::string().computed())
    }

    #[instrument(skip_all)]
    async fn create(&self, ctx: &ProviderContext, d: &mut ResourceData) -> DiagResult {
        let connection_id = required_string(d, "connection_id")?;
        let request = ScimTokenRequest {
            scopes: d.string_list("scopes"),
            token_lifetime: d.int("token_lifetime"),
        };
        let token = ctx.api.create_scim_token(&connection_id, &request).await?;
        info!("Created SCIM token {} for {}", token.token_id, connection_id);

        d.set_id(CompositeId::new(&connection_id, &token.token_id).to_string());
        flatten_token(d, &token);
        Ok(Diagnostics::new())
    }

    #[instrument(skip_all, fields(id = d.id().unwrap_or_default()))]
    async fn read(&self, ctx: &ProviderContext, d: &mut ResourceData) -> DiagResult {
        let id = parse_token_id(d.require_id()?)?;
        let Some(tokens) = remove_if_not_found(d, ctx.api.list_scim_tokens(&id.parent).await)?
        else {
            return Ok(Diagnostics::new());
        };

        match tokens.iter().find(|t| t.token_id == id.child) {
            Some(token) => {
                d.set("connection_id", id.parent.as_str());
                flatten_token(d, token);
            }
            None => d.clear_id(),
        }
        Ok(Diagnostics::new())
    }

    async fn update(&self, ctx: &ProviderContext, d: &mut ResourceData) -> DiagResult {
        self.read(ctx, d).await
    }

    #[instrument(skip_all, fields(id = d.id().unwrap_or_default()))]
    async fn delete(&self, ctx: &ProviderContext, d: &mut ResourceData) -> DiagResult {
        let id = parse_token_id(d.require_id()?)?;
        ignore_not_found(ctx.api.delete_scim_token(&id.parent, &id.child).await)
    }
}
