//! `auth0_connection_profile`: organization defaults for new connections

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use tracing::{info, instrument};

use auth0_core::{
    Auth0Error, ConnectionProfile, ConnectionProfileOrganization, Result, Strategy,
    StrategyOverride,
};

use crate::data::{AttrReader, Block, ResourceData};
use crate::diag::{DiagResult, Diagnostics};
use crate::provider::{ignore_not_found, remove_if_not_found, ProviderContext, Resource};
use crate::schema::{Field, Schema, Validator, PROFILE_ORGANIZATION_MODES};

pub struct ConnectionProfileResource;

fn expand_profile(d: &ResourceData) -> Result<ConnectionProfile> {
    let strategy_overrides = match d.raw("strategy_overrides").and_then(Value::as_object) {
        Some(overrides) => {
            let mut expanded = BTreeMap::new();
            for (strategy, value) in overrides {
                // Keys must name a known strategy
                let strategy: Strategy = strategy.parse()?;
                let enabled_features = value
                    .as_object()
                    .map(Block)
                    .and_then(|b| b.string_list("enabled_features"));
                expanded.insert(
                    strategy.as_str().to_string(),
                    StrategyOverride { enabled_features },
                );
            }
            Some(expanded)
        }
        None => None,
    };

    Ok(ConnectionProfile {
        name: d.string("name"),
        organization: d.block("organization").map(|o| ConnectionProfileOrganization {
            show_as_button: o.string("show_as_button"),
            assign_membership_on_login: o.string("assign_membership_on_login"),
        }),
        connection_name_prefix_template: d.string("connection_name_prefix_template"),
        enabled_features: d.string_list("enabled_features"),
        strategy_overrides,
        ..Default::default()
    })
}

fn flatten_profile(d: &mut ResourceData, profile: &ConnectionProfile) {
    let organization = profile.organization.as_ref().map(|o| {
        json!({
            "show_as_button": o.show_as_button,
            "assign_membership_on_login": o.assign_membership_on_login,
        })
    });
    let strategy_overrides = profile.strategy_overrides.as_ref().map(|overrides| {
        overrides
            .iter()
            .map(|(strategy, o)| {
                (strategy.clone(), json!({ "enabled_features": o.enabled_features }))
            })
            .collect::<Map<String, Value>>()
    });

    d.set("name", json!(profile.name));
    d.set("organization", json!(organization));
    d.set(
        "connection_name_prefix_template",
        json!(profile.connection_name_prefix_template),
    );
    d.set("enabled_features", json!(profile.enabled_features));
    d.set("strategy_overrides", json!(strategy_overrides));
}

#[async_trait]
impl Resource for ConnectionProfileResource {
    fn type_name(&self) -> &'static str {
        "auth0_connection_profile"
    }

    fn schema(&self) -> Schema {
        let organization = Schema::new()
            .field(
                "show_as_button",
                Field::string().validate(Validator::one_of(PROFILE_ORGANIZATION_MODES)),
            )
            .field(
                "assign_membership_on_login",
                Field::string().validate(Validator::one_of(PROFILE_ORGANIZATION_MODES)),
            );

        Schema::new()
            .field("name", Field::string().required().validate(Validator::NonEmpty))
            .field("organization", Field::block(organization).optional_computed())
            .field("connection_name_prefix_template", Field::string().optional_computed())
            .field("enabled_features", Field::set().optional_computed())
            .field(
                "strategy_overrides",
                Field::map()
                    .optional_computed()
                    .describe("Per-strategy overrides keyed by strategy, each with `enabled_features`."),
            )
    }

    #[instrument(skip_all)]
    async fn create(&self, ctx: &ProviderContext, d: &mut ResourceData) -> DiagResult {
        let profile = ctx.api.create_connection_profile(&expand_profile(d)?).await?;
        let id = profile.id.clone().ok_or_else(|| {
            Auth0Error::internal_error("connection profile response is missing its id")
        })?;
        info!("Created connection profile {}", id);

        d.set_id(id);
        flatten_profile(d, &profile);
        Ok(Diagnostics::new())
    }

    #[instrument(skip_all, fields(id = d.id().unwrap_or_default()))]
    async fn read(&self, ctx: &ProviderContext, d: &mut ResourceData) -> DiagResult {
        let id = d.require_id()?.to_string();
        let Some(profile) = remove_if_not_found(d, ctx.api.read_connection_profile(&id).await)?
        else {
            return Ok(Diagnostics::new());
        };
        flatten_profile(d, &profile);
        Ok(Diagnostics::new())
    }

    #[instrument(skip_all, fields(id = d.id().unwrap_or_default()))]
    async fn update(&self, ctx: &ProviderContext, d: &mut ResourceData) -> DiagResult {
        let id = d.require_id()?.to_string();
        let profile = ctx
            .api
            .update_connection_profile(&id, &expand_profile(d)?)
            .await?;
        flatten_profile(d, &profile);
        Ok(Diagnostics::new())
    }

    #[instrument(skip_all, fields(id = d.id().unwrap_or_default()))]
    async fn delete(&self, ctx: &ProviderContext, d: &mut ResourceData) -> DiagResult {
        let id = d.require_id()?.to_string();
        ignore_not_found(ctx.api.delete_connection_profile(&id).await)
    }
}
