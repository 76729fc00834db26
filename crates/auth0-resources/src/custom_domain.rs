//! `auth0_custom_domain` resource and data source

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{info, instrument};

use auth0_core::{Auth0Error, CustomDomain};

use crate::data::{AttrReader, ResourceData};
use crate::diag::{DiagResult, Diagnostics};
use crate::provider::{
    ignore_not_found, remove_if_not_found, required_string, DataSource, ProviderContext, Resource,
};
use crate::schema::{Field, Schema, Validator, CLIENT_IP_HEADERS, CUSTOM_DOMAIN_TYPES, TLS_POLICIES};

pub struct CustomDomainResource;

fn computed_fields(schema: Schema) -> Schema {
    let method = Schema::new()
        .field("name", Field::string().computed())
        .field("record", Field::string().computed())
        .field("domain", Field::string().computed());
    let verification = Schema::new().field("methods", Field::blocks(method).computed());
    let certificate = Schema::new()
        .field("status", Field::string().computed())
        .field("error_msg", Field::string().computed())
        .field("certificate_authority", Field::string().computed())
        .field("renews_before", Field::string().computed());

    schema
        .field("primary", Field::bool().computed())
        .field("status", Field::string().computed())
        .field("origin_domain_name", Field::string().computed())
        .field("verification", Field::blocks(verification).computed())
        .field("certificate", Field::block(certificate).computed())
}

pub fn flatten_custom_domain(d: &mut ResourceData, domain: &CustomDomain) {
    let verification: Value = match &domain.verification {
        Some(v) => json!([{
            "methods": v.methods.iter().map(|m| json!({
                "name": m.name,
                "record": m.record,
                "domain": m.domain,
            })).collect::<Vec<_>>(),
        }]),
        None => Value::Null,
    };
    let certificate = domain.certificate.as_ref().map(|c| {
        json!({
            "status": c.status,
            "error_msg": c.error_msg,
            "certificate_authority": c.certificate_authority,
            "renews_before": c.renews_before,
        })
    });

    d.set("domain", json!(domain.domain));
    d.set("type", json!(domain.provisioning_type));
    d.set("primary", json!(domain.primary));
    d.set("status", json!(domain.status));
    d.set("origin_domain_name", json!(domain.origin_domain_name));
    d.set("custom_client_ip_header", json!(domain.custom_client_ip_header));
    d.set("tls_policy", json!(domain.tls_policy));
    d.set("domain_metadata", json!(domain.domain_metadata));
    d.set("verification", verification);
    d.set("certificate", json!(certificate));
}

#[async_trait]
impl Resource for CustomDomainResource {
    fn type_name(&self) -> &'static str {
        "auth0_custom_domain"
    }

    fn schema(&self) -> Schema {
        computed_fields(
            Schema::new()
                .field("domain", Field::string().required().force_new().validate(Validator::NonEmpty))
                .field(
                    "type",
                    Field::string()
                        .required()
                        .force_new()
                        .validate(Validator::one_of(CUSTOM_DOMAIN_TYPES)),
                )
                .field(
                    "custom_client_ip_header",
                    Field::string()
                        .optional_computed()
                        .validate(Validator::one_of(CLIENT_IP_HEADERS)),
                )
                .field(
                    "tls_policy",
                    Field::string()
                        .optional_computed()
                        .validate(Validator::one_of(TLS_POLICIES)),
                )
                .field("domain_metadata", Field::map()),
        )
    }

    #[instrument(skip_all)]
    async fn create(&self, ctx: &ProviderContext, d: &mut ResourceData) -> DiagResult {
        let request = CustomDomain {
            domain: Some(required_string(d, "domain")?),
            provisioning_type: d.string("type"),
            custom_client_ip_header: d.string("custom_client_ip_header"),
            tls_policy: d.string("tls_policy"),
            domain_metadata: d.string_map("domain_metadata"),
            ..Default::default()
        };
        let domain = ctx.api.create_custom_domain(&request).await?;
        let id = domain
            .custom_domain_id
            .clone()
            .ok_or_else(|| Auth0Error::internal_error("custom domain response is missing its id"))?;
        info!("Created custom domain {}", id);

        d.set_id(id);
        flatten_custom_domain(d, &domain);
        Ok(Diagnostics::new())
    }

    #[instrument(skip_all, fields(id = d.id().unwrap_or_default()))]
    async fn read(&self, ctx: &ProviderContext, d: &mut ResourceData) -> DiagResult {
        let id = d.require_id()?.to_string();
        let Some(domain) = remove_if_not_found(d, ctx.api.read_custom_domain(&id).await)? else {
            return Ok(Diagnostics::new());
        };
        flatten_custom_domain(d, &domain);
        Ok(Diagnostics::new())
    }

    #[instrument(skip_all, fields(id = d.id().unwrap_or_default()))]
    async fn update(&self, ctx: &ProviderContext, d: &mut ResourceData) -> DiagResult {
        let id = d.require_id()?.to_string();
        // Domain and type are immutable
        let request = CustomDomain {
            custom_client_ip_header: d.string("custom_client_ip_header"),
            tls_policy: d.string("tls_policy"),
            domain_metadata: d
                .has_change("domain_metadata")
                .then(|| d.string_map("domain_metadata").unwrap_or_default()),
            ..Default::default()
        };
        let domain = ctx.api.update_custom_domain(&id, &request).await?;
        flatten_custom_domain(d, &domain);
        Ok(Diagnostics::new())
    }

    #[instrument(skip_all, fields(id = d.id().unwrap_or_default()))]
    async fn delete(&self, ctx: &ProviderContext, d: &mut ResourceData) -> DiagResult {
        let id = d.require_id()?.to_string();
        ignore_not_found(ctx.api.delete_custom_domain(&id).await)
    }
}

/// The tenant's custom domain
pub struct CustomDomainDataSource;

#[async_trait]
impl DataSource for CustomDomainDataSource {
    fn type_name(&self) -> &'static str {
        "auth0_custom_domain"
    }

    fn schema(&self) -> Schema {
        computed_fields(
            Schema::new()
                .field("domain", Field::string().computed())
                .field("type", Field::string().computed())
                .field("custom_client_ip_header", Field::string().computed())
                .field("tls_policy", Field::string().computed())
                .field("domain_metadata", Field::map().computed()),
        )
    }

    #[instrument(skip_all)]
    async fn read(&self, ctx: &ProviderContext, d: &mut ResourceData) -> DiagResult {
        let domain = ctx
            .api
            .list_custom_domains()
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| Auth0Error::not_found("custom domain", "tenant"))?;
        let id = domain
            .custom_domain_id
            .clone()
            .ok_or_else(|| Auth0Error::internal_error("custom domain response is missing its id"))?;

        d.set_id(id);
        flatten_custom_domain(d, &domain);
        Ok(Diagnostics::new())
    }
}
