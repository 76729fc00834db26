//! `auth0_custom_domain_verification`: trigger verification and wait for `ready`

use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, info, instrument};

use auth0_core::{Auth0Error, CustomDomain, ManagementApi, Result};

use crate::data::{parse_duration, AttrReader, ResourceData};
use crate::diag::{DiagResult, Diagnostics};
use crate::provider::{remove_if_not_found, required_string, ProviderContext, Resource};
use crate::schema::{Field, Schema};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);
pub const DEFAULT_CREATE_TIMEOUT: Duration = Duration::from_secs(5 * 60);

pub struct CustomDomainVerificationResource {
    poll_interval: Duration,
}

impl Default for CustomDomainVerificationResource {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

impl CustomDomainVerificationResource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_poll_interval(poll_interval: Duration) -> Self {
        Self { poll_interval }
    }
}

/// Trigger verification until the domain reports `ready`.
///
/// Any other status is retried after `poll_interval`; an API or transport
/// error ends the loop at once. Running out of `timeout` yields
/// [`Auth0Error::Timeout`].
pub async fn verify_until_ready(
    api: &dyn ManagementApi,
    custom_domain_id: &str,
    poll_interval: Duration,
    timeout: Duration,
) -> Result<CustomDomain> {
    let poll = async {
        let mut attempt = 1u32;
        loop {
            let domain = api.verify_custom_domain(custom_domain_id).await?;
            if domain.is_ready() {
                return Ok::<_, Auth0Error>(domain);
            }
            debug!(
                "Custom domain {} has status {:?} after attempt {}, retrying in {:?}",
                custom_domain_id, domain.status, attempt, poll_interval
            );
            attempt += 1;
            tokio::time::sleep(poll_interval).await;
        }
    };

    match tokio::time::timeout(timeout, poll).await {
        Ok(result) => result,
        Err(_) => Err(Auth0Error::timeout(format!(
            "custom domain {} did not reach status \"ready\" within {:?}",
            custom_domain_id, timeout
        ))),
    }
}

fn create_timeout(d: &ResourceData) -> Result<Duration> {
    match d.block("timeouts").and_then(|t| t.string("create")) {
        Some(raw) if !raw.is_empty() => parse_duration(&raw),
        _ => Ok(DEFAULT_CREATE_TIMEOUT),
    }
}

#[async_trait]
impl Resource for CustomDomainVerificationResource {
    fn type_name(&self) -> &'static str {
        "auth0_custom_domain_verification"
    }

    fn schema(&self) -> Schema {
        Schema::new()
            .field("custom_domain_id", Field::string().required().force_new())
            .field("origin_domain_name", Field::string().computed())
            .field("cname_api_key", Field::string().computed().sensitive())
            .field(
                "timeouts",
                Field::block(Schema::new().field("create", Field::string()))
                    .describe("Operation timeouts such as `create = \"5m\"`."),
            )
    }

    #[instrument(skip_all)]
    async fn create(&self, ctx: &ProviderContext, d: &mut ResourceData) -> DiagResult {
        let custom_domain_id = required_string(d, "custom_domain_id")?;
        let timeout = create_timeout(d)?;

        let domain =
            verify_until_ready(ctx.api.as_ref(), &custom_domain_id, self.poll_interval, timeout)
                .await?;
        info!("Custom domain {} verified", custom_domain_id);

        d.set_id(custom_domain_id);
        d.set("origin_domain_name", serde_json::json!(domain.origin_domain_name));
        // Returned only by the call that reaches `ready`
        if let Some(key) = domain.cname_api_key {
            d.set("cname_api_key", key);
        }
        Ok(Diagnostics::new())
    }

    #[instrument(skip_all, fields(id = d.id().unwrap_or_default()))]
    async fn read(&self, ctx: &ProviderContext, d: &mut ResourceData) -> DiagResult {
        let id = d.require_id()?.to_string();
        let Some(domain) = remove_if_not_found(d, ctx.api.read_custom_domain(&id).await)? else {
            return Ok(Diagnostics::new());
        };

        d.set("custom_domain_id", id);
        d.set("origin_domain_name", serde_json::json!(domain.origin_domain_name));
        if let Some(key) = domain.cname_api_key.filter(|k| !k.is_empty()) {
            d.set("cname_api_key", key);
        }
        Ok(Diagnostics::new())
    }

    async fn update(&self, ctx: &ProviderContext, d: &mut ResourceData) -> DiagResult {
        self.read(ctx, d).await
    }

    /// Verification cannot be undone; the resource is only dropped from state
    async fn delete(&self, _ctx: &ProviderContext, _d: &mut ResourceData) -> DiagResult {
        Ok(Diagnostics::new())
    }
}
