//! `auth0_encryption_key_manager`: the tenant's encryption key ring
//!
//! A singleton with no remote identity. Changing `key_rotation_id` to a new
//! non-empty value rekeys the tenant; reads report every key in the ring.

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{info, instrument};
use uuid::Uuid;

use auth0_core::EncryptionKey;

use crate::data::{AttrReader, ResourceData};
use crate::diag::{DiagResult, Diagnostics};
use crate::provider::{ProviderContext, Resource};
use crate::schema::{Field, Schema};

pub struct EncryptionKeyManagerResource;

impl EncryptionKeyManagerResource {
    /// Rekey only when the rotation token changed to a non-empty value
    async fn rotate_if_requested(ctx: &ProviderContext, d: &ResourceData) -> DiagResult<bool> {
        let requested = d
            .string("key_rotation_id")
            .is_some_and(|id| !id.is_empty());
        if !requested || !d.has_change("key_rotation_id") {
            return Ok(false);
        }

        ctx.api.rekey_encryption_keys().await?;
        info!("Requested encryption key rotation");
        Ok(true)
    }

    async fn refresh(ctx: &ProviderContext, d: &mut ResourceData) -> DiagResult {
        let keys = ctx.api.list_encryption_keys().await?;
        d.set("encryption_keys", flatten_keys(&keys));
        Ok(Diagnostics::new())
    }
}

fn flatten_keys(keys: &[EncryptionKey]) -> Value {
    keys.iter()
        .map(|k| {
            json!({
                "key_id": k.key_id,
                "type": k.key_type,
                "state": k.state,
                "parent_key_id": k.parent_kid,
                "created_at": k.created_at,
                "updated_at": k.updated_at,
            })
        })
        .collect()
}

#[async_trait]
impl Resource for EncryptionKeyManagerResource {
    fn type_name(&self) -> &'static str {
        "auth0_encryption_key_manager"
    }

    fn schema(&self) -> Schema {
        let key = Schema::new()
            .field("key_id", Field::string().computed())
            .field("type", Field::string().computed())
            .field("state", Field::string().computed())
            .field("parent_key_id", Field::string().computed())
            .field("created_at", Field::string().computed())
            .field("updated_at", Field::string().computed());

        Schema::new()
            .field(
                "key_rotation_id",
                Field::string().describe("Set to a new value to rotate the tenant's encryption keys."),
            )
            .field("encryption_keys", Field::blocks(key).computed())
    }

    #[instrument(skip_all)]
    async fn create(&self, ctx: &ProviderContext, d: &mut ResourceData) -> DiagResult {
        Self::rotate_if_requested(ctx, d).await?;
        d.set_id(Uuid::new_v4().to_string());
        Self::refresh(ctx, d).await
    }

    #[instrument(skip_all)]
    async fn read(&self, ctx: &ProviderContext, d: &mut ResourceData) -> DiagResult {
        Self::refresh(ctx, d).await
    }

    #[instrument(skip_all)]
    async fn update(&self, ctx: &ProviderContext, d: &mut ResourceData) -> DiagResult {
        Self::rotate_if_requested(ctx, d).await?;
        Self::refresh(ctx, d).await
    }

    /// Keys cannot be deleted; the manager is only dropped from state
    async fn delete(&self, _ctx: &ProviderContext, _d: &mut ResourceData) -> DiagResult {
        Ok(Diagnostics::new())
    }
}
