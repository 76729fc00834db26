//! `auth0_signing_keys` data source

use async_trait::async_trait;
use serde_json::{json, Value};
use sha2::{Digest, Sha256};
use tracing::instrument;

use auth0_core::SigningKey;

use crate::data::ResourceData;
use crate::diag::{DiagResult, Diagnostics};
use crate::provider::{DataSource, ProviderContext};
use crate::schema::{Field, Schema};

pub struct SigningKeysDataSource;

/// Stable ID derived from the key IDs
pub fn signing_keys_id(keys: &[SigningKey]) -> String {
    let mut hasher = Sha256::new();
    for key in keys {
        hasher.update(key.kid.as_bytes());
        hasher.update(b"\n");
    }
    format!("{:x}", hasher.finalize())
}

fn flatten_signing_keys(keys: &[SigningKey]) -> Value {
    keys.iter()
        .map(|k| {
            json!({
                "kid": k.kid,
                "cert": k.cert,
                "pkcs7": k.pkcs7,
                "fingerprint": k.fingerprint,
                "thumbprint": k.thumbprint,
                "current": k.current,
                "next": k.next,
                "previous": k.previous,
                "revoked": k.revoked,
                "current_since": k.current_since,
                "current_until": k.current_until,
                "revoked_at": k.revoked_at,
            })
        })
        .collect()
}

#[async_trait]
impl DataSource for SigningKeysDataSource {
    fn type_name(&self) -> &'static str {
        "auth0_signing_keys"
    }

    fn schema(&self) -> Schema {
        let key = Schema::new()
            .field("kid", Field::string().computed())
            .field("cert", Field::string().computed())
            .field("pkcs7", Field::string().computed())
            .field("fingerprint", Field::string().computed())
            .field("thumbprint", Field::string().computed())
            .field("current", Field::bool().computed())
            .field("next", Field::bool().computed())
            .field("previous", Field::bool().computed())
            .field("revoked", Field::bool().computed())
            .field("current_since", Field::string().computed())
            .field("current_until", Field::string().computed())
            .field("revoked_at", Field::string().computed());

        Schema::new().field("signing_keys", Field::blocks(key).computed().sensitive())
    }

    #[instrument(skip_all)]
    async fn read(&self, ctx: &ProviderContext, d: &mut ResourceData) -> DiagResult {
        let keys = ctx.api.list_signing_keys().await?;
        d.set_id(signing_keys_id(&keys));
        d.set("signing_keys", flatten_signing_keys(&keys));
        Ok(Diagnostics::new())
    }
}
