//! Tenant encryption and signing keys

use serde::{Deserialize, Serialize};

/// Entry of the tenant's encryption key ring
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EncryptionKey {
    #[serde(rename = "kid")]
    pub key_id: String,
    /// `customer-provided-root-key`, `environment-root-key`, `tenant-master-key`, ...
    #[serde(rename = "type", default)]
    pub key_type: String,
    /// `pre-activation`, `active`, `deactivated` or `destroyed`
    #[serde(default)]
    pub state: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_kid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_key: Option<String>,
}

/// One page of `GET /keys/encryption?include_totals=true`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EncryptionKeyList {
    #[serde(default)]
    pub keys: Vec<EncryptionKey>,
    #[serde(default)]
    pub start: u32,
    #[serde(default)]
    pub limit: u32,
    #[serde(default)]
    pub total: u32,
}

/// JWT signing key of the tenant
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SigningKey {
    pub kid: String,
    #[serde(default)]
    pub cert: String,
    #[serde(default)]
    pub pkcs7: String,
    #[serde(default)]
    pub fingerprint: String,
    #[serde(default)]
    pub thumbprint: String,
    #[serde(default)]
    pub current: bool,
    #[serde(default)]
    pub next: bool,
    #[serde(default)]
    pub previous: bool,
    #[serde(default)]
    pub revoked: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_since: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_until: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revoked_at: Option<String>,
}
