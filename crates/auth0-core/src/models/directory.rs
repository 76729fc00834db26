//! Directory provisioning (user sync from an external directory)

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DirectoryMapping {
    pub auth0: String,
    pub idp: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DirectoryProvisioning {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategy: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mapping: Option<Vec<DirectoryMapping>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub synchronize_automatically: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_synchronization_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_synchronization_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_synchronization_error: Option<String>,
}

impl DirectoryProvisioning {
    /// Request body: only the writable fields
    pub fn request(mapping: Option<Vec<DirectoryMapping>>, synchronize_automatically: Option<bool>) -> Self {
        Self {
            mapping,
            synchronize_automatically,
            ..Default::default()
        }
    }
}
