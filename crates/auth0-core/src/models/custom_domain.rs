//! Custom domains and their verification

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Custom domain status, driven by Auth0: pending → pending_verification → ready
pub const STATUS_READY: &str = "ready";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomDomain {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_domain_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// `auth0_managed_certs` or `self_managed_certs`; immutable
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub provisioning_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin_domain_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verification: Option<CustomDomainVerification>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_client_ip_header: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tls_policy: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain_metadata: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate: Option<CustomDomainCertificate>,
    /// Only present on the verify response that first reaches `ready`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cname_api_key: Option<String>,
}

impl CustomDomain {
    pub fn is_ready(&self) -> bool {
        self.status.as_deref() == Some(STATUS_READY)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomDomainVerification {
    #[serde(default)]
    pub methods: Vec<VerificationMethod>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VerificationMethod {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub record: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomDomainCertificate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_msg: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate_authority: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub renews_before: Option<String>,
}
