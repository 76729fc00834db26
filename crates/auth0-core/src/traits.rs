//! Core traits for the Auth0 resource provider

use async_trait::async_trait;

use crate::{error::Result, models::*};

// =============================================================================
// Management API
// =============================================================================

/// Operations of the Auth0 Management API used by the provider.
///
/// Every method maps to one documented endpoint. A missing remote object is
/// reported as an error for which [`crate::Auth0Error::is_not_found`] holds.
#[async_trait]
pub trait ManagementApi: Send + Sync {
    // Connections
    async fn create_connection(&self, connection: &Connection) -> Result<Connection>;
    async fn read_connection(&self, id: &str) -> Result<Connection>;
    async fn update_connection(&self, id: &str, connection: &Connection) -> Result<Connection>;
    async fn delete_connection(&self, id: &str) -> Result<()>;
    /// All pages of the connection list matching the filter
    async fn list_connections(&self, filter: &ConnectionFilter) -> Result<Vec<Connection>>;

    // SCIM
    async fn create_scim_configuration(
        &self,
        connection_id: &str,
        configuration: &ScimConfiguration,
    ) -> Result<ScimConfiguration>;
    async fn read_scim_configuration(&self, connection_id: &str) -> Result<ScimConfiguration>;
    async fn update_scim_configuration(
        &self,
        connection_id: &str,
        configuration: &ScimConfiguration,
    ) -> Result<ScimConfiguration>;
    async fn delete_scim_configuration(&self, connection_id: &str) -> Result<()>;
    async fn read_scim_default_mapping(&self, connection_id: &str) -> Result<ScimDefaultMapping>;
    async fn create_scim_token(
        &self,
        connection_id: &str,
        request: &ScimTokenRequest,
    ) -> Result<ScimToken>;
    async fn list_scim_tokens(&self, connection_id: &str) -> Result<Vec<ScimToken>>;
    async fn delete_scim_token(&self, connection_id: &str, token_id: &str) -> Result<()>;

    // Directory provisioning
    async fn create_directory_provisioning(
        &self,
        connection_id: &str,
        provisioning: &DirectoryProvisioning,
    ) -> Result<DirectoryProvisioning>;
    async fn read_directory_provisioning(&self, connection_id: &str)
        -> Result<DirectoryProvisioning>;
    async fn update_directory_provisioning(
        &self,
        connection_id: &str,
        provisioning: &DirectoryProvisioning,
    ) -> Result<DirectoryProvisioning>;
    async fn delete_directory_provisioning(&self, connection_id: &str) -> Result<()>;

    // Connection profiles
    async fn create_connection_profile(
        &self,
        profile: &ConnectionProfile,
    ) -> Result<ConnectionProfile>;
    async fn read_connection_profile(&self, id: &str) -> Result<ConnectionProfile>;
    async fn update_connection_profile(
        &self,
        id: &str,
        profile: &ConnectionProfile,
    ) -> Result<ConnectionProfile>;
    async fn delete_connection_profile(&self, id: &str) -> Result<()>;

    // Custom domains
    async fn create_custom_domain(&self, domain: &CustomDomain) -> Result<CustomDomain>;
    async fn read_custom_domain(&self, id: &str) -> Result<CustomDomain>;
    async fn update_custom_domain(&self, id: &str, domain: &CustomDomain) -> Result<CustomDomain>;
    async fn delete_custom_domain(&self, id: &str) -> Result<()>;
    async fn list_custom_domains(&self) -> Result<Vec<CustomDomain>>;
    /// Trigger verification; the response reports the resulting status
    async fn verify_custom_domain(&self, id: &str) -> Result<CustomDomain>;

    // Keys
    /// All pages of the tenant's encryption key ring
    async fn list_encryption_keys(&self) -> Result<Vec<EncryptionKey>>;
    async fn rekey_encryption_keys(&self) -> Result<()>;
    async fn list_signing_keys(&self) -> Result<Vec<SigningKey>>;
}
