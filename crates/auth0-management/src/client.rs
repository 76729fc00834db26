//! Management API client

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info, instrument};

use auth0_core::{
    Auth0Error, Connection, ConnectionFilter, ConnectionList, ConnectionProfile, CustomDomain,
    DirectoryProvisioning, EncryptionKey, EncryptionKeyList, ManagementApi, Result,
    ScimConfiguration, ScimDefaultMapping, ScimToken, ScimTokenRequest, SigningKey,
};

use crate::config::{Credentials, ManagementConfig};
use crate::http::{error_for_status, HttpClient};
use crate::pagination::{collect_all_pages, Page};

/// Seconds before expiry at which a cached token is refreshed
const TOKEN_REFRESH_MARGIN_SECS: i64 = 60;

#[derive(Debug, Serialize)]
struct TokenRequest<'a> {
    grant_type: &'static str,
    client_id: &'a str,
    client_secret: &'a str,
    audience: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
}

fn default_expires_in() -> i64 {
    86400
}

struct CachedToken {
    access_token: String,
    expires_at: DateTime<Utc>,
}

/// Auth0 Management API client
pub struct ManagementClient {
    config: ManagementConfig,
    http_client: HttpClient,
    token: RwLock<Option<CachedToken>>,
}

impl ManagementClient {
    pub fn new(config: ManagementConfig) -> Result<Self> {
        let http_client =
            HttpClient::new(config.timeout_secs, config.max_retries, config.retry_delay_ms)?;

        Ok(Self {
            config,
            http_client,
            token: RwLock::new(None),
        })
    }

    pub fn config(&self) -> &ManagementConfig {
        &self.config
    }

    /// Bearer token for the next request
    async fn access_token(&self) -> Result<String> {
        let (client_id, client_secret) = match &self.config.credentials {
            Credentials::ApiToken(token) => return Ok(token.clone()),
            Credentials::ClientCredentials {
                client_id,
                client_secret,
            } => (client_id, client_secret),
        };

        // Check cache first
        {
            let cached = self.token.read().await;
            if let Some(token) = cached.as_ref() {
                if Utc::now() < token.expires_at {
                    return Ok(token.access_token.clone());
                }
            }
        }

        debug!("Fetching Management API token for client {}", client_id);
        let request = TokenRequest {
            grant_type: "client_credentials",
            client_id,
            client_secret,
            audience: self.config.token_audience(),
        };
        let response = self
            .http_client
            .execute_with_retry(
                self.http_client
                    .inner()
                    .post(self.config.token_url())
                    .json(&request),
            )
            .await?;
        let response = error_for_status(response, "token", client_id).await?;
        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| Auth0Error::transport(format!("Failed to parse token response: {}", e)))?;

        let access_token = token.access_token.clone();
        {
            let mut cached = self.token.write().await;
            *cached = Some(CachedToken {
                access_token: token.access_token,
                expires_at: Utc::now()
                    + Duration::seconds(token.expires_in - TOKEN_REFRESH_MARGIN_SECS),
            });
        }

        Ok(access_token)
    }

    /// Send an authenticated request and map error statuses.
    async fn send(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<serde_json::Value>,
        entity_type: &str,
        id: &str,
    ) -> Result<reqwest::Response> {
        let url = self.config.api_url(path);
        if self.config.debug {
            info!("{} {}", method, url);
        } else {
            debug!("{} {}", method, url);
        }

        let token = self.access_token().await?;
        let mut request = self
            .http_client
            .inner()
            .request(method, &url)
            .bearer_auth(token)
            .header("Accept", "application/json");
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = self.http_client.execute_with_retry(request).await?;
        error_for_status(response, entity_type, id).await
    }

    async fn json<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<serde_json::Value>,
        entity_type: &str,
        id: &str,
    ) -> Result<T> {
        let response = self.send(method, path, query, body, entity_type, id).await?;
        response.json().await.map_err(|e| Auth0Error::Serialization {
            message: format!("Failed to parse {} response: {}", entity_type, e),
        })
    }

    async fn no_content(&self, method: Method, path: &str, entity_type: &str, id: &str) -> Result<()> {
        self.send(method, path, &[], None, entity_type, id).await?;
        Ok(())
    }

    fn page_query(&self, page: u32) -> Vec<(&'static str, String)> {
        vec![
            ("page", page.to_string()),
            ("per_page", self.config.per_page.to_string()),
            ("include_totals", "true".to_string()),
        ]
    }

    async fn list_connections_page(
        &self,
        filter: &ConnectionFilter,
        page: u32,
    ) -> Result<Page<Connection>> {
        let mut query = self.page_query(page);
        if let Some(name) = &filter.name {
            query.push(("name", name.clone()));
        }
        if let Some(strategy) = &filter.strategy {
            query.push(("strategy", strategy.as_str().to_string()));
        }

        let list: ConnectionList = self
            .json(Method::GET, "/connections", &query, None, "connections", "list")
            .await?;
        Ok(Page {
            items: list.connections,
            total: Some(list.total),
        })
    }

    async fn list_encryption_keys_page(&self, page: u32) -> Result<Page<EncryptionKey>> {
        let query = self.page_query(page);
        let list: EncryptionKeyList = self
            .json(Method::GET, "/keys/encryption", &query, None, "encryption keys", "list")
            .await?;
        Ok(Page {
            items: list.keys,
            total: Some(list.total),
        })
    }
}

fn body<T: Serialize>(value: &T) -> Result<Option<serde_json::Value>> {
    Ok(Some(serde_json::to_value(value)?))
}

fn encode(segment: &str) -> String {
    urlencoding::encode(segment).into_owned()
}

#[async_trait]
impl ManagementApi for ManagementClient {
    #[instrument(skip(self, connection))]
    async fn create_connection(&self, connection: &Connection) -> Result<Connection> {
        let name = connection.name.as_deref().unwrap_or_default();
        self.json(Method::POST, "/connections", &[], body(connection)?, "connection", name)
            .await
    }

    #[instrument(skip(self))]
    async fn read_connection(&self, id: &str) -> Result<Connection> {
        let path = format!("/connections/{}", encode(id));
        self.json(Method::GET, &path, &[], None, "connection", id).await
    }

    #[instrument(skip(self, connection))]
    async fn update_connection(&self, id: &str, connection: &Connection) -> Result<Connection> {
        let path = format!("/connections/{}", encode(id));
        self.json(Method::PATCH, &path, &[], body(connection)?, "connection", id)
            .await
    }

    #[instrument(skip(self))]
    async fn delete_connection(&self, id: &str) -> Result<()> {
        let path = format!("/connections/{}", encode(id));
        self.no_content(Method::DELETE, &path, "connection", id).await
    }

    #[instrument(skip(self))]
    async fn list_connections(&self, filter: &ConnectionFilter) -> Result<Vec<Connection>> {
        collect_all_pages(
            |page| self.list_connections_page(filter, page),
            self.config.per_page,
        )
        .await
    }

    #[instrument(skip(self, configuration))]
    async fn create_scim_configuration(
        &self,
        connection_id: &str,
        configuration: &ScimConfiguration,
    ) -> Result<ScimConfiguration> {
        let path = format!("/connections/{}/scim-configuration", encode(connection_id));
        self.json(
            Method::POST,
            &path,
            &[],
            body(configuration)?,
            "SCIM configuration",
            connection_id,
        )
        .await
    }

    #[instrument(skip(self))]
    async fn read_scim_configuration(&self, connection_id: &str) -> Result<ScimConfiguration> {
        let path = format!("/connections/{}/scim-configuration", encode(connection_id));
        self.json(Method::GET, &path, &[], None, "SCIM configuration", connection_id)
            .await
    }

    #[instrument(skip(self, configuration))]
    async fn update_scim_configuration(
        &self,
        connection_id: &str,
        configuration: &ScimConfiguration,
    ) -> Result<ScimConfiguration> {
        let path = format!("/connections/{}/scim-configuration", encode(connection_id));
        self.json(
            Method::PATCH,
            &path,
            &[],
            body(configuration)?,
            "SCIM configuration",
            connection_id,
        )
        .await
    }

    #[instrument(skip(self))]
    async fn delete_scim_configuration(&self, connection_id: &str) -> Result<()> {
        let path = format!("/connections/{}/scim-configuration", encode(connection_id));
        self.no_content(Method::DELETE, &path, "SCIM configuration", connection_id)
            .await
    }

    #[instrument(skip(self))]
    async fn read_scim_default_mapping(&self, connection_id: &str) -> Result<ScimDefaultMapping> {
        let path = format!(
            "/connections/{}/scim-configuration/default-mapping",
            encode(connection_id)
        );
        self.json(Method::GET, &path, &[], None, "SCIM default mapping", connection_id)
            .await
    }

    #[instrument(skip(self, request))]
    async fn create_scim_token(
        &self,
        connection_id: &str,
        request: &ScimTokenRequest,
    ) -> Result<ScimToken> {
        let path = format!(
            "/connections/{}/scim-configuration/tokens",
            encode(connection_id)
        );
        self.json(Method::POST, &path, &[], body(request)?, "SCIM token", connection_id)
            .await
    }

    #[instrument(skip(self))]
    async fn list_scim_tokens(&self, connection_id: &str) -> Result<Vec<ScimToken>> {
        let path = format!(
            "/connections/{}/scim-configuration/tokens",
            encode(connection_id)
        );
        self.json(Method::GET, &path, &[], None, "SCIM tokens", connection_id)
            .await
    }

    #[instrument(skip(self))]
    async fn delete_scim_token(&self, connection_id: &str, token_id: &str) -> Result<()> {
        let path = format!(
            "/connections/{}/scim-configuration/tokens/{}",
            encode(connection_id),
            encode(token_id)
        );
        self.no_content(Method::DELETE, &path, "SCIM token", token_id)
            .await
    }

    #[instrument(skip(self, provisioning))]
    async fn create_directory_provisioning(
        &self,
        connection_id: &str,
        provisioning: &DirectoryProvisioning,
    ) -> Result<DirectoryProvisioning> {
        let path = format!("/connections/{}/directory-provisioning", encode(connection_id));
        self.json(
            Method::POST,
            &path,
            &[],
            body(provisioning)?,
            "directory provisioning",
            connection_id,
        )
        .await
    }

    #[instrument(skip(self))]
    async fn read_directory_provisioning(
        &self,
        connection_id: &str,
    ) -> Result<DirectoryProvisioning> {
        let path = format!("/connections/{}/directory-provisioning", encode(connection_id));
        self.json(Method::GET, &path, &[], None, "directory provisioning", connection_id)
            .await
    }

    #[instrument(skip(self, provisioning))]
    async fn update_directory_provisioning(
        &self,
        connection_id: &str,
        provisioning: &DirectoryProvisioning,
    ) -> Result<DirectoryProvisioning> {
        let path = format!("/connections/{}/directory-provisioning", encode(connection_id));
        self.json(
            Method::PATCH,
            &path,
            &[],
            body(provisioning)?,
            "directory provisioning",
            connection_id,
        )
        .await
    }

    #[instrument(skip(self))]
    async fn delete_directory_provisioning(&self, connection_id: &str) -> Result<()> {
        let path = format!("/connections/{}/directory-provisioning", encode(connection_id));
        self.no_content(Method::DELETE, &path, "directory provisioning", connection_id)
            .await
    }

    #[instrument(skip(self, profile))]
    async fn create_connection_profile(
        &self,
        profile: &ConnectionProfile,
    ) -> Result<ConnectionProfile> {
        let name = profile.name.as_deref().unwrap_or_default();
        self.json(
            Method::POST,
            "/connection-profiles",
            &[],
            body(profile)?,
            "connection profile",
            name,
        )
        .await
    }

    #[instrument(skip(self))]
    async fn read_connection_profile(&self, id: &str) -> Result<ConnectionProfile> {
        let path = format!("/connection-profiles/{}", encode(id));
        self.json(Method::GET, &path, &[], None, "connection profile", id)
            .await
    }

    #[instrument(skip(self, profile))]
    async fn update_connection_profile(
        &self,
        id: &str,
        profile: &ConnectionProfile,
    ) -> Result<ConnectionProfile> {
        let path = format!("/connection-profiles/{}", encode(id));
        self.json(Method::PATCH, &path, &[], body(profile)?, "connection profile", id)
            .await
    }

    #[instrument(skip(self))]
    async fn delete_connection_profile(&self, id: &str) -> Result<()> {
        let path = format!("/connection-profiles/{}", encode(id));
        self.no_content(Method::DELETE, &path, "connection profile", id)
            .await
    }

    #[instrument(skip(self, domain))]
    async fn create_custom_domain(&self, domain: &CustomDomain) -> Result<CustomDomain> {
        let name = domain.domain.as_deref().unwrap_or_default();
        self.json(Method::POST, "/custom-domains", &[], body(domain)?, "custom domain", name)
            .await
    }

    #[instrument(skip(self))]
    async fn read_custom_domain(&self, id: &str) -> Result<CustomDomain> {
        let path = format!("/custom-domains/{}", encode(id));
        self.json(Method::GET, &path, &[], None, "custom domain", id).await
    }

    #[instrument(skip(self, domain))]
    async fn update_custom_domain(&self, id: &str, domain: &CustomDomain) -> Result<CustomDomain> {
        let path = format!("/custom-domains/{}", encode(id));
        self.json(Method::PATCH, &path, &[], body(domain)?, "custom domain", id)
            .await
    }

    #[instrument(skip(self))]
    async fn delete_custom_domain(&self, id: &str) -> Result<()> {
        let path = format!("/custom-domains/{}", encode(id));
        self.no_content(Method::DELETE, &path, "custom domain", id).await
    }

    #[instrument(skip(self))]
    async fn list_custom_domains(&self) -> Result<Vec<CustomDomain>> {
        self.json(Method::GET, "/custom-domains", &[], None, "custom domains", "list")
            .await
    }

    #[instrument(skip(self))]
    async fn verify_custom_domain(&self, id: &str) -> Result<CustomDomain> {
        let path = format!("/custom-domains/{}/verify", encode(id));
        self.json(Method::POST, &path, &[], None, "custom domain", id).await
    }

    #[instrument(skip(self))]
    async fn list_encryption_keys(&self) -> Result<Vec<EncryptionKey>> {
        collect_all_pages(
            |page| self.list_encryption_keys_page(page),
            self.config.per_page,
        )
        .await
    }

    #[instrument(skip(self))]
    async fn rekey_encryption_keys(&self) -> Result<()> {
        info!("Requesting encryption key rotation");
        self.no_content(Method::POST, "/keys/encryption/rekey", "encryption keys", "rekey")
            .await
    }

    #[instrument(skip(self))]
    async fn list_signing_keys(&self) -> Result<Vec<SigningKey>> {
        self.json(Method::GET, "/keys/signing", &[], None, "signing keys", "list")
            .await
    }
}
