//! Client configuration

use std::fmt;

use auth0_core::{Auth0Error, Result};

/// How the client authenticates against the Management API
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    /// Pre-issued Management API token
    ApiToken(String),
    /// Machine-to-machine application; tokens are fetched from `/oauth/token`
    ClientCredentials {
        client_id: String,
        client_secret: String,
    },
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ApiToken(_) => f.write_str("ApiToken(<redacted>)"),
            Self::ClientCredentials { client_id, .. } => f
                .debug_struct("ClientCredentials")
                .field("client_id", client_id)
                .field("client_secret", &"<redacted>")
                .finish(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ManagementConfig {
    /// Scheme and host of the tenant, e.g. `https://example.eu.auth0.com`
    pub base_url: String,
    pub credentials: Credentials,
    /// Token audience; defaults to `<base_url>/api/v2/`
    pub audience: Option<String>,
    pub timeout_secs: u64,
    /// Retries of rate-limited (429) requests
    pub max_retries: u32,
    pub retry_delay_ms: u64,
    pub per_page: u32,
    /// Log every request line at info level
    pub debug: bool,
}

impl ManagementConfig {
    /// Client using a static token against the given base URL
    pub fn with_token(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            credentials: Credentials::ApiToken(token.into()),
            audience: None,
            timeout_secs: 30,
            max_retries: 3,
            retry_delay_ms: 500,
            per_page: 50,
            debug: false,
        }
    }

    /// Build a configuration from the provider arguments.
    ///
    /// `base_url` wins over `domain`. Credentials are either `api_token`, or
    /// both `client_id` and `client_secret`.
    pub fn from_arguments(
        domain: Option<&str>,
        base_url: Option<&str>,
        api_token: Option<&str>,
        client_id: Option<&str>,
        client_secret: Option<&str>,
        audience: Option<&str>,
    ) -> Result<Self> {
        let base_url = match (non_empty(base_url), non_empty(domain)) {
            (Some(url), _) => url.trim_end_matches('/').to_string(),
            (None, Some(domain)) => format!("https://{}", domain.trim_end_matches('/')),
            (None, None) => {
                return Err(Auth0Error::config_error(
                    "the \"domain\" argument is required",
                ))
            }
        };

        let credentials = match (
            non_empty(api_token),
            non_empty(client_id),
            non_empty(client_secret),
        ) {
            (Some(token), _, _) => Credentials::ApiToken(token.to_string()),
            (None, Some(client_id), Some(client_secret)) => Credentials::ClientCredentials {
                client_id: client_id.to_string(),
                client_secret: client_secret.to_string(),
            },
            (None, Some(_), None) => {
                return Err(Auth0Error::config_error(
                    "\"client_id\" requires \"client_secret\" to be set",
                ))
            }
            (None, None, Some(_)) => {
                return Err(Auth0Error::config_error(
                    "\"client_secret\" requires \"client_id\" to be set",
                ))
            }
            (None, None, None) => {
                return Err(Auth0Error::config_error(
                    "either \"api_token\" or both \"client_id\" and \"client_secret\" must be set",
                ))
            }
        };

        let mut config = Self::with_token(base_url, "");
        config.credentials = credentials;
        config.audience = non_empty(audience).map(str::to_string);
        Ok(config)
    }

    pub fn api_url(&self, path: &str) -> String {
        format!("{}/api/v2{}", self.base_url, path)
    }

    pub fn token_url(&self) -> String {
        format!("{}/oauth/token", self.base_url)
    }

    pub fn token_audience(&self) -> String {
        self.audience
            .clone()
            .unwrap_or_else(|| format!("{}/api/v2/", self.base_url))
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_becomes_https_base_url() {
        let config = ManagementConfig::from_arguments(
            Some("example.eu.auth0.com"),
            None,
            Some("token"),
            None,
            None,
            None,
        )
        .unwrap();
        assert_eq!(config.base_url, "https://example.eu.auth0.com");
        assert_eq!(config.api_url("/connections"), "https://example.eu.auth0.com/api/v2/connections");
        assert_eq!(config.token_audience(), "https://example.eu.auth0.com/api/v2/");
    }

    #[test]
    fn test_client_credentials_require_both_halves() {
        let err = ManagementConfig::from_arguments(
            Some("example.auth0.com"),
            None,
            None,
            Some("client"),
            None,
            None,
        )
        .unwrap_err();
        assert!(err.to_string().contains("requires \"client_secret\""));

        let err = ManagementConfig::from_arguments(
            Some("example.auth0.com"),
            None,
            None,
            None,
            None,
            None,
        )
        .unwrap_err();
        assert!(err.is_configuration_error());
    }

    #[test]
    fn test_api_token_takes_precedence() {
        let config = ManagementConfig::from_arguments(
            None,
            Some("http://localhost:8080/"),
            Some("token"),
            Some("client"),
            Some("secret"),
            Some("https://custom/api/v2/"),
        )
        .unwrap();
        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.credentials, Credentials::ApiToken("token".to_string()));
        assert_eq!(config.token_audience(), "https://custom/api/v2/");
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let rendered = format!(
            "{:?}",
            Credentials::ClientCredentials {
                client_id: "client".to_string(),
                client_secret: "hunter2".to_string(),
            }
        );
        assert!(rendered.contains("client"));
        assert!(!rendered.contains("hunter2"));
    }
}
