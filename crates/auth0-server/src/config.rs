//! Server configuration

use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub auth0: Auth0Settings,
}

#[derive(Debug, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Provider arguments; credential rules are enforced by `ManagementConfig::from_arguments`
#[derive(Deserialize, Default)]
pub struct Auth0Settings {
    pub domain: Option<String>,
    /// Overrides `https://<domain>`
    pub base_url: Option<String>,
    pub api_token: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub audience: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default)]
    pub debug: bool,
}

impl std::fmt::Debug for Auth0Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Auth0Settings")
            .field("domain", &self.domain)
            .field("base_url", &self.base_url)
            .field("client_id", &self.client_id)
            .field("audience", &self.audience)
            .field("timeout_secs", &self.timeout_secs)
            .field("max_retries", &self.max_retries)
            .field("debug", &self.debug)
            .finish_non_exhaustive()
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8089
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Conventional variables; they take precedence over the `AUTH0_AUTH0__*` form
const ARGUMENT_VARIABLES: &[(&str, &str)] = &[
    ("auth0.domain", "AUTH0_DOMAIN"),
    ("auth0.api_token", "AUTH0_API_TOKEN"),
    ("auth0.client_id", "AUTH0_CLIENT_ID"),
    ("auth0.client_secret", "AUTH0_CLIENT_SECRET"),
    ("auth0.audience", "AUTH0_AUDIENCE"),
];

impl Settings {
    pub fn load() -> Result<Self> {
        Self::load_with(|name| std::env::var(name).ok())
    }

    fn load_with(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut builder = config::Config::builder()
            .set_default("server.host", default_host())?
            .set_default("server.port", i64::from(default_port()))?
            .set_default("auth0.timeout_secs", default_timeout_secs() as i64)?
            .set_default("auth0.max_retries", i64::from(default_max_retries()))?
            // Load from config file if present
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            // Load from environment variables with AUTH0_ prefix
            .add_source(
                config::Environment::with_prefix("AUTH0")
                    .separator("__")
                    .try_parsing(true),
            );

        for (key, variable) in ARGUMENT_VARIABLES {
            builder = builder.set_override_option(*key, lookup(variable).filter(|v| !v.is_empty()))?;
        }

        Ok(builder.build()?.try_deserialize()?)
    }
}
