//! Connection entity

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::error::{Auth0Error, Result};
use crate::models::options::ConnectionOptions;
use crate::strategy::Strategy;

/// An Auth0 identity source (database, social, enterprise or passwordless)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawConnection", into = "RawConnection")]
pub struct Connection {
    pub id: Option<String>,
    /// Immutable after creation
    pub name: Option<String>,
    pub display_name: Option<String>,
    /// Immutable after creation; selects the options shape
    pub strategy: Option<Strategy>,
    pub is_domain_connection: Option<bool>,
    pub metadata: Option<BTreeMap<String, String>>,
    pub realms: Option<Vec<String>>,
    pub enabled_clients: Option<Vec<String>>,
    pub show_as_button: Option<bool>,
    pub options: Option<ConnectionOptions>,
}

impl Connection {
    pub fn id(&self) -> Result<&str> {
        self.id
            .as_deref()
            .ok_or_else(|| Auth0Error::internal_error("Connection response is missing its id"))
    }

    /// Body containing only the enabled clients list, for read-modify-write updates
    pub fn with_enabled_clients(enabled_clients: Vec<String>) -> Self {
        Self {
            enabled_clients: Some(enabled_clients),
            ..Default::default()
        }
    }
}

/// Wire form, where `options` stays untyped until the strategy is known
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawConnection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategy: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_domain_connection: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub realms: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled_clients: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_as_button: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Value>,
}

impl TryFrom<RawConnection> for Connection {
    type Error = Auth0Error;

    fn try_from(raw: RawConnection) -> Result<Self> {
        let strategy = raw
            .strategy
            .as_deref()
            .map(str::parse::<Strategy>)
            .transpose()?;

        let options = match (strategy, raw.options) {
            (Some(strategy), Some(value)) if !value.is_null() => {
                Some(ConnectionOptions::from_value(strategy, value)?)
            }
            (None, Some(value)) if !value.is_null() => {
                return Err(Auth0Error::invalid_input(
                    "Connection options cannot be decoded without a strategy",
                ));
            }
            _ => None,
        };

        Ok(Self {
            id: raw.id,
            name: raw.name,
            display_name: raw.display_name,
            strategy,
            is_domain_connection: raw.is_domain_connection,
            metadata: raw.metadata,
            realms: raw.realms,
            enabled_clients: raw.enabled_clients,
            show_as_button: raw.show_as_button,
            options,
        })
    }
}

impl From<Connection> for RawConnection {
    fn from(connection: Connection) -> Self {
        Self {
            id: connection.id,
            name: connection.name,
            display_name: connection.display_name,
            strategy: connection.strategy.map(|s| s.as_str().to_string()),
            is_domain_connection: connection.is_domain_connection,
            metadata: connection.metadata,
            realms: connection.realms,
            enabled_clients: connection.enabled_clients,
            show_as_button: connection.show_as_button,
            // Option records only hold serializable data
            options: connection.options.and_then(|o| o.to_value().ok()),
        }
    }
}

/// One page of `GET /connections?include_totals=true`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConnectionList {
    #[serde(default)]
    pub connections: Vec<Connection>,
    #[serde(default)]
    pub start: u32,
    #[serde(default)]
    pub limit: u32,
    #[serde(default)]
    pub total: u32,
}

/// Filters for listing connections
#[derive(Debug, Clone, Default)]
pub struct ConnectionFilter {
    pub name: Option<String>,
    pub strategy: Option<Strategy>,
}
