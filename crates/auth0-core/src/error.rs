//! Error types for the Auth0 resource provider

use thiserror::Error;

/// Where users are sent when they hit a strategy the provider does not know.
pub const ISSUE_TRACKER_URL: &str = "https://github.com/angelerator/auth0-provider/issues";

#[derive(Error, Debug)]
pub enum Auth0Error {
    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound { entity_type: String, id: String },

    #[error("Management API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Transport error: {message}")]
    Transport { message: String },

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error(
        "Unsupported connection strategy {strategy:?}. Please raise an issue at {} to request support.",
        ISSUE_TRACKER_URL
    )]
    UnsupportedStrategy { strategy: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Timed out: {message}")]
    Timeout { message: String },

    #[error("Serialization error: {message}")]
    Serialization { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl Auth0Error {
    pub fn not_found(entity_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: entity_type.into(),
            id: id.into(),
        }
    }

    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    pub fn unsupported_strategy(strategy: impl Into<String>) -> Self {
        Self::UnsupportedStrategy {
            strategy: strategy.into(),
        }
    }

    pub fn config_error(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Timeout {
            message: message.into(),
        }
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// True when the remote object no longer exists.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::NotFound { .. } | Self::Api { status: 404, .. }
        )
    }

    /// True for errors detected before any network call was made.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidInput { .. } | Self::UnsupportedStrategy { .. } | Self::ConfigError { .. }
        )
    }
}

impl From<serde_json::Error> for Auth0Error {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization {
            message: e.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Auth0Error>;
