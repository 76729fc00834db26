//! Strongly-typed identifiers for Auth0 entities

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Auth0Error, Result};

/// Macro to generate strongly-typed wrappers around Auth0's opaque string IDs
macro_rules! define_id {
    ($name:ident, $prefix:literal) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn into_string(self) -> String {
                self.0
            }

            /// Whether the ID carries the prefix Auth0 assigns to this entity
            pub fn has_expected_prefix(&self) -> bool {
                self.0.starts_with(concat!($prefix, "_"))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_id!(ConnectionId, "con");
define_id!(ClientId, "client");
define_id!(CustomDomainId, "cd");
define_id!(ScimTokenId, "tok");
define_id!(ConnectionProfileId, "cop");

/// Separator used by composite import IDs such as `con_123:client_456`
pub const COMPOSITE_ID_SEPARATOR: char = ':';

/// An ID made of two parts, used for child resources keyed by their parent
/// connection (enabled clients, SCIM tokens).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositeId {
    pub parent: String,
    pub child: String,
}

impl CompositeId {
    pub fn new(parent: impl Into<String>, child: impl Into<String>) -> Self {
        Self {
            parent: parent.into(),
            child: child.into(),
        }
    }

    /// Parse `<parent>:<child>`, naming the expected parts in the error.
    pub fn parse(id: &str, parent_name: &str, child_name: &str) -> Result<Self> {
        if id.is_empty() {
            return Err(Auth0Error::invalid_input("ID cannot be empty"));
        }

        let parts: Vec<&str> = id.split(COMPOSITE_ID_SEPARATOR).collect();
        match parts.as_slice() {
            [parent, child] if !parent.is_empty() && !child.is_empty() => {
                Ok(Self::new(*parent, *child))
            }
            _ => Err(Auth0Error::invalid_input(format!(
                "ID must be formatted as <{}>{}<{}>",
                parent_name, COMPOSITE_ID_SEPARATOR, child_name
            ))),
        }
    }

    /// Parse a `<connectionID>:<clientID>` import ID.
    pub fn parse_connection_client(id: &str) -> Result<(ConnectionId, ClientId)> {
        let parsed = Self::parse(id, "connectionID", "clientID")?;
        Ok((parsed.parent.into(), parsed.child.into()))
    }
}

impl fmt::Display for CompositeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.parent, COMPOSITE_ID_SEPARATOR, self.child)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_prefix() {
        assert!(ConnectionId::new("con_123").has_expected_prefix());
        assert!(!ConnectionId::new("cd_123").has_expected_prefix());
    }

    #[test]
    fn test_composite_id_parsing() {
        let (connection_id, client_id) =
            CompositeId::parse_connection_client("conn_5678:client_1234").unwrap();
        assert_eq!(connection_id.as_str(), "conn_5678");
        assert_eq!(client_id.as_str(), "client_1234");
    }

    #[test]
    fn test_composite_id_rejects_empty() {
        let err = CompositeId::parse_connection_client("").unwrap_err();
        assert_eq!(err.to_string(), "Invalid input: ID cannot be empty");
    }

    #[test]
    fn test_composite_id_rejects_bad_separators() {
        for id in ["conn_5678", "conn_5678:client_1234:extra", ":client_1234", "conn_5678:"] {
            let err = CompositeId::parse_connection_client(id).unwrap_err();
            assert_eq!(
                err.to_string(),
                "Invalid input: ID must be formatted as <connectionID>:<clientID>",
                "id {id:?}"
            );
        }
    }

    #[test]
    fn test_composite_id_display() {
        assert_eq!(CompositeId::new("con_1", "tok_2").to_string(), "con_1:tok_2");
    }
}
