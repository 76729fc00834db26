//! Domain models for Auth0 Management API entities

pub mod connection;
pub mod custom_domain;
pub mod directory;
pub mod keys;
pub mod options;
pub mod profile;
pub mod scim;

pub use connection::*;
pub use custom_domain::*;
pub use directory::*;
pub use keys::*;
pub use options::*;
pub use profile::*;
pub use scim::*;
