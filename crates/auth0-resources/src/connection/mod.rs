//! Connections and their child resources

pub mod clients;
pub mod directory;
pub mod expand;
pub mod flatten;
pub mod profile;
pub mod resource;
pub mod schema;
pub mod scim;


pub use clients::{ConnectionClientResource, ConnectionClientsResource};
pub use directory::ConnectionDirectoryResource;
pub use expand::{check_unmanaged_configuration, expand_connection};
pub use flatten::{flatten_connection, flatten_options, user_root_attributes};
pub use profile::ConnectionProfileResource;
pub use resource::{ConnectionDataSource, ConnectionResource};
pub use scim::{ScimConfigurationDataSource, ScimConfigurationResource, ScimTokenResource};
