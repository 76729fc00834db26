//! Auth0 Resources - declarative Auth0 tenant resources
//!
//! This crate provides:
//! - Attribute accessors over declared configuration and stored state
//! - Schemas with closed-vocabulary validation
//! - Expand/flatten for every connection strategy
//! - CRUD orchestration of connections, custom domains and keys
//! - `ProviderRegistry`: type name → implementation dispatch

pub mod connection;
pub mod custom_domain;
pub mod custom_domain_verification;
pub mod data;
pub mod diag;
pub mod encryption_key_manager;
pub mod provider;
pub mod schema;
pub mod signing_keys;

pub use connection::{
    ConnectionClientResource, ConnectionClientsResource, ConnectionDataSource,
    ConnectionDirectoryResource, ConnectionProfileResource, ConnectionResource,
    ScimConfigurationDataSource, ScimConfigurationResource, ScimTokenResource,
};
pub use custom_domain::{CustomDomainDataSource, CustomDomainResource};
pub use custom_domain_verification::CustomDomainVerificationResource;
pub use data::{AttrMap, AttrReader, Block, ResourceData, ResourceResponse};
pub use diag::{DiagResult, Diagnostic, Diagnostics, Severity};
pub use encryption_key_manager::EncryptionKeyManagerResource;
pub use provider::{
    DataSource, Operation, ProviderContext, ProviderRegistry, ProviderSchema, Resource,
    ResourceRequest,
};
pub use schema::{Field, FieldKind, Schema, Validator};
pub use signing_keys::SigningKeysDataSource;

/// Register every resource and data source type of the provider
pub fn register_all(registry: &mut ProviderRegistry) {
    registry.register_resource(ConnectionResource);
    registry.register_resource(ConnectionClientResource);
    registry.register_resource(ConnectionClientsResource);
    registry.register_resource(ConnectionDirectoryResource);
    registry.register_resource(ScimConfigurationResource);
    registry.register_resource(ScimTokenResource);
    registry.register_resource(ConnectionProfileResource);
    registry.register_resource(CustomDomainResource);
    registry.register_resource(CustomDomainVerificationResource::new());
    registry.register_resource(EncryptionKeyManagerResource);

    registry.register_data_source(ConnectionDataSource);
    registry.register_data_source(ScimConfigurationDataSource);
    registry.register_data_source(CustomDomainDataSource);
    registry.register_data_source(SigningKeysDataSource);
}
