//! Resource and data source traits, and the registry the host dispatches to

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use auth0_core::{Auth0Error, ManagementApi};
use auth0_management::KeyedLocks;

use crate::data::{AttrMap, AttrReader, ResourceData, ResourceResponse};
use crate::diag::{DiagResult, Diagnostic, Diagnostics};
use crate::schema::Schema;

/// Process-wide session shared by every operation
#[derive(Clone)]
pub struct ProviderContext {
    pub api: Arc<dyn ManagementApi>,
    /// Per-connection locks for read-modify-write of shared lists
    pub locks: KeyedLocks,
}

impl ProviderContext {
    pub fn new(api: Arc<dyn ManagementApi>) -> Self {
        Self {
            api,
            locks: KeyedLocks::new(),
        }
    }
}

/// Managed resource type
#[async_trait]
pub trait Resource: Send + Sync {
    fn type_name(&self) -> &'static str;

    fn schema(&self) -> Schema;

    async fn create(&self, ctx: &ProviderContext, d: &mut ResourceData) -> DiagResult;

    /// Refresh state; clears the ID when the remote object is gone
    async fn read(&self, ctx: &ProviderContext, d: &mut ResourceData) -> DiagResult;

    async fn update(&self, ctx: &ProviderContext, d: &mut ResourceData) -> DiagResult;

    async fn delete(&self, ctx: &ProviderContext, d: &mut ResourceData) -> DiagResult;

    /// Adopt an existing remote object by ID
    async fn import(&self, ctx: &ProviderContext, d: &mut ResourceData) -> DiagResult {
        self.read(ctx, d).await
    }
}

/// Read-only lookup type
#[async_trait]
pub trait DataSource: Send + Sync {
    fn type_name(&self) -> &'static str;

    fn schema(&self) -> Schema;

    async fn read(&self, ctx: &ProviderContext, d: &mut ResourceData) -> DiagResult;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    Read,
    Update,
    Delete,
    Import,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Read => "read",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Import => "import",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = Auth0Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "create" => Ok(Self::Create),
            "read" => Ok(Self::Read),
            "update" => Ok(Self::Update),
            "delete" => Ok(Self::Delete),
            "import" => Ok(Self::Import),
            other => Err(Auth0Error::invalid_input(format!("unknown operation {:?}", other))),
        }
    }
}

/// Body of every resource and data source call
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResourceRequest {
    #[serde(default)]
    pub id: Option<String>,
    /// Declared configuration
    #[serde(default)]
    pub config: AttrMap,
    /// Prior stored state
    #[serde(default)]
    pub state: AttrMap,
}

/// Schemas of every registered type
#[derive(Debug, Clone, Serialize)]
pub struct ProviderSchema {
    pub resources: BTreeMap<&'static str, Schema>,
    pub data_sources: BTreeMap<&'static str, Schema>,
}

/// Maps type names to implementations and runs operations against them
pub struct ProviderRegistry {
    context: ProviderContext,
    resources: BTreeMap<&'static str, Arc<dyn Resource>>,
    data_sources: BTreeMap<&'static str, Arc<dyn DataSource>>,
}

impl ProviderRegistry {
    /// Registry without any types
    pub fn empty(context: ProviderContext) -> Self {
        Self {
            context,
            resources: BTreeMap::new(),
            data_sources: BTreeMap::new(),
        }
    }

    /// Registry with every resource and data source of the provider
    pub fn new(context: ProviderContext) -> Self {
        let mut registry = Self::empty(context);
        crate::register_all(&mut registry);
        registry
    }

    pub fn register_resource(&mut self, resource: impl Resource + 'static) {
        self.resources.insert(resource.type_name(), Arc::new(resource));
    }

    pub fn register_data_source(&mut self, data_source: impl DataSource + 'static) {
        self.data_sources
            .insert(data_source.type_name(), Arc::new(data_source));
    }

    pub fn context(&self) -> &ProviderContext {
        &self.context
    }

    pub fn resource(&self, type_name: &str) -> Result<Arc<dyn Resource>, Auth0Error> {
        self.resources
            .get(type_name)
            .cloned()
            .ok_or_else(|| Auth0Error::invalid_input(format!("unknown resource type {:?}", type_name)))
    }

    pub fn data_source(&self, type_name: &str) -> Result<Arc<dyn DataSource>, Auth0Error> {
        self.data_sources
            .get(type_name)
            .cloned()
            .ok_or_else(|| Auth0Error::invalid_input(format!("unknown data source type {:?}", type_name)))
    }

    pub fn resource_types(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.resources.keys().copied()
    }

    pub fn data_source_types(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.data_sources.keys().copied()
    }

    pub fn schemas(&self) -> ProviderSchema {
        ProviderSchema {
            resources: self.resources.iter().map(|(k, r)| (*k, r.schema())).collect(),
            data_sources: self.data_sources.iter().map(|(k, d)| (*k, d.schema())).collect(),
        }
    }

    /// Run one resource operation and report the resulting state
    #[instrument(skip(self, request), fields(id = request.id.as_deref().unwrap_or("")))]
    pub async fn apply(
        &self,
        type_name: &str,
        operation: Operation,
        request: ResourceRequest,
    ) -> ResourceResponse {
        let resource = match self.resource(type_name) {
            Ok(resource) => resource,
            Err(e) => return ResourceResponse::failed(e.into()),
        };
        let schema = resource.schema();

        if matches!(operation, Operation::Create | Operation::Update) {
            let diags = schema.validate(&request.config);
            if diags.has_error() {
                debug!("Configuration rejected with {} diagnostics", diags.len());
                return ResourceResponse::failed(diags);
            }
        }

        let mut d = match (operation, request.id) {
            (Operation::Create, _) => ResourceData::for_create(request.config),
            (_, None) => {
                return ResourceResponse::failed(
                    Diagnostic::error(format!("{} requires a resource ID", operation)).into(),
                )
            }
            (Operation::Read, Some(id)) => ResourceData::for_read(id, request.state),
            (Operation::Update, Some(id)) => ResourceData::for_update(id, request.state, request.config),
            (Operation::Delete, Some(id)) => ResourceData::for_delete(id, request.state),
            (Operation::Import, Some(id)) => ResourceData::for_import(id),
        };

        if operation == Operation::Update {
            if let Err(e) = schema.check_immutable(&d) {
                return d.into_response(e.into());
            }
        }

        let ctx = &self.context;
        let result = match operation {
            Operation::Create => resource.create(ctx, &mut d).await,
            Operation::Read => resource.read(ctx, &mut d).await,
            Operation::Update => resource.update(ctx, &mut d).await,
            Operation::Delete => resource.delete(ctx, &mut d).await,
            Operation::Import => resource.import(ctx, &mut d).await,
        };

        match result {
            Ok(diagnostics) => {
                if operation == Operation::Delete {
                    d.clear_id();
                }
                if d.is_removed() && operation != Operation::Delete {
                    info!("{} no longer exists remotely, removing from state", type_name);
                }
                d.into_response(diagnostics)
            }
            Err(diagnostics) => {
                warn!("{} {} failed: {}", type_name, operation, summarize(&diagnostics));
                d.into_response(diagnostics)
            }
        }
    }

    /// Run a data source lookup
    #[instrument(skip(self, request))]
    pub async fn read_data_source(&self, type_name: &str, request: ResourceRequest) -> ResourceResponse {
        let data_source = match self.data_source(type_name) {
            Ok(data_source) => data_source,
            Err(e) => return ResourceResponse::failed(e.into()),
        };

        let diags = data_source.schema().validate(&request.config);
        if diags.has_error() {
            return ResourceResponse::failed(diags);
        }

        let mut d = ResourceData::for_create(request.config);
        match data_source.read(&self.context, &mut d).await {
            Ok(diagnostics) => d.into_response(diagnostics),
            Err(diagnostics) => {
                warn!("{} read failed: {}", type_name, summarize(&diagnostics));
                ResourceResponse::failed(diagnostics)
            }
        }
    }
}

fn summarize(diagnostics: &Diagnostics) -> String {
    diagnostics
        .errors()
        .map(|d| d.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Clear the ID when the remote object no longer exists
pub fn remove_if_not_found<T>(
    d: &mut ResourceData,
    result: Result<T, Auth0Error>,
) -> DiagResult<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.is_not_found() => {
            debug!("Remote object gone: {}", e);
            d.clear_id();
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

/// Deleting an object that is already gone succeeds
pub fn ignore_not_found(result: Result<(), Auth0Error>) -> DiagResult {
    match result {
        Ok(()) => Ok(Diagnostics::new()),
        Err(e) if e.is_not_found() => {
            debug!("Already deleted: {}", e);
            Ok(Diagnostics::new())
        }
        Err(e) => Err(e.into()),
    }
}

/// Required string attribute, as a configuration error when missing
pub fn required_string(d: &ResourceData, key: &str) -> Result<String, Auth0Error> {
    d.string(key)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| Auth0Error::invalid_input(format!("{:?} is required", key)))
}
