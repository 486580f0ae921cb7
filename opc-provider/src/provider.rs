//! OPC Provider implementation
//!
//! Holds the API clients handed in by the caller and dispatches each resource
//! operation to the adapter of its resource type.

use std::sync::Arc;

use opc_core::provider::{ProviderError, ProviderResult};
use opc_core::resource::{Resource, ResourceId, State, Value};
use opc_core::schema::ResourceSchema;

use crate::client::{ClientError, ComputeApi, LoadBalancerApi};
use crate::config::{ConfigError, ProviderConfig};
use crate::record::canonical_json;
use crate::resources::{
    IMAGE_LIST_ENTRY, INSTANCE, LBAAS_LISTENER, ORCHESTRATED_INSTANCE, STORAGE_ATTACHMENT,
    schema_for,
};
use crate::{image_list_entry, instance, listener, orchestration, storage_attachment};

/// Map an API failure onto a provider error for `id`
pub(crate) fn api_error<'a>(
    id: &'a ResourceId,
    action: &'a str,
) -> impl FnOnce(ClientError) -> ProviderError + 'a {
    move |e| {
        ProviderError::new(format!("Failed to {}: {}", action, e))
            .for_resource(id.clone())
            .with_cause(e)
    }
}

/// First force-new attribute whose configured value differs from state
///
/// Only attributes present on both sides are compared. Nested blocks carry
/// computed fields and are not compared.
fn replaced_attribute<'a>(
    schema: &'a ResourceSchema,
    from: &State,
    to: &Resource,
) -> Option<&'a str> {
    schema.force_new_attributes().into_iter().find(|name| {
        match (from.attributes.get(*name), to.attributes.get(*name)) {
            (Some(current), Some(desired)) => differs(name, current, desired),
            _ => false,
        }
    })
}

fn differs(name: &str, current: &Value, desired: &Value) -> bool {
    match (current, desired) {
        (Value::String(a), Value::String(b)) if a != b => {
            // JSON documents are stored in canonical form
            match (canonical_json(name, a), canonical_json(name, b)) {
                (Ok(a), Ok(b)) => a != b,
                _ => true,
            }
        }
        (Value::List(a), Value::List(b)) => match (scalar_list(a), scalar_list(b)) {
            (Some(a), Some(b)) => a != b,
            _ => false,
        },
        _ => current != desired,
    }
}

/// Sorted text of a list of scalars; `None` for a list of blocks
fn scalar_list(items: &[Value]) -> Option<Vec<String>> {
    let mut list = items
        .iter()
        .map(|item| match item {
            Value::String(s) => Some(s.clone()),
            Value::Int(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            Value::List(_) | Value::Map(_) => None,
        })
        .collect::<Option<Vec<_>>>()?;
    list.sort();
    Some(list)
}

/// OPC Provider
pub struct OpcProvider {
    config: ProviderConfig,
    compute: Arc<dyn ComputeApi>,
    lbaas: Option<Arc<dyn LoadBalancerApi>>,
}

impl OpcProvider {
    /// Create a provider over the given clients
    ///
    /// The load balancer client is only kept when an LBaaS endpoint is
    /// configured.
    pub fn new(
        config: ProviderConfig,
        compute: Arc<dyn ComputeApi>,
        lbaas: Option<Arc<dyn LoadBalancerApi>>,
    ) -> Self {
        let lbaas = lbaas.filter(|_| config.lbaas_endpoint.is_some());
        if lbaas.is_none() {
            log::debug!("Load Balancer Classic client not configured");
        }
        Self {
            config,
            compute,
            lbaas,
        }
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    fn lbaas(&self, id: &ResourceId) -> ProviderResult<&dyn LoadBalancerApi> {
        self.lbaas.as_deref().ok_or_else(|| {
            let err = ConfigError::LbaasNotConfigured(id.resource_type.clone());
            ProviderError::new(err.to_string())
                .for_resource(id.clone())
                .with_cause(err)
        })
    }

    fn unknown_type(id: &ResourceId) -> ProviderError {
        ProviderError::new(format!("Unknown resource type: {}", id.resource_type))
            .for_resource(id.clone())
    }

    /// Check a resource against the schema of its type
    fn validate(&self, resource: &Resource) -> ProviderResult<ResourceSchema> {
        let schema =
            schema_for(&resource.id.resource_type).ok_or_else(|| Self::unknown_type(&resource.id))?;
        schema.validate(&resource.attributes).map_err(|errors| {
            let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            ProviderError::new(format!("Invalid configuration: {}", messages.join("; ")))
                .for_resource(resource.id.clone())
        })?;
        Ok(schema)
    }

    pub async fn read_resource(
        &self,
        id: &ResourceId,
        identifier: Option<&str>,
    ) -> ProviderResult<State> {
        let Some(identifier) = identifier else {
            return Ok(State::not_found(id.clone()));
        };
        let compute = self.compute.as_ref();

        match id.resource_type.as_str() {
            INSTANCE => instance::read(compute, id, identifier).await,
            STORAGE_ATTACHMENT => storage_attachment::read(compute, id, identifier).await,
            IMAGE_LIST_ENTRY => image_list_entry::read(compute, &self.config, id, identifier).await,
            ORCHESTRATED_INSTANCE => {
                orchestration::read(compute, &self.config, id, identifier).await
            }
            LBAAS_LISTENER => listener::read(self.lbaas(id)?, id, identifier).await,
            _ => Err(Self::unknown_type(id)),
        }
    }

    pub async fn create_resource(&self, resource: &Resource) -> ProviderResult<State> {
        self.validate(resource)?;
        log::debug!("Creating {}", resource.id);
        let compute = self.compute.as_ref();

        match resource.id.resource_type.as_str() {
            INSTANCE => instance::create(compute, &self.config, resource).await,
            STORAGE_ATTACHMENT => storage_attachment::create(compute, resource).await,
            IMAGE_LIST_ENTRY => image_list_entry::create(compute, &self.config, resource).await,
            ORCHESTRATED_INSTANCE => orchestration::create(compute, &self.config, resource).await,
            LBAAS_LISTENER => listener::create(self.lbaas(&resource.id)?, resource).await,
            _ => Err(Self::unknown_type(&resource.id)),
        }
    }

    pub async fn update_resource(
        &self,
        id: &ResourceId,
        identifier: &str,
        from: &State,
        to: &Resource,
    ) -> ProviderResult<State> {
        let schema = self.validate(to)?;
        if from.exists
            && let Some(name) = replaced_attribute(&schema, from, to)
        {
            return Err(ProviderError::new(format!(
                "'{}' cannot be changed in place; the resource must be replaced",
                name
            ))
            .for_resource(id.clone()));
        }
        log::debug!("Updating {} ({})", id, identifier);
        let compute = self.compute.as_ref();

        match id.resource_type.as_str() {
            INSTANCE => instance::update(compute, id, identifier, to).await,
            ORCHESTRATED_INSTANCE => orchestration::update(compute, &self.config, id, to).await,
            LBAAS_LISTENER => listener::update(self.lbaas(id)?, id, to).await,
            STORAGE_ATTACHMENT | IMAGE_LIST_ENTRY => Err(ProviderError::new(format!(
                "{} does not support in-place updates; it must be replaced",
                id.resource_type
            ))
            .for_resource(id.clone())),
            _ => Err(Self::unknown_type(id)),
        }
    }

    pub async fn delete_resource(&self, id: &ResourceId, identifier: &str) -> ProviderResult<()> {
        log::debug!("Deleting {} ({})", id, identifier);
        let compute = self.compute.as_ref();

        match id.resource_type.as_str() {
            INSTANCE => instance::delete(compute, id, identifier).await,
            STORAGE_ATTACHMENT => storage_attachment::delete(compute, id, identifier).await,
            IMAGE_LIST_ENTRY => {
                image_list_entry::delete(compute, &self.config, id, identifier).await
            }
            ORCHESTRATED_INSTANCE => {
                orchestration::delete(compute, &self.config, id, identifier).await
            }
            LBAAS_LISTENER => listener::delete(self.lbaas(id)?, id, identifier).await,
            _ => Err(Self::unknown_type(id)),
        }
    }
}
