//! OPC Provider
//!
//! Oracle Public Cloud provider for compute instances, storage attachments,
//! image list entries, orchestrations and Load Balancer Classic listeners.
//!
//! ## Module Structure
//!
//! - `api` - Request and response shapes of the OPC APIs
//! - `client` - Client traits the provider calls through
//! - `config` - Provider settings and environment fallbacks
//! - `provider` - OpcProvider implementation
//! - `resources` - Resource type definitions and schemas
//! - `network` / `storage` - Nested block transforms shared by instance resources
//! - `record` - Typed access to nested configuration blocks
//! - `instance`, `storage_attachment`, `image_list_entry`, `orchestration`,
//!   `listener` - Per-resource CRUD adapters

pub mod api;
pub mod client;
pub mod config;
pub mod image_list_entry;
pub mod instance;
pub mod listener;
pub mod network;
pub mod orchestration;
pub mod provider;
pub mod record;
pub mod resources;
pub mod storage;
pub mod storage_attachment;

#[cfg(test)]
mod testing;

// Re-export main types
pub use client::{ClientError, ComputeApi, LoadBalancerApi};
pub use config::{ConfigError, ProviderConfig};
pub use provider::OpcProvider;

use opc_core::provider::{BoxFuture, Provider, ProviderResult, ResourceType};
use opc_core::resource::{Resource, ResourceId, State};

use resources::resource_types;

// =============================================================================
// Provider Trait Implementation
// =============================================================================

impl Provider for OpcProvider {
    fn name(&self) -> &'static str {
        "opc"
    }

    fn resource_types(&self) -> Vec<Box<dyn ResourceType>> {
        resource_types()
    }

    fn read(
        &self,
        id: &ResourceId,
        identifier: Option<&str>,
    ) -> BoxFuture<'_, ProviderResult<State>> {
        let id = id.clone();
        let identifier = identifier.map(|s| s.to_string());
        Box::pin(async move { self.read_resource(&id, identifier.as_deref()).await })
    }

    fn create(&self, resource: &Resource) -> BoxFuture<'_, ProviderResult<State>> {
        let resource = resource.clone();
        Box::pin(async move { self.create_resource(&resource).await })
    }

    fn update(
        &self,
        id: &ResourceId,
        identifier: &str,
        from: &State,
        to: &Resource,
    ) -> BoxFuture<'_, ProviderResult<State>> {
        let id = id.clone();
        let identifier = identifier.to_string();
        let from = from.clone();
        let to = to.clone();
        Box::pin(async move { self.update_resource(&id, &identifier, &from, &to).await })
    }

    fn delete(&self, id: &ResourceId, identifier: &str) -> BoxFuture<'_, ProviderResult<()>> {
        let id = id.clone();
        let identifier = identifier.to_string();
        Box::pin(async move { self.delete_resource(&id, &identifier).await })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use opc_core::normalize::string_list_value;
    use opc_core::resource::Value;

    use crate::testing::{FakeCompute, FakeLoadBalancer, test_config};

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn provider() -> OpcProvider {
        OpcProvider::new(
            test_config(),
            Arc::new(FakeCompute::default()),
            Some(Arc::new(FakeLoadBalancer::default())),
        )
    }

    fn image_list_entry() -> Resource {
        Resource::new("compute_image_list_entry", "ubuntu")
            .with_attribute("name", "images")
            .with_attribute("version", 3i64)
            .with_attribute("machine_images", string_list_value(["ubuntu"]))
    }

    #[tokio::test]
    async fn test_provider_dispatch() {
        init_logger();
        let provider: Box<dyn Provider> = Box::new(provider());
        assert_eq!(provider.name(), "opc");
        assert_eq!(provider.resource_types().len(), 5);

        let resource = image_list_entry();
        let state = provider.create(&resource).await.unwrap();
        assert_eq!(state.identifier.as_deref(), Some("images|3"));

        let read_state = provider
            .read(&resource.id, state.identifier.as_deref())
            .await
            .unwrap();
        assert!(read_state.exists);

        let err = provider
            .update(&resource.id, "images|3", &read_state, &resource)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("must be replaced"));

        provider.delete(&resource.id, "images|3").await.unwrap();
        assert!(!provider.read(&resource.id, Some("images|3")).await.unwrap().exists);
    }

    fn instance() -> Resource {
        Resource::new("compute_instance", "web")
            .with_attribute("name", "web")
            .with_attribute("shape", "oc3")
            .with_attribute("ssh_keys", string_list_value(["key-b", "key-a"]))
            .with_attribute("instance_attributes", r#"{"userdata": {"role": "web"}}"#)
    }

    #[tokio::test]
    async fn test_update_rejects_force_new_change() {
        init_logger();
        let provider = provider();
        let resource = instance();
        let state = provider.create(&resource).await.unwrap();
        let identifier = state.identifier.clone().unwrap();

        let resized = resource.clone().with_attribute("shape", "oc5");
        let err = provider
            .update(&resource.id, &identifier, &state, &resized)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("'shape' cannot be changed in place"));
    }

    #[tokio::test]
    async fn test_update_ignores_equivalent_force_new_values() {
        init_logger();
        let provider = provider();
        let resource = instance();
        let state = provider.create(&resource).await.unwrap();
        let identifier = state.identifier.clone().unwrap();

        let retagged = resource
            .with_attribute(
                "ssh_keys",
                Value::List(vec![Value::from("key-b"), Value::from("key-a")]),
            )
            .with_attribute(
                "instance_attributes",
                "{\n  \"userdata\": { \"role\": \"web\" }\n}",
            )
            .with_attribute("tags", string_list_value(["prod"]));
        let updated = provider
            .update(&retagged.id, &identifier, &state, &retagged)
            .await
            .unwrap();
        assert_eq!(updated.attributes["tags"], string_list_value(["prod"]));
        assert_eq!(
            updated.attributes["instance_attributes"],
            Value::from(r#"{"userdata":{"role":"web"}}"#)
        );
    }

    #[tokio::test]
    async fn test_read_without_identifier() {
        init_logger();
        let id = ResourceId::new("compute_instance", "web");
        let state = provider().read(&id, None).await.unwrap();
        assert!(!state.exists);
    }

    #[tokio::test]
    async fn test_schema_validation_before_create() {
        init_logger();
        let resource = image_list_entry()
            .with_attribute("uri", "https://example.com")
            .with_attribute("extra", Value::Bool(true));
        let err = provider().create(&resource).await.unwrap_err();
        let message = err.to_string();
        assert!(message.contains("Unknown attribute 'extra'"));
        assert!(message.contains("'uri' is computed"));
    }

    #[tokio::test]
    async fn test_unknown_resource_type() {
        init_logger();
        let resource = Resource::new("compute_volume", "v");
        let err = provider().create(&resource).await.unwrap_err();
        assert!(err.to_string().contains("Unknown resource type: compute_volume"));
    }

    #[tokio::test]
    async fn test_lbaas_not_configured() {
        init_logger();
        let mut config = test_config();
        config.lbaas_endpoint = None;
        let provider = OpcProvider::new(
            config,
            Arc::new(FakeCompute::default()),
            Some(Arc::new(FakeLoadBalancer::default())),
        );

        let id = ResourceId::new("lbaas_listener", "http");
        let err = provider
            .read(&id, Some("region/lb/listener"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("lbaas_endpoint"));
    }
}
