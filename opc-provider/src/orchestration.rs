//! Orchestrated instances - an orchestration whose objects are instances
//!
//! Each `instance` block is expanded with the same launch mapping as a
//! standalone instance. On read, objects report the live instance when one
//! has been launched and fall back to the stored template otherwise.

use std::collections::{HashMap, HashSet};

use opc_core::id::unqualify_name;
use opc_core::normalize::{int_list_value, string_list_value};
use opc_core::provider::{ProviderError, ProviderResult};
use opc_core::resource::{Resource, ResourceId, State, Value};
use opc_core::{Error, Result};

use crate::api::{CreateInstanceInput, OrchestrationInfo, OrchestrationInput, OrchestrationObject};
use crate::client::{ComputeApi, optional};
use crate::config::ProviderConfig;
use crate::instance::{instance_attributes, launch_input};
use crate::network::flatten_network_interfaces_value;
use crate::provider::api_error;
use crate::record::{Record, records};
use crate::storage::StorageAttachment;

const OBJECT_TYPE_INSTANCE: &str = "Instance";

/// Build the orchestration request from configuration
pub fn orchestration_input(
    resource: &Resource,
    config: &ProviderConfig,
) -> Result<OrchestrationInput> {
    let record = Record::from_map("orchestrated instance", &resource.attributes);

    let mut labels = HashSet::new();
    let mut objects = Vec::new();
    for instance in records("instance", resource.attributes.get("instance"))? {
        let label = instance.require_string("label")?;
        if !labels.insert(label.clone()) {
            return Err(Error::validation(format!(
                "Duplicate instance label '{}' in orchestration",
                label
            )));
        }
        objects.push(OrchestrationObject {
            label,
            object_type: OBJECT_TYPE_INSTANCE.to_string(),
            persistent: instance.bool("persistent")?.unwrap_or(false),
            template: launch_input(&instance, config)?,
        });
    }
    if objects.is_empty() {
        return Err(Error::validation(
            "at least one instance block is required",
        ));
    }

    Ok(OrchestrationInput {
        name: config.qualified_name(&record.require_string("name")?),
        desired_state: record.require_string("desired_state")?,
        description: record.string("description")?,
        objects,
    })
}

/// Attributes of an instance block built from its launch template
fn template_attributes(template: &CreateInstanceInput) -> Result<HashMap<String, Value>> {
    let mut attributes = HashMap::new();
    attributes.insert("name".to_string(), Value::from(unqualify_name(&template.name)));
    attributes.insert("shape".to_string(), Value::from(template.shape.as_str()));
    attributes.insert("reverse_dns".to_string(), Value::Bool(template.reverse_dns));
    for (key, value) in [
        ("image_list", &template.image_list),
        ("hostname", &template.hostname),
        ("desired_state", &template.desired_state),
    ] {
        if let Some(v) = value.as_deref().filter(|v| !v.is_empty()) {
            attributes.insert(key.to_string(), Value::from(v));
        }
    }
    if !template.ssh_keys.is_empty() {
        attributes.insert(
            "ssh_keys".to_string(),
            string_list_value(template.ssh_keys.iter().cloned()),
        );
    }
    if !template.tags.is_empty() {
        attributes.insert(
            "tags".to_string(),
            string_list_value(template.tags.iter().cloned()),
        );
    }
    if !template.boot_order.is_empty() {
        attributes.insert(
            "boot_order".to_string(),
            int_list_value(template.boot_order.iter().copied()),
        );
    }
    if !template.storage.is_empty() {
        let storage = template
            .storage
            .iter()
            .map(|s| {
                StorageAttachment {
                    index: s.index,
                    volume: s.volume.clone(),
                    name: None,
                }
                .to_value()
            })
            .collect();
        attributes.insert("storage".to_string(), Value::List(storage));
    }
    if !template.networking.is_empty() {
        attributes.insert(
            "networking_info".to_string(),
            flatten_network_interfaces_value(&template.networking)?,
        );
    }
    Ok(attributes)
}

/// Attributes written to state for an orchestration configured as `name`
pub fn orchestration_attributes(
    name: &str,
    info: &OrchestrationInfo,
) -> Result<HashMap<String, Value>> {
    let mut instances = Vec::with_capacity(info.objects.len());
    for object in &info.objects {
        let mut attributes = match &object.instance {
            Some(live) => instance_attributes(live)?,
            None => template_attributes(&object.template)?,
        };
        attributes.insert("label".to_string(), Value::from(object.label.as_str()));
        attributes.insert("persistent".to_string(), Value::Bool(object.persistent));
        instances.push(Value::Map(attributes));
    }

    let mut attributes = HashMap::new();
    attributes.insert("name".to_string(), Value::from(name));
    attributes.insert(
        "desired_state".to_string(),
        Value::from(info.desired_state.as_str()),
    );
    if let Some(description) = info.description.as_deref().filter(|d| !d.is_empty()) {
        attributes.insert("description".to_string(), Value::from(description));
    }
    if !info.status.is_empty() {
        attributes.insert("status".to_string(), Value::from(info.status.as_str()));
    }
    attributes.insert("instance".to_string(), Value::List(instances));
    Ok(attributes)
}

fn to_state(id: &ResourceId, name: &str, info: &OrchestrationInfo) -> ProviderResult<State> {
    let attributes = orchestration_attributes(name, info)
        .map_err(|e| ProviderError::from(e).for_resource(id.clone()))?;
    Ok(State::existing(id.clone(), attributes).with_identifier(name))
}

fn configured_name(resource: &Resource) -> ProviderResult<&str> {
    resource
        .require_string("name")
        .map_err(|e| ProviderError::from(e).for_resource(resource.id.clone()))
}

pub async fn create(
    compute: &dyn ComputeApi,
    config: &ProviderConfig,
    resource: &Resource,
) -> ProviderResult<State> {
    let input = orchestration_input(resource, config)
        .map_err(|e| ProviderError::from(e).for_resource(resource.id.clone()))?;
    log::info!(
        "Creating orchestration {} with {} instance(s)",
        input.name,
        input.objects.len()
    );
    let info = compute
        .create_orchestration(&input)
        .await
        .map_err(api_error(&resource.id, "create orchestration"))?;
    to_state(&resource.id, configured_name(resource)?, &info)
}

pub async fn read(
    compute: &dyn ComputeApi,
    config: &ProviderConfig,
    id: &ResourceId,
    identifier: &str,
) -> ProviderResult<State> {
    match optional(compute.get_orchestration(&config.qualified_name(identifier)).await)
        .map_err(api_error(id, "read orchestration"))?
    {
        Some(info) => to_state(id, identifier, &info),
        None => Ok(State::not_found(id.clone())),
    }
}

pub async fn update(
    compute: &dyn ComputeApi,
    config: &ProviderConfig,
    id: &ResourceId,
    to: &Resource,
) -> ProviderResult<State> {
    let input = orchestration_input(to, config)
        .map_err(|e| ProviderError::from(e).for_resource(id.clone()))?;
    log::info!("Updating orchestration {} to {}", input.name, input.desired_state);
    let info = compute
        .update_orchestration(&input)
        .await
        .map_err(api_error(id, "update orchestration"))?;
    to_state(id, configured_name(to)?, &info)
}

pub async fn delete(
    compute: &dyn ComputeApi,
    config: &ProviderConfig,
    id: &ResourceId,
    identifier: &str,
) -> ProviderResult<()> {
    log::info!("Deleting orchestration {}", identifier);
    match compute
        .delete_orchestration(&config.qualified_name(identifier))
        .await
    {
        Err(e) if e.is_not_found() => Ok(()),
        result => result.map_err(api_error(id, "delete orchestration")),
    }
}
