//! Compute instance - mapping between configuration and the Instances API
//!
//! The same launch mapping serves standalone instances and the instance
//! blocks of an orchestration.

use std::collections::HashMap;

use opc_core::id::{InstanceId, unqualify_name};
use opc_core::normalize::{int_list_value, normalize_strings, string_list_value};
use opc_core::provider::{ProviderError, ProviderResult};
use opc_core::resource::{Resource, ResourceId, State, Value};
use opc_core::Result;

use crate::api::{CreateInstanceInput, InstanceInfo, UpdateInstanceInput};
use crate::client::{ComputeApi, optional};
use crate::config::ProviderConfig;
use crate::network::{expand_network_interfaces, flatten_network_interfaces_value};
use crate::provider::api_error;
use crate::record::{Record, json_value};
use crate::storage::{expand_storage_attachments, flatten_storage_attachments_value};

/// Build the launch request from an instance record
pub fn launch_input(record: &Record<'_>, config: &ProviderConfig) -> Result<CreateInstanceInput> {
    let fields = record.fields();

    let attributes = record.json("instance_attributes")?;

    let boot_order = opc_core::normalize::get_int_list(fields, "boot_order")?;

    Ok(CreateInstanceInput {
        name: config.qualified_name(&record.require_string("name")?),
        shape: record.require_string("shape")?,
        image_list: record.string("image_list")?,
        label: record.string("label")?,
        hostname: record.string("hostname")?,
        ssh_keys: record.strings("ssh_keys")?,
        tags: record.strings("tags")?,
        boot_order,
        storage: expand_storage_attachments(fields.get("storage"))?,
        networking: expand_network_interfaces(fields.get("networking_info"))?,
        reverse_dns: record.bool("reverse_dns")?.unwrap_or(true),
        desired_state: record.string("desired_state")?,
        attributes,
    })
}

/// Attributes written to state for an instance
pub fn instance_attributes(info: &InstanceInfo) -> Result<HashMap<String, Value>> {
    let mut attributes = HashMap::new();
    attributes.insert("name".to_string(), Value::from(unqualify_name(&info.name)));
    attributes.insert("id".to_string(), Value::from(info.id.as_str()));
    attributes.insert("shape".to_string(), Value::from(info.shape.as_str()));
    attributes.insert("reverse_dns".to_string(), Value::Bool(info.reverse_dns));

    for (key, value) in [
        ("image_list", &info.image_list),
        ("label", &info.label),
        ("hostname", &info.hostname),
        ("ip_address", &info.ip_address),
    ] {
        if let Some(v) = value.as_deref().filter(|v| !v.is_empty()) {
            attributes.insert(key.to_string(), Value::from(v));
        }
    }
    if !info.state.is_empty() {
        attributes.insert("state".to_string(), Value::from(info.state.as_str()));
    }

    if !info.ssh_keys.is_empty() {
        attributes.insert(
            "ssh_keys".to_string(),
            string_list_value(info.ssh_keys.iter().cloned()),
        );
    }
    if !info.tags.is_empty() {
        attributes.insert(
            "tags".to_string(),
            string_list_value(info.tags.iter().cloned()),
        );
    }
    if !info.boot_order.is_empty() {
        attributes.insert(
            "boot_order".to_string(),
            int_list_value(info.boot_order.iter().copied()),
        );
    }

    if let Some(storage) = flatten_storage_attachments_value(&info.storage) {
        attributes.insert("storage".to_string(), storage);
    }
    if !info.networking.is_empty() {
        attributes.insert(
            "networking_info".to_string(),
            flatten_network_interfaces_value(&info.networking)?,
        );
    }

    if let Some(doc) = &info.attributes {
        attributes.insert("instance_attributes".to_string(), json_value(doc));
    }

    Ok(attributes)
}

fn parse_identifier(id: &ResourceId, identifier: &str) -> ProviderResult<InstanceId> {
    identifier
        .parse::<InstanceId>()
        .map_err(|e| ProviderError::from(e).for_resource(id.clone()))
}

pub async fn create(
    compute: &dyn ComputeApi,
    config: &ProviderConfig,
    resource: &Resource,
) -> ProviderResult<State> {
    let record = Record::from_map("instance", &resource.attributes);
    let input = launch_input(&record, config)
        .map_err(|e| ProviderError::from(e).for_resource(resource.id.clone()))?;

    log::info!("Launching instance {} ({})", input.name, input.shape);
    let info = compute
        .create_instance(&input)
        .await
        .map_err(api_error(&resource.id, "create instance"))?;

    let identifier = InstanceId::new(info.name.clone(), info.id.clone())
        .map_err(|e| ProviderError::from(e).for_resource(resource.id.clone()))?;
    log::debug!("Instance {} launched", identifier);

    let attributes = instance_attributes(&info)
        .map_err(|e| ProviderError::from(e).for_resource(resource.id.clone()))?;
    Ok(State::existing(resource.id.clone(), attributes).with_identifier(identifier.to_string()))
}

pub async fn read(
    compute: &dyn ComputeApi,
    id: &ResourceId,
    identifier: &str,
) -> ProviderResult<State> {
    let instance_id = parse_identifier(id, identifier)?;
    let info = optional(compute.get_instance(&instance_id.name, &instance_id.id).await)
        .map_err(api_error(id, "read instance"))?;

    match info {
        Some(info) => {
            let attributes = instance_attributes(&info)
                .map_err(|e| ProviderError::from(e).for_resource(id.clone()))?;
            Ok(State::existing(id.clone(), attributes).with_identifier(identifier))
        }
        None => {
            log::warn!("Instance {} no longer exists", instance_id);
            Ok(State::not_found(id.clone()))
        }
    }
}

/// Update tags and desired state; everything else forces replacement
pub async fn update(
    compute: &dyn ComputeApi,
    id: &ResourceId,
    identifier: &str,
    to: &Resource,
) -> ProviderResult<State> {
    let instance_id = parse_identifier(id, identifier)?;
    let record = Record::from_map("instance", &to.attributes);
    let (tags, desired_state) = record
        .strings("tags")
        .and_then(|tags| Ok((tags, record.string("desired_state")?)))
        .map_err(|e| ProviderError::from(e).for_resource(id.clone()))?;

    let input = UpdateInstanceInput {
        name: instance_id.name.clone(),
        id: instance_id.id.clone(),
        tags: normalize_strings(tags),
        desired_state,
    };
    log::info!("Updating instance {}", instance_id);
    let info = compute
        .update_instance(&input)
        .await
        .map_err(api_error(id, "update instance"))?;

    let attributes =
        instance_attributes(&info).map_err(|e| ProviderError::from(e).for_resource(id.clone()))?;
    Ok(State::existing(id.clone(), attributes).with_identifier(identifier))
}

pub async fn delete(
    compute: &dyn ComputeApi,
    id: &ResourceId,
    identifier: &str,
) -> ProviderResult<()> {
    let instance_id = parse_identifier(id, identifier)?;
    log::info!("Deleting instance {}", instance_id);
    match compute.delete_instance(&instance_id.name, &instance_id.id).await {
        Err(e) if e.is_not_found() => Ok(()),
        result => result.map_err(api_error(id, "delete instance")),
    }
}
