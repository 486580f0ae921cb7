//! Standalone storage attachment of a volume to a running instance

use std::collections::HashMap;

use opc_core::provider::{ProviderError, ProviderResult};
use opc_core::resource::{Resource, ResourceId, State, Value};

use crate::api::{CreateStorageAttachmentInput, StorageAttachmentInfo};
use crate::client::{ComputeApi, optional};
use crate::provider::api_error;
use crate::storage::{check_index, ensure_index_available};

fn attachment_attributes(info: &StorageAttachmentInfo) -> HashMap<String, Value> {
    let mut attributes = HashMap::new();
    attributes.insert("name".to_string(), Value::from(info.name.as_str()));
    attributes.insert("instance".to_string(), Value::from(info.instance_name.as_str()));
    attributes.insert(
        "storage_volume".to_string(),
        Value::from(info.storage_volume_name.as_str()),
    );
    attributes.insert("index".to_string(), Value::Int(i64::from(info.index)));
    if !info.state.is_empty() {
        attributes.insert("state".to_string(), Value::from(info.state.as_str()));
    }
    attributes
}

fn attachment_input(resource: &Resource) -> opc_core::Result<CreateStorageAttachmentInput> {
    let index = resource
        .get_int("index")
        .ok_or_else(|| opc_core::Error::validation("'index' is required"))?;
    Ok(CreateStorageAttachmentInput {
        instance_name: resource.require_string("instance")?.to_string(),
        storage_volume_name: resource.require_string("storage_volume")?.to_string(),
        index: check_index(index)?,
    })
}

pub async fn create(compute: &dyn ComputeApi, resource: &Resource) -> ProviderResult<State> {
    let id = &resource.id;
    let input =
        attachment_input(resource).map_err(|e| ProviderError::from(e).for_resource(id.clone()))?;

    // The API accepts a colliding index and fails later while attaching
    let existing = compute
        .list_storage_attachments(&input.instance_name)
        .await
        .map_err(api_error(id, "list storage attachments"))?;
    ensure_index_available(&existing, input.index)
        .map_err(|e| ProviderError::from(e).for_resource(id.clone()))?;

    log::info!(
        "Attaching {} to {} at index {}",
        input.storage_volume_name,
        input.instance_name,
        input.index
    );
    let info = compute
        .create_storage_attachment(&input)
        .await
        .map_err(api_error(id, "create storage attachment"))?;

    Ok(State::existing(id.clone(), attachment_attributes(&info)).with_identifier(info.name))
}

pub async fn read(
    compute: &dyn ComputeApi,
    id: &ResourceId,
    identifier: &str,
) -> ProviderResult<State> {
    match optional(compute.get_storage_attachment(identifier).await)
        .map_err(api_error(id, "read storage attachment"))?
    {
        Some(info) => {
            Ok(State::existing(id.clone(), attachment_attributes(&info)).with_identifier(identifier))
        }
        None => Ok(State::not_found(id.clone())),
    }
}

pub async fn delete(
    compute: &dyn ComputeApi,
    id: &ResourceId,
    identifier: &str,
) -> ProviderResult<()> {
    log::info!("Detaching storage attachment {}", identifier);
    match compute.delete_storage_attachment(identifier).await {
        Err(e) if e.is_not_found() => Ok(()),
        result => result.map_err(api_error(id, "delete storage attachment")),
    }
}
