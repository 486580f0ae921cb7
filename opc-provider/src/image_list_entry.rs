//! Image list entry - keyed by `name|version`

use std::collections::HashMap;

use opc_core::id::{VersionedId, unqualify_name};
use opc_core::provider::{ProviderError, ProviderResult};
use opc_core::resource::{Resource, ResourceId, State, Value};
use opc_core::{Error, Result};

use crate::api::{CreateImageListEntryInput, ImageListEntryInfo};
use crate::client::{ComputeApi, optional};
use crate::config::ProviderConfig;
use crate::provider::api_error;
use crate::record::{Record, json_value};

fn entry_input(resource: &Resource, config: &ProviderConfig) -> Result<CreateImageListEntryInput> {
    let record = Record::from_map("image list entry", &resource.attributes);
    let name = record.require_string("name")?;
    let version = record
        .int("version")?
        .ok_or_else(|| Error::validation("'version' is required"))?;
    let version = u32::try_from(version)
        .map_err(|_| Error::validation(format!("version {} must not be negative", version)))?;

    // Validates the name before anything is created remotely
    VersionedId::new(name.clone(), version)?;

    let machine_images = record.strings("machine_images")?;
    if machine_images.is_empty() {
        return Err(Error::validation("'machine_images' must not be empty"));
    }

    let attributes = record.json("attributes")?;

    Ok(CreateImageListEntryInput {
        name: config.qualified_name(&name),
        version,
        machine_images: machine_images
            .iter()
            .map(|image| config.qualified_name(image))
            .collect(),
        attributes,
    })
}

/// State attributes; `name` is kept in the form it was configured in
fn entry_attributes(name: &str, info: &ImageListEntryInfo) -> HashMap<String, Value> {
    let mut attributes = HashMap::new();
    attributes.insert("name".to_string(), Value::from(name));
    attributes.insert("version".to_string(), Value::Int(i64::from(info.version)));
    attributes.insert(
        "machine_images".to_string(),
        Value::List(
            info.machine_images
                .iter()
                .map(|image| Value::from(unqualify_name(image)))
                .collect(),
        ),
    );
    if let Some(doc) = &info.attributes {
        attributes.insert("attributes".to_string(), json_value(doc));
    }
    if !info.uri.is_empty() {
        attributes.insert("uri".to_string(), Value::from(info.uri.as_str()));
    }
    attributes
}

fn parse_identifier(id: &ResourceId, identifier: &str) -> ProviderResult<VersionedId> {
    identifier
        .parse::<VersionedId>()
        .map_err(|e| ProviderError::from(e).for_resource(id.clone()))
}

pub async fn create(
    compute: &dyn ComputeApi,
    config: &ProviderConfig,
    resource: &Resource,
) -> ProviderResult<State> {
    let input = entry_input(resource, config)
        .map_err(|e| ProviderError::from(e).for_resource(resource.id.clone()))?;

    log::info!("Creating image list entry {} version {}", input.name, input.version);
    let info = compute
        .create_image_list_entry(&input)
        .await
        .map_err(api_error(&resource.id, "create image list entry"))?;

    let identifier = resource
        .require_string("name")
        .and_then(|name| VersionedId::new(name, info.version))
        .map_err(|e| ProviderError::from(e).for_resource(resource.id.clone()))?;
    Ok(
        State::existing(resource.id.clone(), entry_attributes(&identifier.name, &info))
            .with_identifier(identifier.to_string()),
    )
}

pub async fn read(
    compute: &dyn ComputeApi,
    config: &ProviderConfig,
    id: &ResourceId,
    identifier: &str,
) -> ProviderResult<State> {
    let entry = parse_identifier(id, identifier)?;
    let info = optional(
        compute
            .get_image_list_entry(&config.qualified_name(&entry.name), entry.version)
            .await,
    )
    .map_err(api_error(id, "read image list entry"))?;

    Ok(match info {
        Some(info) => State::existing(id.clone(), entry_attributes(&entry.name, &info))
            .with_identifier(identifier),
        None => State::not_found(id.clone()),
    })
}

pub async fn delete(
    compute: &dyn ComputeApi,
    config: &ProviderConfig,
    id: &ResourceId,
    identifier: &str,
) -> ProviderResult<()> {
    let entry = parse_identifier(id, identifier)?;
    log::info!("Deleting image list entry {}", entry);
    match compute
        .delete_image_list_entry(&config.qualified_name(&entry.name), entry.version)
        .await
    {
        Err(e) if e.is_not_found() => Ok(()),
        result => result.map_err(api_error(id, "delete image list entry")),
    }
}
