//! Load balancer listener, identified as `region/load_balancer/listener`

use std::collections::HashMap;

use opc_core::id::{LoadBalancerResourceId, decode_triple_context, last_path_element};
use opc_core::normalize::string_list_value;
use opc_core::provider::{ProviderError, ProviderResult};
use opc_core::resource::{Resource, ResourceId, State, Value};
use opc_core::{Error, Result};

use crate::api::{ListenerInfo, ListenerInput};
use crate::client::{LoadBalancerApi, optional};
use crate::provider::api_error;
use crate::record::Record;

/// Listener input together with the identifier it will be stored under
pub fn listener_input(resource: &Resource) -> Result<(LoadBalancerResourceId, ListenerInput)> {
    let record = Record::from_map("listener", &resource.attributes);

    let parent: LoadBalancerResourceId = record.require_string("load_balancer")?.parse()?;
    if parent.resource.is_some() {
        return Err(Error::validation(format!(
            "load_balancer must be <region>/<name>, found '{}'",
            parent
        )));
    }
    let name = record.require_string("name")?;
    let id = parent.child(name.clone())?;

    let port = record
        .int("port")?
        .ok_or_else(|| Error::validation("'port' is required for listener"))?;
    let port = u16::try_from(port)
        .ok()
        .filter(|p| *p > 0)
        .ok_or_else(|| Error::validation(format!("port {} is out of range", port)))?;

    let input = ListenerInput {
        name,
        balancer_protocol: record.require_string("balancer_protocol")?,
        port,
        server_protocol: record.require_string("server_protocol")?,
        virtual_hosts: record.strings("virtual_hosts")?,
        path_prefixes: record.strings("path_prefixes")?,
        policies: record.strings("policies")?,
        tags: record.strings("tags")?,
        enabled: record.bool("enabled")?.unwrap_or(true),
    };
    Ok((id, input))
}

pub fn listener_attributes(context: &str, info: &ListenerInfo) -> HashMap<String, Value> {
    let mut attributes = HashMap::new();
    attributes.insert("load_balancer".to_string(), Value::from(context));
    attributes.insert("name".to_string(), Value::from(info.name.as_str()));
    attributes.insert("port".to_string(), Value::Int(i64::from(info.port)));
    attributes.insert(
        "balancer_protocol".to_string(),
        Value::from(info.balancer_protocol.as_str()),
    );
    attributes.insert(
        "server_protocol".to_string(),
        Value::from(info.server_protocol.as_str()),
    );
    attributes.insert("enabled".to_string(), Value::Bool(info.enabled));
    for (key, values) in [
        ("virtual_hosts", &info.virtual_hosts),
        ("path_prefixes", &info.path_prefixes),
        ("tags", &info.tags),
    ] {
        if !values.is_empty() {
            attributes.insert(key.to_string(), string_list_value(values.iter().cloned()));
        }
    }
    // Policies are applied in order
    if !info.policies.is_empty() {
        attributes.insert(
            "policies".to_string(),
            Value::List(info.policies.iter().map(|p| Value::from(p.as_str())).collect()),
        );
    }
    if !info.uri.is_empty() {
        attributes.insert("uri".to_string(), Value::from(info.uri.as_str()));
    }
    attributes
}

fn into_provider_error(id: &ResourceId) -> impl FnOnce(Error) -> ProviderError + '_ {
    move |e| ProviderError::from(e).for_resource(id.clone())
}

pub async fn create(lbaas: &dyn LoadBalancerApi, resource: &Resource) -> ProviderResult<State> {
    let (listener_id, input) = listener_input(resource).map_err(into_provider_error(&resource.id))?;
    let context = listener_id.context();

    log::info!("Creating listener {} on {}", input.name, context);
    let info = lbaas
        .create_listener(&context, &input)
        .await
        .map_err(api_error(&resource.id, "create listener"))?;

    Ok(State::existing(resource.id.clone(), listener_attributes(&context, &info))
        .with_identifier(listener_id.to_string()))
}

pub async fn read(
    lbaas: &dyn LoadBalancerApi,
    id: &ResourceId,
    identifier: &str,
) -> ProviderResult<State> {
    let (region, load_balancer) = decode_triple_context(identifier).map_err(into_provider_error(id))?;
    let context = format!("{}/{}", region, load_balancer);
    let name = last_path_element(identifier);

    match optional(lbaas.get_listener(&context, name).await)
        .map_err(api_error(id, "read listener"))?
    {
        Some(info) => Ok(State::existing(id.clone(), listener_attributes(&context, &info))
            .with_identifier(identifier)),
        None => Ok(State::not_found(id.clone())),
    }
}

pub async fn update(
    lbaas: &dyn LoadBalancerApi,
    id: &ResourceId,
    to: &Resource,
) -> ProviderResult<State> {
    let (listener_id, input) = listener_input(to).map_err(into_provider_error(id))?;
    let context = listener_id.context();

    log::info!("Updating listener {} on {}", input.name, context);
    let info = lbaas
        .update_listener(&context, &input)
        .await
        .map_err(api_error(id, "update listener"))?;

    Ok(State::existing(id.clone(), listener_attributes(&context, &info))
        .with_identifier(listener_id.to_string()))
}

pub async fn delete(
    lbaas: &dyn LoadBalancerApi,
    id: &ResourceId,
    identifier: &str,
) -> ProviderResult<()> {
    let listener_id: LoadBalancerResourceId =
        identifier.parse().map_err(into_provider_error(id))?;
    let Some(name) = listener_id.resource.as_deref() else {
        return Err(ProviderError::new(format!(
            "identifier '{}' does not name a listener",
            identifier
        ))
        .for_resource(id.clone()));
    };

    log::info!("Deleting listener {}", listener_id);
    match lbaas.delete_listener(&listener_id.context(), name).await {
        Err(e) if e.is_not_found() => Ok(()),
        result => result.map_err(api_error(id, "delete listener")),
    }
}
