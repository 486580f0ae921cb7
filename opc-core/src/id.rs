//! Identifier codec - Composite identifiers used as resource keys
//!
//! Several OPC objects have no single server-side key, so the provider stores
//! a composite identifier built from their components:
//!
//! - `name|version` for image list entries
//! - `region/load_balancer[/resource]` for load balancer sub-resources
//! - `name/uuid` for compute instances
//!
//! Components must not contain their delimiter; encoding rejects them instead
//! of producing an identifier that cannot be decoded again.

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

const PAIR_DELIMITER: char = '|';
const PATH_DELIMITER: char = '/';

fn check_component(kind: &str, value: &str, delimiter: char) -> Result<()> {
    if value.is_empty() {
        return Err(Error::validation(format!("{} must not be empty", kind)));
    }
    if value.contains(delimiter) {
        return Err(Error::validation(format!(
            "{} '{}' must not contain '{}'",
            kind, value, delimiter
        )));
    }
    Ok(())
}

/// Encode a `name|version` identifier
pub fn encode_pair_id(name: &str, version: u32) -> Result<String> {
    check_component("name", name, PAIR_DELIMITER)?;
    Ok(format!("{}{}{}", name, PAIR_DELIMITER, version))
}

/// Decode a `name|version` identifier
pub fn decode_pair_id(id: &str) -> Result<(String, u32)> {
    let (name, version) = id.split_once(PAIR_DELIMITER).ok_or_else(|| {
        Error::parse(format!(
            "invalid identifier '{}': expected <name>|<version>",
            id
        ))
    })?;
    if name.is_empty() {
        return Err(Error::parse(format!("invalid identifier '{}': empty name", id)));
    }
    let version = version.parse::<u32>().map_err(|_| {
        Error::parse(format!(
            "invalid identifier '{}': version '{}' is not a non-negative integer",
            id, version
        ))
    })?;
    Ok((name.to_string(), version))
}

/// Encode a `region/resource/sub_resource` identifier
pub fn encode_triple_id(region: &str, resource: &str, sub_resource: &str) -> Result<String> {
    check_component("region", region, PATH_DELIMITER)?;
    check_component("resource name", resource, PATH_DELIMITER)?;
    check_component("sub-resource name", sub_resource, PATH_DELIMITER)?;
    Ok(format!("{}/{}/{}", region, resource, sub_resource))
}

/// Decode the `(region, resource)` context of a 2- or 3-segment identifier
///
/// The third segment, if any, is ignored; use [`last_path_element`] to get it.
pub fn decode_triple_context(id: &str) -> Result<(String, String)> {
    let parts: Vec<&str> = id.split(PATH_DELIMITER).collect();
    match parts.as_slice() {
        [region, resource] | [region, resource, _]
            if !region.is_empty() && !resource.is_empty() =>
        {
            Ok((region.to_string(), resource.to_string()))
        }
        _ => Err(Error::parse(format!(
            "invalid identifier '{}': expected <region>/<name>[/<sub_name>]",
            id
        ))),
    }
}

/// Substring after the final `/` (the whole input when there is none)
pub fn last_path_element(id: &str) -> &str {
    id.rsplit(PATH_DELIMITER).next().unwrap_or(id)
}

/// Qualify an object name with the account container
/// (e.g., "web" -> "/Compute-mydomain/user@example.com/web")
///
/// Names starting with `/` are treated as already qualified.
pub fn qualify_name(identity_domain: &str, user: &str, name: &str) -> String {
    if name.starts_with(PATH_DELIMITER) {
        name.to_string()
    } else {
        format!("/Compute-{}/{}/{}", identity_domain, user, name)
    }
}

/// Strip the account container from a qualified object name
pub fn unqualify_name(name: &str) -> &str {
    if name.starts_with("/Compute-") {
        last_path_element(name)
    } else {
        name
    }
}

/// Identifier of an image list entry (`name|version`)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VersionedId {
    pub name: String,
    pub version: u32,
}

impl VersionedId {
    pub fn new(name: impl Into<String>, version: u32) -> Result<Self> {
        let name = name.into();
        check_component("name", &name, PAIR_DELIMITER)?;
        Ok(Self { name, version })
    }
}

impl fmt::Display for VersionedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.name, PAIR_DELIMITER, self.version)
    }
}

impl FromStr for VersionedId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (name, version) = decode_pair_id(s)?;
        Ok(Self { name, version })
    }
}

/// Identifier of a load balancer or one of its sub-resources
/// (`region/load_balancer[/resource]`)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LoadBalancerResourceId {
    pub region: String,
    pub load_balancer: String,
    pub resource: Option<String>,
}

impl LoadBalancerResourceId {
    /// Context of the load balancer itself
    pub fn load_balancer(region: impl Into<String>, name: impl Into<String>) -> Result<Self> {
        let region = region.into();
        let load_balancer = name.into();
        check_component("region", &region, PATH_DELIMITER)?;
        check_component("load balancer name", &load_balancer, PATH_DELIMITER)?;
        Ok(Self {
            region,
            load_balancer,
            resource: None,
        })
    }

    /// Sub-resource (listener, policy, ...) of this load balancer
    pub fn child(&self, name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        check_component("sub-resource name", &name, PATH_DELIMITER)?;
        Ok(Self {
            resource: Some(name),
            ..self.clone()
        })
    }

    /// The `region/load_balancer` part
    pub fn context(&self) -> String {
        format!("{}/{}", self.region, self.load_balancer)
    }
}

impl fmt::Display for LoadBalancerResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.resource {
            Some(resource) => write!(f, "{}/{}/{}", self.region, self.load_balancer, resource),
            None => write!(f, "{}/{}", self.region, self.load_balancer),
        }
    }
}

impl FromStr for LoadBalancerResourceId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (region, load_balancer) = decode_triple_context(s)?;
        let resource = match s.matches(PATH_DELIMITER).count() {
            2 => match last_path_element(s) {
                "" => {
                    return Err(Error::parse(format!(
                        "invalid identifier '{}': empty sub-resource name",
                        s
                    )));
                }
                name => Some(name.to_string()),
            },
            _ => None,
        };
        Ok(Self {
            region,
            load_balancer,
            resource,
        })
    }
}

/// Identifier of a compute instance (`name/uuid`)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InstanceId {
    pub name: String,
    pub id: String,
}

impl InstanceId {
    pub fn new(name: impl Into<String>, id: impl Into<String>) -> Result<Self> {
        let name = name.into();
        let id = id.into();
        if name.is_empty() {
            return Err(Error::validation("instance name must not be empty"));
        }
        check_component("instance id", &id, PATH_DELIMITER)?;
        Ok(Self { name, id })
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.name, self.id)
    }
}

impl FromStr for InstanceId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.rsplit_once(PATH_DELIMITER) {
            Some((name, id)) if !name.is_empty() && !id.is_empty() => Ok(Self {
                name: name.to_string(),
                id: id.to_string(),
            }),
            _ => Err(Error::parse(format!(
                "invalid instance identifier '{}': expected <name>/<id>",
                s
            ))),
        }
    }
}
