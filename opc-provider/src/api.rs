//! Request and response shapes of the OPC Compute and Load Balancer APIs
//!
//! Field names follow the JSON documents exchanged with the API. Empty
//! optional fields are omitted on the wire.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// NIC model of a shared network interface
///
/// Its presence marks an interface as being on the shared network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NicModel {
    #[default]
    #[serde(rename = "e1000")]
    E1000,
}

/// One network interface of an instance, keyed by `ethN` in [`Networking`]
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NetworkingInfo {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dns: Vec<String>,
    /// Static private address (IP network only)
    #[serde(rename = "ip", default, skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    #[serde(rename = "ipnetwork", default, skip_serializing_if = "Option::is_none")]
    pub ip_network: Option<String>,
    #[serde(default)]
    pub is_default_gateway: bool,
    #[serde(rename = "address", default, skip_serializing_if = "Option::is_none")]
    pub mac_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<NicModel>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub name_servers: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nat: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub search_domains: Vec<String>,
    #[serde(rename = "seclists", default, skip_serializing_if = "Vec::is_empty")]
    pub sec_lists: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vnic: Option<String>,
    #[serde(rename = "vnicsets", default, skip_serializing_if = "Vec::is_empty")]
    pub vnic_sets: Vec<String>,
}

/// Network interfaces keyed by device name (`eth0`, `eth1`, ...)
pub type Networking = BTreeMap<String, NetworkingInfo>;

/// Storage volume to attach when launching an instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageAttachmentInput {
    pub index: u32,
    pub volume: String,
}

/// Storage attachment as reported on an instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceStorageAttachment {
    pub index: u32,
    pub storage_volume_name: String,
    pub name: String,
}

/// Launch parameters of one instance
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CreateInstanceInput {
    pub name: String,
    pub shape: String,
    #[serde(rename = "imagelist", default, skip_serializing_if = "Option::is_none")]
    pub image_list: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    #[serde(rename = "sshkeys", default, skip_serializing_if = "Vec::is_empty")]
    pub ssh_keys: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub boot_order: Vec<i64>,
    #[serde(rename = "storage_attachments", default, skip_serializing_if = "Vec::is_empty")]
    pub storage: Vec<StorageAttachmentInput>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub networking: Networking,
    #[serde(default)]
    pub reverse_dns: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desired_state: Option<String>,
    /// Free-form instance attributes (e.g., userdata)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<serde_json::Value>,
}

/// In-place changes supported on a running instance
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UpdateInstanceInput {
    pub name: String,
    pub id: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desired_state: Option<String>,
}

/// Instance as returned by the API
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct InstanceInfo {
    pub name: String,
    pub id: String,
    pub shape: String,
    #[serde(rename = "imagelist", default)]
    pub image_list: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub hostname: Option<String>,
    #[serde(rename = "sshkeys", default)]
    pub ssh_keys: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub boot_order: Vec<i64>,
    #[serde(rename = "storage_attachments", default)]
    pub storage: Vec<InstanceStorageAttachment>,
    #[serde(default)]
    pub networking: Networking,
    #[serde(default)]
    pub reverse_dns: bool,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub ip_address: Option<String>,
    #[serde(default)]
    pub attributes: Option<serde_json::Value>,
}

/// Standalone storage attachment request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateStorageAttachmentInput {
    pub instance_name: String,
    pub storage_volume_name: String,
    pub index: u32,
}

/// Standalone storage attachment as returned by the API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageAttachmentInfo {
    pub name: String,
    pub instance_name: String,
    pub storage_volume_name: String,
    pub index: u32,
    #[serde(default)]
    pub state: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateImageListEntryInput {
    /// Name of the image list this entry belongs to
    pub name: String,
    pub version: u32,
    #[serde(rename = "machineimages")]
    pub machine_images: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageListEntryInfo {
    pub name: String,
    pub version: u32,
    #[serde(rename = "machineimages", default)]
    pub machine_images: Vec<String>,
    #[serde(default)]
    pub attributes: Option<serde_json::Value>,
    #[serde(default)]
    pub uri: String,
}

/// One object managed by an orchestration; only instances are supported
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrchestrationObject {
    pub label: String,
    #[serde(rename = "type")]
    pub object_type: String,
    #[serde(default)]
    pub persistent: bool,
    pub template: CreateInstanceInput,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OrchestrationInput {
    pub name: String,
    pub desired_state: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub objects: Vec<OrchestrationObject>,
}

/// Orchestration as returned by the API
///
/// Each object carries the live instance it launched, if any.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrchestrationInfo {
    pub name: String,
    pub desired_state: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: String,
    pub objects: Vec<OrchestrationObjectInfo>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrchestrationObjectInfo {
    pub label: String,
    #[serde(default)]
    pub persistent: bool,
    pub template: CreateInstanceInput,
    #[serde(default)]
    pub instance: Option<InstanceInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ListenerInput {
    pub name: String,
    pub balancer_protocol: String,
    pub port: u16,
    pub server_protocol: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub virtual_hosts: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub path_prefixes: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub policies: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListenerInfo {
    pub name: String,
    pub balancer_protocol: String,
    pub port: u16,
    pub server_protocol: String,
    #[serde(default)]
    pub virtual_hosts: Vec<String>,
    #[serde(default)]
    pub path_prefixes: Vec<String>,
    #[serde(default)]
    pub policies: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub uri: String,
}
