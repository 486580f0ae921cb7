//! Resource type definitions and attribute schemas

use opc_core::provider::ResourceType;
use opc_core::schema::{AttributeSchema, AttributeType, ResourceSchema, types};

pub const INSTANCE: &str = "compute_instance";
pub const STORAGE_ATTACHMENT: &str = "compute_storage_attachment";
pub const IMAGE_LIST_ENTRY: &str = "compute_image_list_entry";
pub const ORCHESTRATED_INSTANCE: &str = "compute_orchestrated_instance";
pub const LBAAS_LISTENER: &str = "lbaas_listener";

macro_rules! define_resource_type {
    ($name:ident, $type_name:expr, $schema:expr) => {
        pub struct $name;
        impl ResourceType for $name {
            fn name(&self) -> &'static str {
                $type_name
            }
            fn schema(&self) -> ResourceSchema {
                $schema()
            }
        }
    };
}

define_resource_type!(InstanceType, INSTANCE, instance_schema);
define_resource_type!(StorageAttachmentType, STORAGE_ATTACHMENT, storage_attachment_schema);
define_resource_type!(ImageListEntryType, IMAGE_LIST_ENTRY, image_list_entry_schema);
define_resource_type!(
    OrchestratedInstanceType,
    ORCHESTRATED_INSTANCE,
    orchestrated_instance_schema
);
define_resource_type!(ListenerType, LBAAS_LISTENER, listener_schema);

/// Returns all resource types supported by this provider
pub fn resource_types() -> Vec<Box<dyn ResourceType>> {
    vec![
        Box::new(InstanceType),
        Box::new(StorageAttachmentType),
        Box::new(ImageListEntryType),
        Box::new(OrchestratedInstanceType),
        Box::new(ListenerType),
    ]
}

/// Schema of a resource type by name
pub fn schema_for(resource_type: &str) -> Option<ResourceSchema> {
    resource_types()
        .into_iter()
        .find(|t| t.name() == resource_type)
        .map(|t| t.schema())
}

fn string(name: &str) -> AttributeSchema {
    AttributeSchema::new(name, AttributeType::String)
}

fn desired_state() -> AttributeType {
    types::one_of(&["running", "shutdown", "suspended", "inactive"])
}

// =============================================================================
// Compute
// =============================================================================

pub fn network_interface_attributes() -> Vec<AttributeSchema> {
    vec![
        AttributeSchema::new("index", AttributeType::IntBetween(0, 9)).required(),
        AttributeSchema::new("shared_network", AttributeType::Bool),
        AttributeSchema::new("dns", types::string_list()),
        string("ip_address"),
        string("ip_network"),
        AttributeSchema::new("is_default_gateway", AttributeType::Bool),
        string("mac_address"),
        string("model"),
        AttributeSchema::new("name_servers", types::string_list()),
        AttributeSchema::new("nat", types::string_list()),
        AttributeSchema::new("search_domains", types::string_list()),
        AttributeSchema::new("sec_lists", types::string_list()),
        string("vnic"),
        AttributeSchema::new("vnic_sets", types::string_list()),
    ]
}

pub fn storage_attributes() -> Vec<AttributeSchema> {
    vec![
        AttributeSchema::new("index", AttributeType::IntBetween(1, 10)).required(),
        string("volume").required(),
        string("name").computed(),
    ]
}

/// Launch attributes shared by standalone and orchestrated instances
fn instance_attributes() -> Vec<AttributeSchema> {
    vec![
        string("name").required().force_new(),
        string("shape").required().force_new(),
        string("image_list").force_new(),
        string("label").force_new(),
        string("hostname").force_new(),
        AttributeSchema::new("reverse_dns", AttributeType::Bool).force_new(),
        AttributeSchema::new("desired_state", desired_state()),
        AttributeSchema::new("ssh_keys", types::string_list()).force_new(),
        AttributeSchema::new("tags", types::string_list()),
        AttributeSchema::new("boot_order", AttributeType::List(Box::new(AttributeType::Int)))
            .force_new(),
        AttributeSchema::new("storage", types::block_list(storage_attributes())).force_new(),
        AttributeSchema::new(
            "networking_info",
            types::block_list(network_interface_attributes()),
        )
        .force_new(),
        string("instance_attributes")
            .force_new()
            .with_description("JSON document of instance attributes (e.g., userdata)"),
        string("id").computed(),
        string("state").computed(),
        string("ip_address").computed(),
    ]
}

pub fn instance_schema() -> ResourceSchema {
    instance_attributes()
        .into_iter()
        .fold(ResourceSchema::new(INSTANCE), ResourceSchema::attribute)
        .with_description("Compute instance with its network interfaces and storage")
}

pub fn storage_attachment_schema() -> ResourceSchema {
    ResourceSchema::new(STORAGE_ATTACHMENT)
        .attribute(string("instance").required().force_new())
        .attribute(string("storage_volume").required().force_new())
        .attribute(
            AttributeSchema::new("index", AttributeType::IntBetween(1, 10))
                .required()
                .force_new(),
        )
        .attribute(string("name").computed())
        .attribute(string("state").computed())
        .with_description("Attachment of a storage volume to a running instance")
}

pub fn image_list_entry_schema() -> ResourceSchema {
    ResourceSchema::new(IMAGE_LIST_ENTRY)
        .attribute(string("name").required().force_new())
        .attribute(
            AttributeSchema::new("version", AttributeType::IntBetween(0, i64::from(u32::MAX)))
                .required()
                .force_new(),
        )
        .attribute(
            AttributeSchema::new("machine_images", types::string_list())
                .required()
                .force_new(),
        )
        .attribute(string("attributes").force_new())
        .attribute(string("uri").computed())
        .with_description("Versioned entry of an image list")
}

pub fn orchestrated_instance_schema() -> ResourceSchema {
    let mut nested = instance_attributes();
    nested.retain(|a| a.name != "label");
    nested.push(string("label").required());
    nested.push(AttributeSchema::new("persistent", AttributeType::Bool));

    ResourceSchema::new(ORCHESTRATED_INSTANCE)
        .attribute(string("name").required().force_new())
        .attribute(
            AttributeSchema::new("desired_state", types::one_of(&["active", "inactive", "suspend"]))
                .required(),
        )
        .attribute(string("description"))
        .attribute(AttributeSchema::new("instance", types::block_list(nested)).required())
        .attribute(string("status").computed())
        .with_description("Orchestration launching a group of instances")
}

pub fn listener_schema() -> ResourceSchema {
    let protocol = || types::one_of(&["HTTP", "HTTPS"]);
    ResourceSchema::new(LBAAS_LISTENER)
        .attribute(
            string("load_balancer")
                .required()
                .force_new()
                .with_description("Parent load balancer as <region>/<name>"),
        )
        .attribute(string("name").required().force_new())
        .attribute(AttributeSchema::new("port", AttributeType::IntBetween(1, 65535)).required())
        .attribute(AttributeSchema::new("balancer_protocol", protocol()).required())
        .attribute(AttributeSchema::new("server_protocol", protocol()).required())
        .attribute(AttributeSchema::new("virtual_hosts", types::string_list()))
        .attribute(AttributeSchema::new("path_prefixes", types::string_list()))
        .attribute(AttributeSchema::new("policies", types::string_list()))
        .attribute(AttributeSchema::new("tags", types::string_list()))
        .attribute(AttributeSchema::new("enabled", AttributeType::Bool))
        .attribute(string("uri").computed())
        .with_description("Listener of a Load Balancer Classic instance")
}
