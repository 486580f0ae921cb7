//! Network interfaces - Expansion and flattening of `networking_info`
//!
//! Configuration declares interfaces as a list of records with an explicit
//! `index`. The API keys them by device name (`eth<index>`) and tells shared
//! network interfaces apart from IP network interfaces by the presence of
//! `model` (shared) or `vnic` (IP network). In between, [`NetworkInterface`]
//! carries the kind as an explicit variant.

use opc_core::resource::Value;
use opc_core::{Error, Result};

use crate::api::{Networking, NetworkingInfo, NicModel};
use crate::record::{Record, RecordBuilder, records};

const DEVICE_PREFIX: &str = "eth";

/// Fields that only apply to IP network interfaces
const IP_NETWORK_ONLY: &[&str] = &[
    "ip_address",
    "ip_network",
    "mac_address",
    "vnic",
    "vnic_sets",
    "is_default_gateway",
];

/// Fields that only apply to shared network interfaces
const SHARED_NETWORK_ONLY: &[&str] = &["model", "sec_lists"];

/// Device key for an interface index (e.g., 0 -> "eth0")
pub fn device_key(index: u32) -> String {
    format!("{}{}", DEVICE_PREFIX, index)
}

/// Interface index from a device key (e.g., "eth3" -> 3)
pub fn parse_device_key(key: &str) -> Result<u32> {
    key.strip_prefix(DEVICE_PREFIX)
        .and_then(|n| n.parse::<u32>().ok())
        .ok_or_else(|| {
            Error::parse(format!(
                "invalid network device '{}': expected {}<N>",
                key, DEVICE_PREFIX
            ))
        })
}

/// One network interface of an instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkInterface {
    pub index: u32,
    /// DNS names assigned by the API
    pub dns: Vec<String>,
    pub name_servers: Vec<String>,
    pub search_domains: Vec<String>,
    /// Public address pool (shared) or IP reservations (IP network)
    pub nat: Vec<String>,
    pub kind: InterfaceKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InterfaceKind {
    Shared(SharedNetwork),
    IpNetwork(IpNetwork),
}

/// Shared network interface
///
/// Addressing fields cannot be configured on a shared interface but are kept
/// when the API reports them.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SharedNetwork {
    pub sec_lists: Vec<String>,
    pub ip_network: Option<String>,
    pub ip_address: Option<String>,
    pub mac_address: Option<String>,
    pub vnic_sets: Vec<String>,
    pub is_default_gateway: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IpNetwork {
    pub ip_network: Option<String>,
    /// Static private address
    pub ip_address: Option<String>,
    pub mac_address: Option<String>,
    pub vnic: Option<String>,
    pub vnic_sets: Vec<String>,
    pub is_default_gateway: bool,
}

impl NetworkInterface {
    pub fn is_shared(&self) -> bool {
        matches!(self.kind, InterfaceKind::Shared(_))
    }

    /// Read one `networking_info` record
    pub fn from_record(record: &Record<'_>) -> Result<Self> {
        let index = match record.int("index") {
            Ok(Some(n)) => u32::try_from(n).map_err(|_| {
                Error::validation(format!("network interface index {} must not be negative", n))
            })?,
            _ => {
                return Err(Error::validation(
                    "Index not specified for network interface",
                ));
            }
        };

        let shared = record.bool("shared_network")?.unwrap_or(false);
        let kind = if shared {
            reject_fields(record, index, IP_NETWORK_ONLY, "Shared")?;
            if let Some(model) = record.string("model")?
                && model != "e1000"
            {
                return Err(Error::validation(format!(
                    "unsupported NIC model '{}' on {}: only e1000 is supported",
                    model,
                    device_key(index)
                )));
            }
            InterfaceKind::Shared(SharedNetwork {
                sec_lists: record.strings("sec_lists")?,
                ..Default::default()
            })
        } else {
            reject_fields(record, index, SHARED_NETWORK_ONLY, "IP Network")?;
            InterfaceKind::IpNetwork(IpNetwork {
                ip_network: record.string("ip_network")?,
                ip_address: record.string("ip_address")?,
                mac_address: record.string("mac_address")?,
                vnic: record.string("vnic")?,
                vnic_sets: record.strings("vnic_sets")?,
                is_default_gateway: record.bool("is_default_gateway")?.unwrap_or(false),
            })
        };

        Ok(Self {
            index,
            dns: record.strings("dns")?,
            name_servers: record.strings("name_servers")?,
            search_domains: record.strings("search_domains")?,
            nat: record.strings("nat")?,
            kind,
        })
    }

    /// API request shape; only shared interfaces carry `model`
    pub fn to_networking_info(&self) -> NetworkingInfo {
        let mut info = NetworkingInfo {
            dns: self.dns.clone(),
            name_servers: self.name_servers.clone(),
            search_domains: self.search_domains.clone(),
            nat: self.nat.clone(),
            ..Default::default()
        };
        match &self.kind {
            InterfaceKind::Shared(shared) => {
                info.model = Some(NicModel::E1000);
                info.sec_lists = shared.sec_lists.clone();
                info.ip_network = shared.ip_network.clone();
                info.ip_address = shared.ip_address.clone();
                info.mac_address = shared.mac_address.clone();
                info.vnic_sets = shared.vnic_sets.clone();
                info.is_default_gateway = shared.is_default_gateway;
            }
            InterfaceKind::IpNetwork(ip) => {
                info.ip_network = ip.ip_network.clone();
                info.ip_address = ip.ip_address.clone();
                info.mac_address = ip.mac_address.clone();
                info.vnic = ip.vnic.clone();
                info.vnic_sets = ip.vnic_sets.clone();
                info.is_default_gateway = ip.is_default_gateway;
            }
        }
        info
    }

    /// Read an interface from the API response
    pub fn from_networking_info(device: &str, info: &NetworkingInfo) -> Result<Self> {
        let index = parse_device_key(device)?;
        let kind = match (&info.model, non_empty(&info.vnic)) {
            (Some(_), Some(vnic)) => {
                return Err(Error::parse(format!(
                    "network device '{}' reports both a NIC model and vnic '{}'",
                    device, vnic
                )));
            }
            (Some(_), None) => InterfaceKind::Shared(SharedNetwork {
                sec_lists: info.sec_lists.clone(),
                ip_network: non_empty(&info.ip_network),
                ip_address: non_empty(&info.ip_address),
                mac_address: non_empty(&info.mac_address),
                vnic_sets: info.vnic_sets.clone(),
                is_default_gateway: info.is_default_gateway,
            }),
            (None, vnic) => InterfaceKind::IpNetwork(IpNetwork {
                ip_network: non_empty(&info.ip_network),
                ip_address: non_empty(&info.ip_address),
                mac_address: non_empty(&info.mac_address),
                vnic,
                vnic_sets: info.vnic_sets.clone(),
                is_default_gateway: info.is_default_gateway,
            }),
        };

        Ok(Self {
            index,
            dns: info.dns.clone(),
            name_servers: info.name_servers.clone(),
            search_domains: info.search_domains.clone(),
            nat: info.nat.clone(),
            kind,
        })
    }

    /// Configuration record; empty fields are left out
    pub fn to_value(&self) -> Value {
        let builder = RecordBuilder::new()
            .set("index", i64::from(self.index))
            .set("shared_network", self.is_shared())
            .set_list("dns", &self.dns)
            .set_list("name_servers", &self.name_servers)
            .set_list("search_domains", &self.search_domains)
            .set_list("nat", &self.nat);

        match &self.kind {
            InterfaceKind::Shared(shared) => builder
                .set("is_default_gateway", shared.is_default_gateway)
                .set_list("sec_lists", &shared.sec_lists)
                .set_opt("ip_network", shared.ip_network.as_deref())
                .set_opt("ip_address", shared.ip_address.as_deref())
                .set_opt("mac_address", shared.mac_address.as_deref())
                .set_list("vnic_sets", &shared.vnic_sets),
            InterfaceKind::IpNetwork(ip) => builder
                .set("is_default_gateway", ip.is_default_gateway)
                .set_opt("ip_network", ip.ip_network.as_deref())
                .set_opt("ip_address", ip.ip_address.as_deref())
                .set_opt("mac_address", ip.mac_address.as_deref())
                .set_opt("vnic", ip.vnic.as_deref())
                .set_list("vnic_sets", &ip.vnic_sets),
        }
        .build()
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.clone().filter(|s| !s.is_empty())
}

fn reject_fields(record: &Record<'_>, index: u32, fields: &[&str], kind: &str) -> Result<()> {
    match fields.iter().find(|f| record.is_set(f)) {
        Some(field) => Err(Error::validation(format!(
            "'{}' cannot be set on {}: not allowed for a {} interface",
            field,
            device_key(index),
            kind
        ))),
        None => Ok(()),
    }
}

/// Parse `networking_info` records without checking index uniqueness
pub fn interfaces_from_config(config: Option<&Value>) -> Result<Vec<NetworkInterface>> {
    records("network interface", config)?
        .iter()
        .map(NetworkInterface::from_record)
        .collect()
}

/// Expand `networking_info` records into the API's device map
///
/// Fails on the first invalid record or repeated index.
pub fn expand_network_interfaces(config: Option<&Value>) -> Result<Networking> {
    let mut networking = Networking::new();
    for interface in interfaces_from_config(config)? {
        let device = device_key(interface.index);
        if networking.contains_key(&device) {
            return Err(Error::validation(format!(
                "Duplicate network interface at {} already specified",
                device
            )));
        }
        log::debug!(
            "Expanded {} as {} interface",
            device,
            if interface.is_shared() { "shared network" } else { "IP network" }
        );
        networking.insert(device, interface.to_networking_info());
    }
    Ok(networking)
}

/// Flatten the API's device map into interfaces ordered by index
pub fn flatten_network_interfaces(networking: &Networking) -> Result<Vec<NetworkInterface>> {
    let mut interfaces = networking
        .iter()
        .map(|(device, info)| NetworkInterface::from_networking_info(device, info))
        .collect::<Result<Vec<_>>>()?;
    interfaces.sort_by_key(|i| i.index);
    Ok(interfaces)
}

/// Flatten the API's device map into `networking_info` records
pub fn flatten_network_interfaces_value(networking: &Networking) -> Result<Value> {
    Ok(Value::List(
        flatten_network_interfaces(networking)?
            .iter()
            .map(NetworkInterface::to_value)
            .collect(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shared(index: i64, nat: &str) -> Value {
        RecordBuilder::new()
            .set("index", index)
            .set("shared_network", true)
            .set_list("nat", &[nat.to_string()])
            .set_list("sec_lists", &["/Compute-d/u/web".to_string()])
            .build()
    }

    fn ip_network(index: i64, vnic: &str) -> Value {
        RecordBuilder::new()
            .set("index", index)
            .set("shared_network", false)
            .set("vnic", vnic)
            .build()
    }

    fn list(items: Vec<Value>) -> Value {
        Value::List(items)
    }

    #[test]
    fn test_device_key() {
        assert_eq!(device_key(0), "eth0");
        assert_eq!(parse_device_key("eth12").unwrap(), 12);
        assert!(parse_device_key("ethX").unwrap_err().is_parse());
        assert!(parse_device_key("eth").unwrap_err().is_parse());
        assert!(parse_device_key("3").unwrap_err().is_parse());
    }

    #[test]
    fn test_expand_shared_and_ip_network() {
        let config = list(vec![
            shared(0, "ippool:/oracle/public/ippool"),
            ip_network(1, "vnic1"),
        ]);
        let networking = expand_network_interfaces(Some(&config)).unwrap();

        assert_eq!(
            networking.keys().collect::<Vec<_>>(),
            vec!["eth0", "eth1"]
        );

        let eth0 = &networking["eth0"];
        assert_eq!(eth0.model, Some(NicModel::E1000));
        assert!(eth0.vnic.is_none());
        assert_eq!(eth0.nat, vec!["ippool:/oracle/public/ippool"]);
        assert_eq!(eth0.sec_lists, vec!["/Compute-d/u/web"]);

        let eth1 = &networking["eth1"];
        assert_eq!(eth1.vnic.as_deref(), Some("vnic1"));
        assert!(eth1.model.is_none());
        assert!(eth1.sec_lists.is_empty());
    }

    #[test]
    fn test_expand_duplicate_index() {
        let config = list(vec![ip_network(0, "vnic0"), shared(0, "ippool:/oracle/public/ippool")]);
        let err = expand_network_interfaces(Some(&config)).unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().contains("Duplicate network interface"));
        assert!(err.to_string().contains("eth0"));
    }

    #[test]
    fn test_expand_missing_index() {
        let config = list(vec![RecordBuilder::new().set("vnic", "vnic0").build()]);
        let err = expand_network_interfaces(Some(&config)).unwrap_err();
        assert_eq!(
            err,
            Error::validation("Index not specified for network interface")
        );

        let config = list(vec![RecordBuilder::new().set("index", "0").build()]);
        assert!(expand_network_interfaces(Some(&config)).unwrap_err().is_validation());
    }

    #[test]
    fn test_expand_rejects_cross_kind_fields() {
        let config = list(vec![
            RecordBuilder::new()
                .set("index", 0i64)
                .set("shared_network", true)
                .set("vnic", "vnic0")
                .build(),
        ]);
        let err = expand_network_interfaces(Some(&config)).unwrap_err();
        assert!(err.to_string().contains("'vnic' cannot be set on eth0"));

        let config = list(vec![
            RecordBuilder::new()
                .set("index", 0i64)
                .set_list("sec_lists", &["web".to_string()])
                .build(),
        ]);
        assert!(expand_network_interfaces(Some(&config)).unwrap_err().is_validation());
    }

    #[test]
    fn test_expand_rejects_unknown_model() {
        let config = list(vec![
            RecordBuilder::new()
                .set("index", 0i64)
                .set("shared_network", true)
                .set("model", "virtio")
                .build(),
        ]);
        assert!(expand_network_interfaces(Some(&config)).unwrap_err().is_validation());
    }

    #[test]
    fn test_expand_empty() {
        assert!(expand_network_interfaces(None).unwrap().is_empty());
        assert!(expand_network_interfaces(Some(&list(vec![]))).unwrap().is_empty());
    }

    #[test]
    fn test_flatten_ip_network() {
        let mut networking = Networking::new();
        networking.insert(
            "eth3".to_string(),
            NetworkingInfo {
                ip_network: Some("net1".to_string()),
                vnic: Some("vnic3".to_string()),
                ..Default::default()
            },
        );

        let value = flatten_network_interfaces_value(&networking).unwrap();
        let expected = RecordBuilder::new()
            .set("index", 3i64)
            .set("ip_network", "net1")
            .set("vnic", "vnic3")
            .set("shared_network", false)
            .set("is_default_gateway", false)
            .build();
        assert_eq!(value, list(vec![expected]));
    }

    #[test]
    fn test_flatten_shared_network() {
        let mut networking = Networking::new();
        networking.insert(
            "eth0".to_string(),
            NetworkingInfo {
                model: Some(NicModel::E1000),
                nat: vec!["ippool:/oracle/public/ippool".to_string()],
                dns: vec!["web.compute.internal.".to_string()],
                ..Default::default()
            },
        );

        let interfaces = flatten_network_interfaces(&networking).unwrap();
        assert_eq!(interfaces.len(), 1);
        assert!(interfaces[0].is_shared());
        assert_eq!(interfaces[0].dns, vec!["web.compute.internal."]);
    }

    #[test]
    fn test_flatten_shared_network_keeps_reported_addressing() {
        let mut networking = Networking::new();
        networking.insert(
            "eth0".to_string(),
            NetworkingInfo {
                model: Some(NicModel::E1000),
                is_default_gateway: true,
                ip_address: Some("10.0.0.5".to_string()),
                mac_address: Some("c6:b0:09:f4:bc:c0".to_string()),
                ..Default::default()
            },
        );

        let value = flatten_network_interfaces_value(&networking).unwrap();
        let expected = RecordBuilder::new()
            .set("index", 0i64)
            .set("shared_network", true)
            .set("is_default_gateway", true)
            .set("ip_address", "10.0.0.5")
            .set("mac_address", "c6:b0:09:f4:bc:c0")
            .build();
        assert_eq!(value, list(vec![expected]));
    }

    #[test]
    fn test_flatten_orders_by_index() {
        let mut networking = Networking::new();
        for n in [10, 2, 0] {
            networking.insert(
                device_key(n),
                NetworkingInfo {
                    vnic: Some(format!("vnic{}", n)),
                    ..Default::default()
                },
            );
        }
        let indexes: Vec<u32> = flatten_network_interfaces(&networking)
            .unwrap()
            .iter()
            .map(|i| i.index)
            .collect();
        assert_eq!(indexes, vec![0, 2, 10]);
    }

    #[test]
    fn test_flatten_invalid_device_aborts() {
        let mut networking = Networking::new();
        networking.insert("eth0".to_string(), NetworkingInfo::default());
        networking.insert("ethX".to_string(), NetworkingInfo::default());
        assert!(flatten_network_interfaces(&networking).unwrap_err().is_parse());
    }

    #[test]
    fn test_flatten_conflicting_discriminants() {
        let mut networking = Networking::new();
        networking.insert(
            "eth0".to_string(),
            NetworkingInfo {
                model: Some(NicModel::E1000),
                vnic: Some("vnic0".to_string()),
                ..Default::default()
            },
        );
        assert!(flatten_network_interfaces(&networking).unwrap_err().is_parse());
    }

    #[test]
    fn test_round_trip() {
        let config = list(vec![
            shared(1, "ippool:/oracle/public/ippool"),
            RecordBuilder::new()
                .set("index", 0i64)
                .set("ip_network", "net0")
                .set("ip_address", "192.168.1.10")
                .set("vnic", "vnic0")
                .set("is_default_gateway", true)
                .set_list("vnic_sets", &["set0".to_string()])
                .set_list("name_servers", &["8.8.8.8".to_string()])
                .build(),
        ]);

        let expected = {
            let mut interfaces = interfaces_from_config(Some(&config)).unwrap();
            interfaces.sort_by_key(|i| i.index);
            interfaces
        };
        let networking = expand_network_interfaces(Some(&config)).unwrap();
        assert_eq!(flatten_network_interfaces(&networking).unwrap(), expected);

        // Flattened records are valid configuration again
        let flattened = flatten_network_interfaces_value(&networking).unwrap();
        assert_eq!(expand_network_interfaces(Some(&flattened)).unwrap(), networking);
    }
}
