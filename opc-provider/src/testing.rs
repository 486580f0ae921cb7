//! In-memory API doubles for adapter and provider tests

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;

use crate::api::{
    CreateImageListEntryInput, CreateInstanceInput, CreateStorageAttachmentInput,
    ImageListEntryInfo, InstanceInfo, InstanceStorageAttachment, ListenerInfo, ListenerInput,
    OrchestrationInfo, OrchestrationInput, OrchestrationObjectInfo, StorageAttachmentInfo,
    UpdateInstanceInput,
};
use crate::client::{ClientError, ClientResult, ComputeApi, LoadBalancerApi};
use crate::config::ProviderConfig;

pub fn test_config() -> ProviderConfig {
    ProviderConfig {
        user: "user@example.com".to_string(),
        password: "secret".to_string(),
        identity_domain: "mydomain".to_string(),
        endpoint: "https://compute.example.com".to_string(),
        lbaas_endpoint: Some("https://lbaas.example.com".to_string()),
        max_retries: ProviderConfig::DEFAULT_MAX_RETRIES,
        insecure: false,
    }
}

#[derive(Default)]
pub struct FakeCompute {
    next_id: AtomicU64,
    instances: Mutex<HashMap<(String, String), InstanceInfo>>,
    attachments: Mutex<HashMap<String, StorageAttachmentInfo>>,
    entries: Mutex<HashMap<(String, u32), ImageListEntryInfo>>,
    orchestrations: Mutex<HashMap<String, OrchestrationInfo>>,
}

impl FakeCompute {
    fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }

    fn launch(&self, input: &CreateInstanceInput) -> InstanceInfo {
        InstanceInfo {
            name: input.name.clone(),
            id: format!("{:08x}", self.next_id()),
            shape: input.shape.clone(),
            image_list: input.image_list.clone(),
            label: input.label.clone(),
            hostname: input.hostname.clone(),
            ssh_keys: input.ssh_keys.clone(),
            tags: input.tags.clone(),
            boot_order: input.boot_order.clone(),
            storage: input
                .storage
                .iter()
                .map(|s| InstanceStorageAttachment {
                    index: s.index,
                    storage_volume_name: s.volume.clone(),
                    name: format!("{}/attachment-{}", input.name, s.index),
                })
                .collect(),
            networking: input.networking.clone(),
            reverse_dns: input.reverse_dns,
            state: input
                .desired_state
                .clone()
                .unwrap_or_else(|| "running".to_string()),
            ip_address: Some("10.0.0.2".to_string()),
            attributes: input.attributes.clone(),
        }
    }

    fn orchestrate(&self, input: &OrchestrationInput) -> OrchestrationInfo {
        let active = input.desired_state == "active";
        OrchestrationInfo {
            name: input.name.clone(),
            desired_state: input.desired_state.clone(),
            description: input.description.clone(),
            status: if active { "ready" } else { "stopped" }.to_string(),
            objects: input
                .objects
                .iter()
                .map(|object| OrchestrationObjectInfo {
                    label: object.label.clone(),
                    persistent: object.persistent,
                    template: object.template.clone(),
                    instance: active.then(|| self.launch(&object.template)),
                })
                .collect(),
        }
    }
}

#[async_trait]
impl ComputeApi for FakeCompute {
    async fn create_instance(&self, input: &CreateInstanceInput) -> ClientResult<InstanceInfo> {
        let info = self.launch(input);
        self.instances
            .lock()
            .unwrap()
            .insert((info.name.clone(), info.id.clone()), info.clone());
        Ok(info)
    }

    async fn get_instance(&self, name: &str, id: &str) -> ClientResult<InstanceInfo> {
        self.instances
            .lock()
            .unwrap()
            .get(&(name.to_string(), id.to_string()))
            .cloned()
            .ok_or_else(|| ClientError::not_found(format!("{}/{}", name, id)))
    }

    async fn update_instance(&self, input: &UpdateInstanceInput) -> ClientResult<InstanceInfo> {
        let mut instances = self.instances.lock().unwrap();
        let info = instances
            .get_mut(&(input.name.clone(), input.id.clone()))
            .ok_or_else(|| ClientError::not_found(format!("{}/{}", input.name, input.id)))?;
        info.tags = input.tags.clone();
        if let Some(state) = &input.desired_state {
            info.state = state.clone();
        }
        Ok(info.clone())
    }

    async fn delete_instance(&self, name: &str, id: &str) -> ClientResult<()> {
        self.instances
            .lock()
            .unwrap()
            .remove(&(name.to_string(), id.to_string()))
            .map(|_| ())
            .ok_or_else(|| ClientError::not_found(format!("{}/{}", name, id)))
    }

    async fn list_storage_attachments(
        &self,
        instance_name: &str,
    ) -> ClientResult<Vec<StorageAttachmentInfo>> {
        Ok(self
            .attachments
            .lock()
            .unwrap()
            .values()
            .filter(|a| a.instance_name == instance_name)
            .cloned()
            .collect())
    }

    async fn create_storage_attachment(
        &self,
        input: &CreateStorageAttachmentInput,
    ) -> ClientResult<StorageAttachmentInfo> {
        let info = StorageAttachmentInfo {
            name: format!("{}/{:08x}", input.instance_name, self.next_id()),
            instance_name: input.instance_name.clone(),
            storage_volume_name: input.storage_volume_name.clone(),
            index: input.index,
            state: "attached".to_string(),
        };
        self.attachments
            .lock()
            .unwrap()
            .insert(info.name.clone(), info.clone());
        Ok(info)
    }

    async fn get_storage_attachment(&self, name: &str) -> ClientResult<StorageAttachmentInfo> {
        self.attachments
            .lock()
            .unwrap()
            .get(name)
            .cloned()
            .ok_or_else(|| ClientError::not_found(name))
    }

    async fn delete_storage_attachment(&self, name: &str) -> ClientResult<()> {
        self.attachments
            .lock()
            .unwrap()
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| ClientError::not_found(name))
    }

    async fn create_image_list_entry(
        &self,
        input: &CreateImageListEntryInput,
    ) -> ClientResult<ImageListEntryInfo> {
        let info = ImageListEntryInfo {
            name: input.name.clone(),
            version: input.version,
            machine_images: input.machine_images.clone(),
            attributes: input.attributes.clone(),
            uri: format!(
                "https://compute.example.com/imagelist{}/entry/{}",
                input.name, input.version
            ),
        };
        self.entries
            .lock()
            .unwrap()
            .insert((info.name.clone(), info.version), info.clone());
        Ok(info)
    }

    async fn get_image_list_entry(
        &self,
        name: &str,
        version: u32,
    ) -> ClientResult<ImageListEntryInfo> {
        self.entries
            .lock()
            .unwrap()
            .get(&(name.to_string(), version))
            .cloned()
            .ok_or_else(|| ClientError::not_found(format!("{}|{}", name, version)))
    }

    async fn delete_image_list_entry(&self, name: &str, version: u32) -> ClientResult<()> {
        self.entries
            .lock()
            .unwrap()
            .remove(&(name.to_string(), version))
            .map(|_| ())
            .ok_or_else(|| ClientError::not_found(format!("{}|{}", name, version)))
    }

    async fn create_orchestration(
        &self,
        input: &OrchestrationInput,
    ) -> ClientResult<OrchestrationInfo> {
        let info = self.orchestrate(input);
        self.orchestrations
            .lock()
            .unwrap()
            .insert(info.name.clone(), info.clone());
        Ok(info)
    }

    async fn get_orchestration(&self, name: &str) -> ClientResult<OrchestrationInfo> {
        self.orchestrations
            .lock()
            .unwrap()
            .get(name)
            .cloned()
            .ok_or_else(|| ClientError::not_found(name))
    }

    async fn update_orchestration(
        &self,
        input: &OrchestrationInput,
    ) -> ClientResult<OrchestrationInfo> {
        let mut orchestrations = self.orchestrations.lock().unwrap();
        if !orchestrations.contains_key(&input.name) {
            return Err(ClientError::not_found(input.name.as_str()));
        }
        let info = self.orchestrate(input);
        orchestrations.insert(info.name.clone(), info.clone());
        Ok(info)
    }

    async fn delete_orchestration(&self, name: &str) -> ClientResult<()> {
        self.orchestrations
            .lock()
            .unwrap()
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| ClientError::not_found(name))
    }
}

#[derive(Default)]
pub struct FakeLoadBalancer {
    listeners: Mutex<HashMap<(String, String), ListenerInfo>>,
}

fn listener_info(context: &str, input: &ListenerInput) -> ListenerInfo {
    ListenerInfo {
        name: input.name.clone(),
        balancer_protocol: input.balancer_protocol.clone(),
        port: input.port,
        server_protocol: input.server_protocol.clone(),
        virtual_hosts: input.virtual_hosts.clone(),
        path_prefixes: input.path_prefixes.clone(),
        policies: input.policies.clone(),
        tags: input.tags.clone(),
        enabled: input.enabled,
        uri: format!(
            "https://lbaas.example.com/vlbrs/{}/listeners/{}",
            context, input.name
        ),
    }
}

#[async_trait]
impl LoadBalancerApi for FakeLoadBalancer {
    async fn create_listener(
        &self,
        context: &str,
        input: &ListenerInput,
    ) -> ClientResult<ListenerInfo> {
        let mut listeners = self.listeners.lock().unwrap();
        let key = (context.to_string(), input.name.clone());
        if listeners.contains_key(&key) {
            return Err(ClientError::Api {
                status: 409,
                message: format!("listener {} already exists", input.name),
            });
        }
        let info = listener_info(context, input);
        listeners.insert(key, info.clone());
        Ok(info)
    }

    async fn get_listener(&self, context: &str, name: &str) -> ClientResult<ListenerInfo> {
        self.listeners
            .lock()
            .unwrap()
            .get(&(context.to_string(), name.to_string()))
            .cloned()
            .ok_or_else(|| ClientError::not_found(format!("{}/{}", context, name)))
    }

    async fn update_listener(
        &self,
        context: &str,
        input: &ListenerInput,
    ) -> ClientResult<ListenerInfo> {
        let mut listeners = self.listeners.lock().unwrap();
        let key = (context.to_string(), input.name.clone());
        if !listeners.contains_key(&key) {
            return Err(ClientError::not_found(format!("{}/{}", context, input.name)));
        }
        let info = listener_info(context, input);
        listeners.insert(key, info.clone());
        Ok(info)
    }

    async fn delete_listener(&self, context: &str, name: &str) -> ClientResult<()> {
        self.listeners
            .lock()
            .unwrap()
            .remove(&(context.to_string(), name.to_string()))
            .map(|_| ())
            .ok_or_else(|| ClientError::not_found(format!("{}/{}", context, name)))
    }
}
