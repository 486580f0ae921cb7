//! Client traits for the remote APIs
//!
//! The provider talks to OPC only through these traits. Concrete clients
//! (HTTP transport, authentication, retries) live outside this crate and are
//! handed to [`crate::OpcProvider`] at construction.

use async_trait::async_trait;
use thiserror::Error;

use crate::api::{
    CreateImageListEntryInput, CreateInstanceInput, CreateStorageAttachmentInput,
    ImageListEntryInfo, InstanceInfo, ListenerInfo, ListenerInput, OrchestrationInfo,
    OrchestrationInput, StorageAttachmentInfo, UpdateInstanceInput,
};

/// Errors returned by the remote APIs
#[derive(Debug, Error)]
pub enum ClientError {
    /// The object does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// The API rejected the request
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Connection, TLS or decoding failure
    #[error("Transport error: {0}")]
    Transport(String),
}

impl ClientError {
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

pub type ClientResult<T> = Result<T, ClientError>;

/// Turn a not-found error into `None`
pub fn optional<T>(result: ClientResult<T>) -> ClientResult<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.is_not_found() => Ok(None),
        Err(e) => Err(e),
    }
}

/// OPC Compute Classic API
#[async_trait]
pub trait ComputeApi: Send + Sync {
    async fn create_instance(&self, input: &CreateInstanceInput) -> ClientResult<InstanceInfo>;

    async fn get_instance(&self, name: &str, id: &str) -> ClientResult<InstanceInfo>;

    async fn update_instance(&self, input: &UpdateInstanceInput) -> ClientResult<InstanceInfo>;

    async fn delete_instance(&self, name: &str, id: &str) -> ClientResult<()>;

    /// All storage attachments of an instance (`name/id`)
    async fn list_storage_attachments(
        &self,
        instance_name: &str,
    ) -> ClientResult<Vec<StorageAttachmentInfo>>;

    async fn create_storage_attachment(
        &self,
        input: &CreateStorageAttachmentInput,
    ) -> ClientResult<StorageAttachmentInfo>;

    async fn get_storage_attachment(&self, name: &str) -> ClientResult<StorageAttachmentInfo>;

    async fn delete_storage_attachment(&self, name: &str) -> ClientResult<()>;

    async fn create_image_list_entry(
        &self,
        input: &CreateImageListEntryInput,
    ) -> ClientResult<ImageListEntryInfo>;

    async fn get_image_list_entry(&self, name: &str, version: u32)
    -> ClientResult<ImageListEntryInfo>;

    async fn delete_image_list_entry(&self, name: &str, version: u32) -> ClientResult<()>;

    async fn create_orchestration(
        &self,
        input: &OrchestrationInput,
    ) -> ClientResult<OrchestrationInfo>;

    async fn get_orchestration(&self, name: &str) -> ClientResult<OrchestrationInfo>;

    async fn update_orchestration(
        &self,
        input: &OrchestrationInput,
    ) -> ClientResult<OrchestrationInfo>;

    async fn delete_orchestration(&self, name: &str) -> ClientResult<()>;
}

/// OPC Load Balancer Classic API
///
/// `context` is the `region/load_balancer` pair addressing the parent.
#[async_trait]
pub trait LoadBalancerApi: Send + Sync {
    async fn create_listener(
        &self,
        context: &str,
        input: &ListenerInput,
    ) -> ClientResult<ListenerInfo>;

    async fn get_listener(&self, context: &str, name: &str) -> ClientResult<ListenerInfo>;

    async fn update_listener(
        &self,
        context: &str,
        input: &ListenerInput,
    ) -> ClientResult<ListenerInfo>;

    async fn delete_listener(&self, context: &str, name: &str) -> ClientResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optional_maps_not_found() {
        assert_eq!(optional(Ok::<_, ClientError>(1)).unwrap(), Some(1));
        assert_eq!(
            optional::<i32>(Err(ClientError::not_found("x"))).unwrap(),
            None
        );
        assert!(
            optional::<i32>(Err(ClientError::Api {
                status: 500,
                message: "boom".to_string()
            }))
            .is_err()
        );
    }

    #[test]
    fn client_error_display() {
        let err = ClientError::Api {
            status: 409,
            message: "conflict".to_string(),
        };
        assert_eq!(err.to_string(), "API error (409): conflict");
    }
}
