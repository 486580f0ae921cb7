//! Storage attachments - Expansion and flattening of `storage` blocks

use opc_core::resource::Value;
use opc_core::{Error, Result};

use crate::api::{InstanceStorageAttachment, StorageAttachmentInput, StorageAttachmentInfo};
use crate::record::{Record, RecordBuilder, records};

/// Lowest and highest device index a volume can be attached at
pub const MIN_INDEX: u32 = 1;
pub const MAX_INDEX: u32 = 10;

/// One storage attachment of an instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageAttachment {
    pub index: u32,
    pub volume: String,
    /// Attachment name assigned by the API
    pub name: Option<String>,
}

impl StorageAttachment {
    pub fn from_record(record: &Record<'_>) -> Result<Self> {
        let index = record
            .int("index")?
            .ok_or_else(|| Error::validation("Index not specified for storage attachment"))?;
        Ok(Self {
            index: check_index(index)?,
            volume: record.require_string("volume")?,
            name: record.string("name")?,
        })
    }

    pub fn to_value(&self) -> Value {
        RecordBuilder::new()
            .set("index", i64::from(self.index))
            .set("volume", self.volume.as_str())
            .set_opt("name", self.name.as_deref())
            .build()
    }
}

/// Check that an index lies within the attachable range
pub fn check_index(index: i64) -> Result<u32> {
    u32::try_from(index)
        .ok()
        .filter(|i| (MIN_INDEX..=MAX_INDEX).contains(i))
        .ok_or_else(|| {
            Error::validation(format!(
                "storage index {} is out of range {}..={}",
                index, MIN_INDEX, MAX_INDEX
            ))
        })
}

/// Expand `storage` records into the launch request shape
///
/// Index uniqueness is not checked here; see [`ensure_index_available`].
pub fn expand_storage_attachments(config: Option<&Value>) -> Result<Vec<StorageAttachmentInput>> {
    records("storage attachment", config)?
        .iter()
        .map(|record| {
            let attachment = StorageAttachment::from_record(record)?;
            Ok(StorageAttachmentInput {
                index: attachment.index,
                volume: attachment.volume,
            })
        })
        .collect()
}

/// Flatten the instance's attachments; `None` when there are none
pub fn flatten_storage_attachments(
    attachments: &[InstanceStorageAttachment],
) -> Option<Vec<StorageAttachment>> {
    if attachments.is_empty() {
        return None;
    }
    Some(
        attachments
            .iter()
            .map(|a| StorageAttachment {
                index: a.index,
                volume: a.storage_volume_name.clone(),
                name: Some(a.name.clone()),
            })
            .collect(),
    )
}

/// Flatten the instance's attachments into `storage` records
pub fn flatten_storage_attachments_value(attachments: &[InstanceStorageAttachment]) -> Option<Value> {
    flatten_storage_attachments(attachments)
        .map(|list| Value::List(list.iter().map(StorageAttachment::to_value).collect()))
}

/// Fail if `index` is already occupied on the target instance
pub fn ensure_index_available(existing: &[StorageAttachmentInfo], index: u32) -> Result<()> {
    match existing.iter().find(|a| a.index == index) {
        Some(occupied) => Err(Error::validation(format!(
            "storage index {} is already in use by {} on {}",
            index, occupied.storage_volume_name, occupied.instance_name
        ))),
        None => Ok(()),
    }
}
