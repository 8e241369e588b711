use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::modules::storage::BlobStorage;
use crate::shared::constants::{
    ALLOWED_ATTACHMENT_TYPES, MAX_ATTACHMENT_SIZE, REPORT_ATTACHMENT_DIR,
};

use super::SubmissionError;

/// An image received with a submission
#[derive(Debug, Clone)]
pub struct AttachmentInput {
    pub file_name: Option<String>,
    pub content_type: String,
    pub data: Vec<u8>,
}

/// Where an accepted attachment ended up
#[derive(Debug, Clone, PartialEq)]
pub struct StoredAttachment {
    pub key: String,
    pub url: String,
}

pub struct AttachmentUploader {
    storage: Arc<dyn BlobStorage>,
}

impl AttachmentUploader {
    pub fn new(storage: Arc<dyn BlobStorage>) -> Self {
        Self { storage }
    }

    /// Store the attachment, if any. An absent or empty file is not an error.
    pub async fn upload(
        &self,
        user_id: &str,
        input: Option<AttachmentInput>,
        submitted_at: DateTime<Utc>,
    ) -> Result<Option<StoredAttachment>, SubmissionError> {
        let Some(input) = input.filter(|i| !i.data.is_empty()) else {
            return Ok(None);
        };

        if input.data.len() > MAX_ATTACHMENT_SIZE {
            return Err(SubmissionError::Attachment(format!(
                "Image must not exceed {} MB",
                MAX_ATTACHMENT_SIZE / 1024 / 1024
            )));
        }

        let content_type = input.content_type.trim().to_ascii_lowercase();
        let Some(extension) = extension_for(&content_type) else {
            return Err(SubmissionError::Attachment(format!(
                "Image type '{}' is not allowed. Allowed types: {}",
                input.content_type,
                ALLOWED_ATTACHMENT_TYPES.join(", ")
            )));
        };

        let path = attachment_path(user_id, submitted_at, extension);
        let size = input.data.len();

        let key = self
            .storage
            .upload_public(&path, input.data, &content_type)
            .await
            .map_err(|e| {
                tracing::error!("Failed to upload report attachment: {:?}", e);
                SubmissionError::Attachment("Failed to upload image".to_string())
            })?;

        tracing::debug!(
            "Stored attachment {} ({} bytes, original name {:?})",
            key,
            size,
            input.file_name
        );

        Ok(Some(StoredAttachment {
            url: self.storage.public_url(&key),
            key,
        }))
    }

    /// Best-effort removal of an attachment whose report was never written
    pub async fn discard(&self, attachment: &StoredAttachment) {
        match self.storage.delete(&attachment.key).await {
            Ok(()) => tracing::info!("Removed orphaned attachment {}", attachment.key),
            Err(e) => tracing::warn!(
                "Failed to remove orphaned attachment {}: {:?}",
                attachment.key,
                e
            ),
        }
    }
}

fn extension_for(content_type: &str) -> Option<&'static str> {
    if !ALLOWED_ATTACHMENT_TYPES.contains(&content_type) {
        return None;
    }
    match content_type {
        "image/jpeg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/webp" => Some("webp"),
        _ => None,
    }
}

/// `reports/{identity}/{millis}.{ext}`, relative to the public prefix
fn attachment_path(user_id: &str, submitted_at: DateTime<Utc>, extension: &str) -> String {
    format!(
        "{}/{}/{}.{}",
        REPORT_ATTACHMENT_DIR,
        urlencoding::encode(user_id),
        submitted_at.timestamp_millis(),
        extension
    )
}
