//! Blob storage for report attachments.
//!
//! Services depend on the [`BlobStorage`] trait; [`MinIOClient`] is the
//! S3-compatible implementation used in production.

mod minio_client;

use async_trait::async_trait;

use crate::core::error::AppError;

pub use minio_client::MinIOClient;

#[async_trait]
pub trait BlobStorage: Send + Sync {
    /// Store an object below the public prefix. `path` is relative to that
    /// prefix; the full object key is returned.
    async fn upload_public(
        &self,
        path: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> Result<String, AppError>;

    /// Anonymous-readable URL for an object key
    fn public_url(&self, key: &str) -> String;

    async fn delete(&self, key: &str) -> Result<(), AppError>;
}
