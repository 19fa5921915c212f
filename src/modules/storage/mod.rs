//! Storage module for uploaded photos
//!
//! Provides the object storage seam used by report submission and
//! resolution, and its MinIO/S3-compatible implementation.

mod minio_client;

use async_trait::async_trait;

use crate::core::error::AppError;

pub use minio_client::MinIOClient;

/// Write-once object storage for publicly served files
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Store `data` under `path` in the public area and return its URL
    async fn put_public(
        &self,
        path: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> Result<String, AppError>;
}
