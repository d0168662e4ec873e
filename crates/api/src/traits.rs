//! The `Posty5Api` trait: the seam every resource builder talks through.

use async_trait::async_trait;
use serde_json::Value;

use crate::{ApiError, ApiRequest, UploadResponse};

/// An authenticated Posty5 connection.
///
/// [`crate::Gateway`] is the real implementation; [`crate::mock::MockApi`]
/// records calls for tests.
#[async_trait]
pub trait Posty5Api: Send + Sync {
    /// Perform one REST call and return the unwrapped payload.
    async fn send(&self, request: ApiRequest) -> Result<Value, ApiError>;

    /// PUT raw bytes to a pre-signed URL (no API key is attached).
    async fn upload(&self, upload_url: &str, bytes: Vec<u8>) -> Result<UploadResponse, ApiError>;
}
