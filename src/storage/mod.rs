// Storage abstraction for GCS, R2 and in-memory backends

pub mod gcs;
pub mod memory;
pub mod r2;

pub use gcs::GcsBackend;
pub use memory::MemoryBackend;
pub use r2::R2Backend;

use std::fmt::Display;

use async_trait::async_trait;

use crate::error::{AppError, AppResult};

/// Blob storage for inspection photos (GCS / R2 / memory share this interface)
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Uploads an object and returns a link the dashboard can open
    async fn upload(&self, key: &str, data: &[u8], content_type: &str) -> AppResult<String>;

    /// Bucket name
    fn bucket(&self) -> &str;
}

/// Object name for one photo: `<vehicle>/<record_id>/<slot>.<ext>`
pub fn photo_key(vehicle_number: &str, record_id: &str, slot: &str, extension: &str) -> String {
    format!(
        "{}/{}/{}.{}",
        crate::positions::slug(vehicle_number),
        record_id,
        slot,
        extension
    )
}

/// A backend refused or failed one object write. Setup failures stay `Storage`.
pub(crate) fn upload_error(backend: &str, key: &str, cause: impl Display) -> AppError {
    AppError::Upload(format!("{} upload failed: key={}, {}", backend, key, cause))
}
