use async_trait::async_trait;
use google_cloud_storage::{
    client::{Client, ClientConfig},
    http::objects::upload::{Media, UploadObjectRequest, UploadType},
};

use crate::error::{AppError, AppResult};

use super::{upload_error, StorageBackend};

const GCS_PUBLIC_HOST: &str = "https://storage.googleapis.com";

pub struct GcsBackend {
    client: Client,
    bucket: String,
}

impl GcsBackend {
    pub async fn new(bucket: String) -> AppResult<Self> {
        let config = ClientConfig::default()
            .with_auth()
            .await
            .map_err(|e| AppError::Storage(format!("GCS auth failed: {}", e)))?;
        let client = Client::new(config);
        Ok(Self { client, bucket })
    }

    /// Public object URL; readable when the bucket grants `allUsers` viewer.
    pub fn public_url(&self, key: &str) -> String {
        format!("{}/{}/{}", GCS_PUBLIC_HOST, self.bucket, key)
    }
}

#[async_trait]
impl StorageBackend for GcsBackend {
    async fn upload(&self, key: &str, data: &[u8], content_type: &str) -> AppResult<String> {
        let mut media = Media::new(key.to_string());
        media.content_type = std::borrow::Cow::Owned(content_type.to_string());
        let upload_type = UploadType::Simple(media);

        self.client
            .upload_object(
                &UploadObjectRequest {
                    bucket: self.bucket.clone(),
                    ..Default::default()
                },
                data.to_vec(),
                &upload_type,
            )
            .await
            .map_err(|e| upload_error("GCS", key, e))?;

        tracing::info!("GCS upload: bucket={}, key={}", self.bucket, key);
        Ok(self.public_url(key))
    }

    fn bucket(&self) -> &str {
        &self.bucket
    }
}
