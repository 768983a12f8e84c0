use async_trait::async_trait;
use s3::bucket::Bucket;
use s3::creds::Credentials;
use s3::Region;

use crate::error::{AppError, AppResult};

use super::{upload_error, StorageBackend};

pub struct R2Backend {
    bucket: Box<Bucket>,
    bucket_name: String,
    public_base_url: Option<String>,
}

impl R2Backend {
    pub fn new(
        bucket_name: String,
        account_id: String,
        access_key: String,
        secret_key: String,
        public_base_url: Option<String>,
    ) -> AppResult<Self> {
        let region = Region::Custom {
            region: "auto".to_string(),
            endpoint: format!("https://{}.r2.cloudflarestorage.com", account_id),
        };

        let credentials = Credentials::new(
            Some(&access_key),
            Some(&secret_key),
            None, // security token
            None, // session token
            None, // profile
        )
        .map_err(|e| AppError::Storage(format!("R2 credentials error: {}", e)))?;

        let bucket = Bucket::new(&bucket_name, region, credentials)
            .map_err(|e| AppError::Storage(format!("R2 bucket error: {}", e)))?;

        Ok(Self {
            bucket,
            bucket_name,
            public_base_url,
        })
    }

    /// Link for `key`: under the public bucket domain when configured, else an `r2://` path.
    pub fn link_for(&self, key: &str) -> String {
        match &self.public_base_url {
            Some(base) => format!("{}/{}", base.trim_end_matches('/'), key),
            None => format!("r2://{}/{}", self.bucket_name, key),
        }
    }
}

#[async_trait]
impl StorageBackend for R2Backend {
    async fn upload(&self, key: &str, data: &[u8], content_type: &str) -> AppResult<String> {
        let response = self
            .bucket
            .put_object_with_content_type(key, data, content_type)
            .await
            .map_err(|e| upload_error("R2", key, e))?;
        if !(200..300).contains(&response.status_code()) {
            return Err(upload_error(
                "R2",
                key,
                format!("status={}", response.status_code()),
            ));
        }

        tracing::info!("R2 upload: bucket={}, key={}", self.bucket_name, key);
        Ok(self.link_for(key))
    }

    fn bucket(&self) -> &str {
        &self.bucket_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend(public_base_url: Option<String>) -> R2Backend {
        R2Backend::new(
            "fleet-photos".into(),
            "acct".into(),
            "access".into(),
            "secret".into(),
            public_base_url,
        )
        .unwrap()
    }

    #[test]
    fn test_link_for() {
        assert_eq!(
            backend(Some("https://photos.example.com/".into())).link_for("v/r/a.jpg"),
            "https://photos.example.com/v/r/a.jpg"
        );
        assert_eq!(backend(None).link_for("v/r/a.jpg"), "r2://fleet-photos/v/r/a.jpg");
    }
}
