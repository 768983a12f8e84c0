// Shared fixtures for unit tests

use std::io::Cursor;
use std::sync::Arc;

use async_trait::async_trait;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};

use crate::error::{AppError, AppResult};
use crate::identity::TokenVerifier;
use crate::middleware::AuthenticatedUser;
use crate::storage::StorageBackend;

/// Token accepted by [`StaticVerifier`]
pub const TEST_TOKEN: &str = "test-token";

/// PNG bytes of a `width` x `height` gradient
pub fn png_fixture(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    });
    let mut out = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(img)
        .write_to(&mut out, ImageFormat::Png)
        .unwrap();
    out.into_inner()
}

pub fn test_user() -> AuthenticatedUser {
    AuthenticatedUser {
        user_id: "user_1".into(),
        email: "inspector@example.com".into(),
        name: "Test Inspector".into(),
    }
}

/// Accepts exactly [`TEST_TOKEN`]
pub struct StaticVerifier;

impl StaticVerifier {
    pub fn shared() -> Arc<dyn TokenVerifier> {
        Arc::new(StaticVerifier)
    }
}

#[async_trait]
impl TokenVerifier for StaticVerifier {
    async fn verify(&self, token: &str) -> AppResult<AuthenticatedUser> {
        if token == TEST_TOKEN {
            Ok(test_user())
        } else {
            Err(AppError::Unauthorized("unknown token".into()))
        }
    }
}

/// Rejects uploads whose key contains `fail_on`
pub struct FailingStorage {
    pub fail_on: &'static str,
}

#[async_trait]
impl StorageBackend for FailingStorage {
    async fn upload(&self, key: &str, _data: &[u8], _content_type: &str) -> AppResult<String> {
        if key.contains(self.fail_on) {
            Err(AppError::Upload(format!("bucket rejected {}", key)))
        } else {
            Ok(format!("memory://failing/{}", key))
        }
    }

    fn bucket(&self) -> &str {
        "failing"
    }
}
