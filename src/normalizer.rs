//! Photo normalization: every photo is downscaled and re-encoded as JPEG
//! before it is allowed into a submission payload.

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::GenericImageView;

use crate::error::{AppError, AppResult};
use crate::models::EncodedImage;

pub const DEFAULT_MAX_DIMENSION: u32 = 1280;
pub const DEFAULT_QUALITY: f32 = 0.7;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageNormalizer {
    max_dimension: u32,
    quality: f32,
}

impl Default for ImageNormalizer {
    fn default() -> Self {
        Self {
            max_dimension: DEFAULT_MAX_DIMENSION,
            quality: DEFAULT_QUALITY,
        }
    }
}

impl ImageNormalizer {
    /// `quality` is in 0..=1, `max_dimension` bounds the longer side in pixels.
    pub fn new(max_dimension: u32, quality: f32) -> AppResult<Self> {
        if max_dimension == 0 {
            return Err(AppError::InvalidInput(
                "max_dimension must be positive".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&quality) {
            return Err(AppError::InvalidInput(format!(
                "quality must be within 0..=1, got {}",
                quality
            )));
        }
        Ok(Self {
            max_dimension,
            quality,
        })
    }

    pub fn max_dimension(&self) -> u32 {
        self.max_dimension
    }

    pub fn quality(&self) -> f32 {
        self.quality
    }

    /// Output size for a `width` x `height` source. Never upscales.
    pub fn target_dimensions(&self, width: u32, height: u32) -> (u32, u32) {
        let longest = width.max(height);
        if longest <= self.max_dimension {
            return (width, height);
        }
        let scale = f64::from(self.max_dimension) / f64::from(longest);
        let scaled = |v: u32| ((f64::from(v) * scale).round() as u32).clamp(1, self.max_dimension);
        (scaled(width), scaled(height))
    }

    fn jpeg_quality(&self) -> u8 {
        ((self.quality * 100.0).round() as u8).clamp(1, 100)
    }

    pub fn normalize(&self, raw: &[u8]) -> AppResult<EncodedImage> {
        let decoded = image::load_from_memory(raw).map_err(|e| AppError::Decode(e.to_string()))?;
        let (width, height) = decoded.dimensions();
        let (target_width, target_height) = self.target_dimensions(width, height);
        if target_width == 0 || target_height == 0 {
            return Err(AppError::Encode(format!(
                "cannot render a {}x{} image",
                target_width, target_height
            )));
        }

        let resized = if (target_width, target_height) == (width, height) {
            decoded
        } else {
            decoded.resize_exact(target_width, target_height, FilterType::Triangle)
        };
        let rgb = resized.to_rgb8();

        let mut buf = Vec::new();
        let mut encoder = JpegEncoder::new_with_quality(&mut buf, self.jpeg_quality());
        encoder
            .encode_image(&rgb)
            .map_err(|e| AppError::Encode(e.to_string()))?;

        tracing::debug!(
            "Normalized photo: {}x{} -> {}x{}, {} -> {} bytes",
            width,
            height,
            target_width,
            target_height,
            raw.len(),
            buf.len()
        );
        Ok(EncodedImage::jpeg(buf))
    }
}
