use std::sync::LazyLock;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{AppError, AppResult};

/// `data:<media-type>;base64,` header of a data URL
static RE_DATA_URL_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^data:([A-Za-z0-9.+-]+/[A-Za-z0-9.+-]+);base64,").unwrap()
});

/// A photo that always knows its media type. Travels on the wire as a data URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    media_type: String,
    bytes: Vec<u8>,
}

impl EncodedImage {
    /// Media type assumed for bare base64 payloads without a data URL header.
    pub const DEFAULT_MEDIA_TYPE: &'static str = "image/jpeg";

    pub fn new(media_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            media_type: media_type.into(),
            bytes,
        }
    }

    pub fn jpeg(bytes: Vec<u8>) -> Self {
        Self::new(Self::DEFAULT_MEDIA_TYPE, bytes)
    }

    /// Parses a data URL, or bare base64 which is tagged as JPEG.
    pub fn parse(value: &str) -> AppResult<Self> {
        let value = value.trim();
        let (media_type, payload) = match RE_DATA_URL_HEADER.captures(value) {
            Some(caps) => {
                let header_len = caps.get(0).map(|m| m.end()).unwrap_or(0);
                (caps[1].to_ascii_lowercase(), &value[header_len..])
            }
            None if value.starts_with("data:") => {
                return Err(AppError::InvalidInput(
                    "Unsupported data URL header".to_string(),
                ))
            }
            None => (Self::DEFAULT_MEDIA_TYPE.to_string(), value),
        };

        // Line-wrapped base64 is accepted
        let payload: String = payload
            .chars()
            .filter(|c| !c.is_ascii_whitespace())
            .collect();
        let bytes = BASE64
            .decode(payload.as_bytes())
            .map_err(|e| AppError::InvalidInput(format!("Invalid base64 image: {}", e)))?;
        if bytes.is_empty() {
            return Err(AppError::InvalidInput("Empty image payload".to_string()));
        }

        Ok(Self { media_type, bytes })
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// File extension for the blob object name.
    pub fn extension(&self) -> &'static str {
        match self.media_type.as_str() {
            "image/png" => "png",
            "image/webp" => "webp",
            "image/gif" => "gif",
            "image/heic" => "heic",
            _ => "jpg",
        }
    }

    pub fn to_data_url(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.media_type,
            BASE64.encode(&self.bytes)
        )
    }
}

impl Serialize for EncodedImage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_data_url())
    }
}

impl<'de> Deserialize<'de> for EncodedImage {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        EncodedImage::parse(&value).map_err(serde::de::Error::custom)
    }
}

/// A photo as received in a submission. A value that does not decode is kept
/// so the slot can be reported as failed without rejecting the whole body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WirePhoto {
    Image(EncodedImage),
    Undecodable { raw: String, reason: String },
}

impl WirePhoto {
    pub fn from_wire(value: &str) -> Self {
        match EncodedImage::parse(value) {
            Ok(image) => WirePhoto::Image(image),
            Err(e) => WirePhoto::Undecodable {
                raw: value.to_string(),
                reason: e.to_string(),
            },
        }
    }

    pub fn image(&self) -> Option<&EncodedImage> {
        match self {
            WirePhoto::Image(image) => Some(image),
            WirePhoto::Undecodable { .. } => None,
        }
    }
}

impl From<EncodedImage> for WirePhoto {
    fn from(image: EncodedImage) -> Self {
        WirePhoto::Image(image)
    }
}

impl Serialize for WirePhoto {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            WirePhoto::Image(image) => image.serialize(serializer),
            WirePhoto::Undecodable { raw, .. } => serializer.serialize_str(raw),
        }
    }
}

/// Treats `null`, a missing field and `""` alike as "no photo".
pub fn deserialize_optional<'de, D>(deserializer: D) -> Result<Option<WirePhoto>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value
        .filter(|s| !s.trim().is_empty())
        .map(|s| WirePhoto::from_wire(&s)))
}
