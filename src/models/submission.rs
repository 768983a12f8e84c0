use serde::{Deserialize, Serialize};

use super::image::{deserialize_optional, WirePhoto};

/// One tyre slot as sent on the wire.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TyreEntry {
    pub position: String,
    #[serde(default)]
    pub number: String,
    #[serde(default, deserialize_with = "deserialize_optional")]
    pub photo_base64: Option<WirePhoto>,
}

impl TyreEntry {
    pub fn is_filled(&self) -> bool {
        !self.number.trim().is_empty() || self.photo_base64.is_some()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VehicleImageEntry {
    pub position: String,
    #[serde(default, deserialize_with = "deserialize_optional")]
    pub photo_base64: Option<WirePhoto>,
}

impl VehicleImageEntry {
    pub fn is_filled(&self) -> bool {
        self.photo_base64.is_some()
    }
}

/// Body of `POST /api/maintenance/submit`.
///
/// Batteries and odometer are always present (empty strings when unset); the
/// three repeating groups only carry filled slots.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubmissionPayload {
    /// Required; a missing key is reported by validation, not by the JSON decoder.
    #[serde(default)]
    pub vehicle_number: String,
    #[serde(default)]
    pub battery1_number: String,
    #[serde(default, deserialize_with = "deserialize_optional")]
    pub battery1_photo_base64: Option<WirePhoto>,
    #[serde(default)]
    pub battery2_number: String,
    #[serde(default, deserialize_with = "deserialize_optional")]
    pub battery2_photo_base64: Option<WirePhoto>,
    #[serde(default)]
    pub odometer_value: String,
    #[serde(default, deserialize_with = "deserialize_optional")]
    pub odometer_photo_base64: Option<WirePhoto>,
    #[serde(default)]
    pub prime_tyres: Vec<TyreEntry>,
    #[serde(default)]
    pub trailer_tyres: Vec<TyreEntry>,
    #[serde(default)]
    pub vehicle_images: Vec<VehicleImageEntry>,
    /// Client-generated key; a retried submission with the same key is not stored twice.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submission_token: Option<String>,
}

impl SubmissionPayload {
    pub fn photo_count(&self) -> usize {
        [
            &self.battery1_photo_base64,
            &self.battery2_photo_base64,
            &self.odometer_photo_base64,
        ]
        .iter()
        .filter(|p| p.is_some())
        .count()
            + self
                .prime_tyres
                .iter()
                .chain(self.trailer_tyres.iter())
                .filter(|t| t.photo_base64.is_some())
                .count()
            + self
                .vehicle_images
                .iter()
                .filter(|v| v.photo_base64.is_some())
                .count()
    }
}
