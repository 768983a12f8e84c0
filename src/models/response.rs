use serde::{Deserialize, Serialize};

use super::record::{InspectionRecord, TyreRecord, VehicleImageRecord};

/// Link for one slot of a repeating group. `None` when the slot had no photo
/// or its upload failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoLink {
    pub position: String,
    pub photo_link: Option<String>,
}

impl From<&TyreRecord> for PhotoLink {
    fn from(tyre: &TyreRecord) -> Self {
        Self {
            position: tyre.position.clone(),
            photo_link: tyre.photo_link.clone(),
        }
    }
}

impl From<&VehicleImageRecord> for PhotoLink {
    fn from(image: &VehicleImageRecord) -> Self {
        Self {
            position: image.position.clone(),
            photo_link: image.photo_link.clone(),
        }
    }
}

/// A photo that could not be uploaded; the record was stored without its link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadFailure {
    pub slot: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitResponse {
    pub success: bool,
    pub message: String,
    pub record_id: String,
    pub battery1_photo_link: Option<String>,
    pub battery2_photo_link: Option<String>,
    pub odometer_photo_link: Option<String>,
    pub prime_tyre_links: Vec<PhotoLink>,
    pub trailer_tyre_links: Vec<PhotoLink>,
    pub vehicle_image_links: Vec<PhotoLink>,
    #[serde(default)]
    pub upload_failures: Vec<UploadFailure>,
}

impl SubmitResponse {
    pub fn from_record(
        record: &InspectionRecord,
        message: impl Into<String>,
        upload_failures: Vec<UploadFailure>,
    ) -> Self {
        Self {
            success: true,
            message: message.into(),
            record_id: record.record_id.clone(),
            battery1_photo_link: record.battery1_photo_link.clone(),
            battery2_photo_link: record.battery2_photo_link.clone(),
            odometer_photo_link: record.odometer_photo_link.clone(),
            prime_tyre_links: record.prime_tyres.iter().map(PhotoLink::from).collect(),
            trailer_tyre_links: record.trailer_tyres.iter().map(PhotoLink::from).collect(),
            vehicle_image_links: record.vehicle_images.iter().map(PhotoLink::from).collect(),
            upload_failures,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogsResponse {
    pub logs: Vec<InspectionRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehiclesResponse {
    pub vehicles: Vec<String>,
}

/// Result of a lookup by record id or vehicle number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LookupResponse {
    Record(Box<InspectionRecord>),
    Matches(LogsResponse),
}
