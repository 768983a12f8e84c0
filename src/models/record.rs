use serde::{Deserialize, Serialize};

/// Identity of the submitter, attached by the auth layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedBy {
    pub user_id: String,
    pub email: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TyreRecord {
    pub position: String,
    pub number: String,
    pub photo_link: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleImageRecord {
    pub position: String,
    pub photo_link: Option<String>,
}

/// A stored inspection, as appended to and read back from the row store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InspectionRecord {
    pub record_id: String,
    pub timestamp: String,
    pub vehicle_number: String,
    pub battery1_number: String,
    pub battery1_photo_link: Option<String>,
    pub battery2_number: String,
    pub battery2_photo_link: Option<String>,
    pub odometer_value: String,
    pub odometer_photo_link: Option<String>,
    pub prime_tyres: Vec<TyreRecord>,
    pub trailer_tyres: Vec<TyreRecord>,
    pub vehicle_images: Vec<VehicleImageRecord>,
    pub created_by: CreatedBy,
    #[serde(default)]
    pub synced_to_sheets: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submission_token: Option<String>,
}
