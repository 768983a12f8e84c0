use std::env;
use std::str::FromStr;

use crate::reference::parse_vehicle_list;

/// Default request body limit (photos travel inline as base64)
const DEFAULT_MAX_BODY_BYTES: usize = 32 * 1024 * 1024;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RowStoreKind {
    Sheets,
    Memory,
}

impl FromStr for RowStoreKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sheets" | "gsheet" => Ok(RowStoreKind::Sheets),
            "memory" => Ok(RowStoreKind::Memory),
            other => Err(format!("unknown ROW_STORE: {}", other)),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StorageKind {
    Gcs,
    R2,
    Memory,
}

impl FromStr for StorageKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gcs" => Ok(StorageKind::Gcs),
            "r2" => Ok(StorageKind::R2),
            "memory" => Ok(StorageKind::Memory),
            other => Err(format!("unknown STORAGE_BACKEND: {}", other)),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub max_body_bytes: usize,
    pub cors_origins: Vec<String>,

    pub row_store: RowStoreKind,
    pub gsheet_service_account_json: Option<String>,
    pub gsheet_spreadsheet_id: Option<String>,
    pub gsheet_range: String,

    pub storage_backend: StorageKind,
    pub gcs_bucket: Option<String>,
    pub r2_bucket: Option<String>,
    pub r2_account_id: Option<String>,
    pub r2_access_key: Option<String>,
    pub r2_secret_key: Option<String>,
    pub r2_public_base_url: Option<String>,

    pub database_url: Option<String>,

    pub clerk_domain: Option<String>,
    pub clerk_secret_key: Option<String>,

    pub vehicles: Vec<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup; `from_env` passes `std::env`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Ok(Config {
            server_host: get("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            server_port: get("SERVER_PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(8001),
            max_body_bytes: get("MAX_BODY_BYTES")
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_MAX_BODY_BYTES),
            cors_origins: get("CORS_ORIGINS")
                .map(|v| {
                    v.split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_default(),

            row_store: get("ROW_STORE")
                .map(|v| v.parse::<RowStoreKind>())
                .transpose()?
                .unwrap_or(RowStoreKind::Memory),
            gsheet_service_account_json: get("GSHEET_SERVICE_ACCOUNT_JSON"),
            gsheet_spreadsheet_id: get("GSHEET_SPREADSHEET_ID"),
            gsheet_range: get("GSHEET_RANGE").unwrap_or_else(|| "Sheet1".to_string()),

            storage_backend: get("STORAGE_BACKEND")
                .map(|v| v.parse::<StorageKind>())
                .transpose()?
                .unwrap_or(StorageKind::Memory),
            gcs_bucket: get("GCS_BUCKET"),
            r2_bucket: get("R2_BUCKET"),
            r2_account_id: get("R2_ACCOUNT_ID"),
            r2_access_key: get("R2_ACCESS_KEY"),
            r2_secret_key: get("R2_SECRET_KEY"),
            r2_public_base_url: get("R2_PUBLIC_BASE_URL"),

            database_url: get("DATABASE_URL"),

            clerk_domain: get("CLERK_DOMAIN"),
            clerk_secret_key: get("CLERK_SECRET_KEY"),

            vehicles: parse_vehicle_list(get("FLEET_VEHICLES").as_deref()),
        })
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

/// Reads a required setting, naming it in the error.
pub fn required<'a>(value: &'a Option<String>, key: &str) -> Result<&'a str, String> {
    value
        .as_deref()
        .ok_or_else(|| format!("{} must be set", key))
}
