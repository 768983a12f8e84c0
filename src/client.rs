use std::sync::Arc;

use crate::error::AppResult;
use crate::form::InspectionForm;
use crate::http_client::HttpClient;
use crate::models::{
    InspectionRecord, LogsResponse, LookupResponse, SubmissionPayload, SubmitResponse,
    VehiclesResponse,
};
use crate::reference::ReferenceCache;

/// Talks to the maintenance API on behalf of the inspection form.
#[derive(Clone)]
pub struct MaintenanceClient {
    http: HttpClient,
    base_url: String,
    token: Option<String>,
    vehicles: Arc<dyn ReferenceCache>,
}

impl MaintenanceClient {
    pub fn new(
        http: HttpClient,
        base_url: impl Into<String>,
        vehicles: Arc<dyn ReferenceCache>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
            vehicles,
        }
    }

    /// Bearer token issued by the identity provider
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Vehicle list, served from the reference cache while it is fresh.
    pub async fn vehicles(&self) -> AppResult<Vec<String>> {
        if let Some(cached) = self.vehicles.get() {
            tracing::debug!("Vehicle list served from cache ({} entries)", cached.len());
            return Ok(cached);
        }
        self.fetch_vehicles().await
    }

    /// Drops the cached list and fetches it again.
    pub async fn refresh_vehicles(&self) -> AppResult<Vec<String>> {
        self.vehicles.clear();
        self.fetch_vehicles().await
    }

    async fn fetch_vehicles(&self) -> AppResult<Vec<String>> {
        let response: VehiclesResponse = self
            .http
            .get_json(&self.url("/api/vehicles"), None)
            .await?;
        self.vehicles.set(&response.vehicles);
        tracing::info!("Fetched {} vehicles", response.vehicles.len());
        Ok(response.vehicles)
    }

    /// Builds the payload from the form and submits it. Validation errors are
    /// returned before anything is sent.
    pub async fn submit_form(&self, form: &InspectionForm) -> AppResult<SubmitResponse> {
        let payload = form.build()?;
        self.submit(&payload).await
    }

    pub async fn submit(&self, payload: &SubmissionPayload) -> AppResult<SubmitResponse> {
        self.http
            .post_json(
                &self.url("/api/maintenance/submit"),
                payload,
                self.token.as_deref(),
            )
            .await
    }

    pub async fn logs(&self, vehicle_number: Option<&str>) -> AppResult<Vec<InspectionRecord>> {
        let mut url = self.url("/api/maintenance/logs");
        if let Some(vehicle) = vehicle_number.filter(|v| !v.trim().is_empty()) {
            url = format!("{}?vehicle_number={}", url, urlencoding::encode(vehicle));
        }
        let response: LogsResponse = self.http.get_json(&url, self.token.as_deref()).await?;
        Ok(response.logs)
    }

    pub async fn lookup(&self, identifier: &str) -> AppResult<LookupResponse> {
        let url = self.url(&format!(
            "/api/maintenance/logs/{}",
            urlencoding::encode(identifier.trim())
        ));
        self.http.get_json(&url, self.token.as_deref()).await
    }
}

/// Case-insensitive vehicle-number search over already fetched logs.
pub fn search_logs<'a>(logs: &'a [InspectionRecord], query: &str) -> Vec<&'a InspectionRecord> {
    let needle = query.trim().to_lowercase();
    logs.iter()
        .filter(|log| needle.is_empty() || log.vehicle_number.to_lowercase().contains(&needle))
        .collect()
}
