use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{DefaultBodyLimit, Path, Query, State};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use serde::Deserialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::error::{AppError, AppResult};
use crate::identity::TokenVerifier;
use crate::middleware::{AuthLayer, AuthenticatedUser};
use crate::models::{
    LogsResponse, LookupResponse, SubmissionPayload, SubmitResponse, VehiclesResponse,
};
use crate::services::MaintenanceService;

#[derive(Clone)]
pub struct AppState {
    pub maintenance: Arc<MaintenanceService>,
    pub vehicles: Arc<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct LogsQuery {
    pub vehicle_number: Option<String>,
}

/// Create the API router
pub fn create_router(
    state: AppState,
    verifier: Arc<dyn TokenVerifier>,
    cors_origins: &[String],
    max_body_bytes: usize,
) -> Router {
    let cors = if cors_origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    };

    Router::new()
        .route("/api/health", get(health_check))
        .route("/api/vehicles", get(list_vehicles))
        .route("/api/maintenance/submit", post(submit_log))
        .route("/api/maintenance/logs", get(list_logs))
        .route("/api/maintenance/logs/:identifier", get(lookup_log))
        .layer(AuthLayer::new(verifier))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "fleet-maint"
    }))
}

async fn list_vehicles(State(state): State<AppState>) -> Json<VehiclesResponse> {
    Json(VehiclesResponse {
        vehicles: state.vehicles.as_ref().clone(),
    })
}

async fn submit_log(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    payload: Result<Json<SubmissionPayload>, JsonRejection>,
) -> AppResult<Json<SubmitResponse>> {
    let Json(payload) = payload.map_err(|e| AppError::InvalidInput(e.body_text()))?;
    tracing::info!(
        "Submission from {}: vehicle={}, photos={}",
        user.user_id,
        payload.vehicle_number,
        payload.photo_count()
    );
    let response = state.maintenance.submit(payload, user.into()).await?;
    Ok(Json(response))
}

async fn list_logs(
    State(state): State<AppState>,
    Query(query): Query<LogsQuery>,
) -> AppResult<Json<LogsResponse>> {
    let logs = state
        .maintenance
        .list(query.vehicle_number.as_deref())
        .await?;
    Ok(Json(LogsResponse { logs }))
}

async fn lookup_log(
    State(state): State<AppState>,
    Path(identifier): Path<String>,
) -> AppResult<Json<LookupResponse>> {
    Ok(Json(state.maintenance.lookup(&identifier).await?))
}
