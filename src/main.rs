use std::sync::Arc;

use anyhow::Context;
use fleet_maint::api::{create_router, AppState};
use fleet_maint::config::{required, Config, RowStoreKind, StorageKind};
use fleet_maint::db::{create_pool, MaintenanceArchive};
use fleet_maint::http_client::HttpClient;
use fleet_maint::identity::ClerkTokenVerifier;
use fleet_maint::services::MaintenanceService;
use fleet_maint::sheet::{
    MemoryRowStore, RowStore, ServiceAccountKey, ServiceAccountTokens, SheetsRowStore,
};
use fleet_maint::storage::{GcsBackend, MemoryBackend, R2Backend, StorageBackend};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fleet_maint=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env().map_err(anyhow::Error::msg)?;

    tracing::info!("Starting fleet-maint server...");

    let http = HttpClient::new()?;

    let storage = build_storage(&config).await?;
    let rows = build_row_store(&config, &http)?;
    rows.ensure_header().await?;

    let mut maintenance = MaintenanceService::new(storage, rows);
    if let Some(database_url) = &config.database_url {
        tracing::info!("Connecting to archive database...");
        let archive = MaintenanceArchive::new(create_pool(database_url).await?);
        archive.ensure_schema().await?;
        maintenance = maintenance.with_archive(archive);
        tracing::info!("Archive database connection established");
    } else {
        tracing::info!("DATABASE_URL not set, archive disabled");
    }

    let verifier = Arc::new(ClerkTokenVerifier::new(
        http.inner().clone(),
        required(&config.clerk_domain, "CLERK_DOMAIN").map_err(anyhow::Error::msg)?,
        required(&config.clerk_secret_key, "CLERK_SECRET_KEY")
            .map_err(anyhow::Error::msg)?
            .to_string(),
    ));

    let state = AppState {
        maintenance: Arc::new(maintenance),
        vehicles: Arc::new(config.vehicles.clone()),
    };
    let router = create_router(state, verifier, &config.cors_origins, config.max_body_bytes);

    let addr = config.server_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    tracing::info!("Listening on {}", addr);

    axum::serve(listener, router)
        .await
        .context("API server error")?;

    Ok(())
}

async fn build_storage(config: &Config) -> anyhow::Result<Arc<dyn StorageBackend>> {
    let storage: Arc<dyn StorageBackend> = match config.storage_backend {
        StorageKind::Gcs => {
            let bucket = required(&config.gcs_bucket, "GCS_BUCKET").map_err(anyhow::Error::msg)?;
            Arc::new(GcsBackend::new(bucket.to_string()).await?)
        }
        StorageKind::R2 => {
            let get = |value: &Option<String>, key: &str| {
                required(value, key)
                    .map(str::to_string)
                    .map_err(anyhow::Error::msg)
            };
            Arc::new(R2Backend::new(
                get(&config.r2_bucket, "R2_BUCKET")?,
                get(&config.r2_account_id, "R2_ACCOUNT_ID")?,
                get(&config.r2_access_key, "R2_ACCESS_KEY")?,
                get(&config.r2_secret_key, "R2_SECRET_KEY")?,
                config.r2_public_base_url.clone(),
            )?)
        }
        StorageKind::Memory => {
            tracing::warn!("Using in-memory photo storage; uploads are lost on restart");
            Arc::new(MemoryBackend::new("local"))
        }
    };
    tracing::info!("Photo storage enabled: bucket={}", storage.bucket());
    Ok(storage)
}

fn build_row_store(config: &Config, http: &HttpClient) -> anyhow::Result<Arc<dyn RowStore>> {
    match config.row_store {
        RowStoreKind::Sheets => {
            let key_source = required(
                &config.gsheet_service_account_json,
                "GSHEET_SERVICE_ACCOUNT_JSON",
            )
            .map_err(anyhow::Error::msg)?;
            let spreadsheet_id = required(&config.gsheet_spreadsheet_id, "GSHEET_SPREADSHEET_ID")
                .map_err(anyhow::Error::msg)?;
            // Inline JSON or a path to the key file
            let key = if key_source.trim_start().starts_with('{') {
                ServiceAccountKey::from_json(key_source)?
            } else {
                ServiceAccountKey::from_file(key_source)?
            };
            tracing::info!(
                "Sheets row store: spreadsheet={}, range={}",
                spreadsheet_id,
                config.gsheet_range
            );
            Ok(Arc::new(SheetsRowStore::new(
                http.inner().clone(),
                ServiceAccountTokens::new(http.inner().clone(), key),
                spreadsheet_id.to_string(),
                config.gsheet_range.clone(),
            )))
        }
        RowStoreKind::Memory => {
            tracing::warn!("Using in-memory row store; records are lost on restart");
            Ok(Arc::new(MemoryRowStore::default()))
        }
    }
}
