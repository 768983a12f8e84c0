use sqlx::types::Json;
use sqlx::PgPool;

use crate::error::AppResult;
use crate::models::InspectionRecord;

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS maintenance_logs (\
     record_id UUID PRIMARY KEY, \
     vehicle_number TEXT NOT NULL, \
     created_at TIMESTAMPTZ NOT NULL, \
     payload JSONB NOT NULL)";

/// Secondary copy of every stored inspection in Postgres.
#[derive(Clone)]
pub struct MaintenanceArchive {
    pool: PgPool,
}

impl MaintenanceArchive {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn ensure_schema(&self) -> AppResult<()> {
        sqlx::query(CREATE_TABLE).execute(&self.pool).await?;
        Ok(())
    }

    /// Inserts the record; a repeated record id is ignored.
    pub async fn insert(&self, record: &InspectionRecord) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO maintenance_logs (record_id, vehicle_number, created_at, payload) \
             VALUES ($1::uuid, $2, $3::timestamptz, $4) \
             ON CONFLICT (record_id) DO NOTHING",
        )
        .bind(&record.record_id)
        .bind(&record.vehicle_number)
        .bind(&record.timestamp)
        .bind(Json(record))
        .execute(&self.pool)
        .await?;

        tracing::debug!("Archived record {}", record.record_id);
        Ok(())
    }
}
