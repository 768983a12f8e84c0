use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{AppError, AppResult};

use super::{RowStore, ServiceAccountTokens};

const SHEETS_API: &str = "https://sheets.googleapis.com/v4/spreadsheets";

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

fn cell_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Row store backed by one Google Sheets range.
pub struct SheetsRowStore {
    client: Client,
    tokens: ServiceAccountTokens,
    spreadsheet_id: String,
    range: String,
}

impl SheetsRowStore {
    pub fn new(
        client: Client,
        tokens: ServiceAccountTokens,
        spreadsheet_id: String,
        range: String,
    ) -> Self {
        Self {
            client,
            tokens,
            spreadsheet_id,
            range,
        }
    }

    fn values_url(&self, suffix: &str) -> String {
        format!(
            "{}/{}/values/{}{}",
            SHEETS_API,
            self.spreadsheet_id,
            urlencoding::encode(&self.range),
            suffix
        )
    }

    async fn check(response: reqwest::Response, action: &str) -> AppResult<reqwest::Response> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        Err(AppError::Store(format!(
            "Sheets {} failed: status={}, body={}",
            action, status, body
        )))
    }
}

#[async_trait]
impl RowStore for SheetsRowStore {
    async fn read_all_rows(&self) -> AppResult<Vec<Vec<String>>> {
        let token = self.tokens.access_token().await?;
        let response = self
            .client
            .get(self.values_url(""))
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| AppError::Store(format!("Sheets read failed: {}", e)))?;
        let response = Self::check(response, "read").await?;

        let range: ValueRange = response
            .json()
            .await
            .map_err(|e| AppError::Store(format!("Failed to parse sheet values: {}", e)))?;

        tracing::debug!(
            "Sheets read: spreadsheet={}, rows={}",
            self.spreadsheet_id,
            range.values.len()
        );
        Ok(range
            .values
            .into_iter()
            .map(|row| row.into_iter().map(cell_text).collect())
            .collect())
    }

    async fn append_row(&self, row: Vec<String>) -> AppResult<()> {
        let token = self.tokens.access_token().await?;
        let response = self
            .client
            .post(self.values_url(":append"))
            .query(&[
                ("valueInputOption", "RAW"),
                ("insertDataOption", "INSERT_ROWS"),
            ])
            .bearer_auth(token)
            .json(&serde_json::json!({ "values": [row] }))
            .send()
            .await
            .map_err(|e| AppError::Store(format!("Sheets append failed: {}", e)))?;
        Self::check(response, "append").await?;

        tracing::info!("Sheets append: spreadsheet={}", self.spreadsheet_id);
        Ok(())
    }
}
