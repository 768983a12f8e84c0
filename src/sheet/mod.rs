// Row store abstraction (Google Sheets / in-memory)

pub mod codec;
pub mod google;
pub mod service_account;

pub use google::SheetsRowStore;
pub use service_account::{ServiceAccountKey, ServiceAccountTokens};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::AppResult;

/// Append-only table of text cells. The first row is the header.
#[async_trait]
pub trait RowStore: Send + Sync {
    /// All rows including the header, in append order.
    async fn read_all_rows(&self) -> AppResult<Vec<Vec<String>>>;

    async fn append_row(&self, row: Vec<String>) -> AppResult<()>;

    /// Writes the header row when the store is empty.
    async fn ensure_header(&self) -> AppResult<()> {
        if self.read_all_rows().await?.is_empty() {
            tracing::info!("Row store is empty, writing header row");
            self.append_row(codec::header_row()).await?;
        }
        Ok(())
    }
}

/// Process-local row store for development and tests.
#[derive(Debug, Default)]
pub struct MemoryRowStore {
    rows: RwLock<Vec<Vec<String>>>,
}

impl MemoryRowStore {
    /// Empty store seeded with the header row.
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(vec![codec::header_row()]),
        }
    }

    pub async fn row_count(&self) -> usize {
        self.rows.read().await.len()
    }
}

#[async_trait]
impl RowStore for MemoryRowStore {
    async fn read_all_rows(&self) -> AppResult<Vec<Vec<String>>> {
        Ok(self.rows.read().await.clone())
    }

    async fn append_row(&self, row: Vec<String>) -> AppResult<()> {
        self.rows.write().await.push(row);
        Ok(())
    }
}
