//! Table store access. The only place that talks to the hosted database.
//!
//! `AppState` holds an `Arc<dyn TableStore>`: `PostgrestStore` in production,
//! `MemoryStore` in tests.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

#[cfg(test)]
pub mod memory;
pub mod postgrest;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Store API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// A column equality filter. Multiple filters are combined with AND.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    pub column: String,
    pub value: String,
}

impl Filter {
    pub fn eq(column: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            value: value.into(),
        }
    }
}

/// Minimal capability set consumed from the external store.
#[async_trait]
pub trait TableStore: Send + Sync {
    /// Returns at most `limit` rows of `table` matching every filter.
    async fn select(
        &self,
        table: &str,
        filters: &[Filter],
        limit: usize,
    ) -> Result<Vec<Value>, StoreError>;

    /// Inserts `rows` in one call and returns the store's view of what was written.
    async fn insert(&self, table: &str, rows: Vec<Value>) -> Result<Vec<Value>, StoreError>;
}
