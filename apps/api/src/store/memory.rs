use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use super::{Filter, StoreError, TableStore};

/// In-memory table store for tests. Reads and writes can be made to fail
/// to exercise upstream error paths.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<HashMap<String, Vec<Value>>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    /// When set, `insert` stores every row but echoes back rows that are not split rows.
    echo_malformed: AtomicBool,
    /// When set, `insert` stores every row but only echoes back this many.
    echo_limit: Mutex<Option<usize>>,
}

impl MemoryStore {
    pub fn with_rows(table: &str, rows: Vec<Value>) -> Self {
        let store = Self::default();
        store
            .tables
            .lock()
            .unwrap()
            .insert(table.to_string(), rows);
        store
    }

    pub fn fail_reads(&self) {
        self.fail_reads.store(true, Ordering::SeqCst);
    }

    pub fn fail_writes(&self) {
        self.fail_writes.store(true, Ordering::SeqCst);
    }

    pub fn echo_malformed(&self) {
        self.echo_malformed.store(true, Ordering::SeqCst);
    }

    pub fn echo_at_most(&self, n: usize) {
        *self.echo_limit.lock().unwrap() = Some(n);
    }

    pub fn rows(&self, table: &str) -> Vec<Value> {
        self.tables
            .lock()
            .unwrap()
            .get(table)
            .cloned()
            .unwrap_or_default()
    }
}

/// Scalars compare by their text form, the way the store coerces `eq.` filter values.
fn row_matches(filter: &Filter, row: &Value) -> bool {
    match row.get(&filter.column) {
        Some(Value::String(s)) => *s == filter.value,
        Some(Value::Number(n)) => n.to_string() == filter.value,
        Some(Value::Bool(b)) => b.to_string() == filter.value,
        _ => false,
    }
}

#[async_trait]
impl TableStore for MemoryStore {
    async fn select(
        &self,
        table: &str,
        filters: &[Filter],
        limit: usize,
    ) -> Result<Vec<Value>, StoreError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Api {
                status: 503,
                message: "read unavailable".to_string(),
            });
        }
        Ok(self
            .rows(table)
            .into_iter()
            .filter(|row| filters.iter().all(|f| row_matches(f, row)))
            .take(limit)
            .collect())
    }

    async fn insert(&self, table: &str, rows: Vec<Value>) -> Result<Vec<Value>, StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Api {
                status: 500,
                message: "write rejected".to_string(),
            });
        }
        self.tables
            .lock()
            .unwrap()
            .entry(table.to_string())
            .or_default()
            .extend(rows.iter().cloned());

        if self.echo_malformed.load(Ordering::SeqCst) {
            return Ok(rows
                .iter()
                .map(|_| serde_json::json!({ "id": "not-a-uuid", "calendar_data": null }))
                .collect());
        }

        let echoed = match *self.echo_limit.lock().unwrap() {
            Some(n) => rows.into_iter().take(n).collect(),
            None => rows,
        };
        Ok(echoed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_row_matches_string_and_number_columns() {
        let row = json!({ "user_id": "u1", "month": 3, "year": "2024" });
        assert!(row_matches(&Filter::eq("user_id", "u1"), &row));
        assert!(row_matches(&Filter::eq("month", "3"), &row));
        assert!(row_matches(&Filter::eq("year", "2024"), &row));
        assert!(!row_matches(&Filter::eq("month", "4"), &row));
    }

    #[test]
    fn test_missing_or_null_column_never_matches() {
        let row = json!({ "platform": null });
        assert!(!row_matches(&Filter::eq("platform", "ig"), &row));
        assert!(!row_matches(&Filter::eq("user_id", "u1"), &row));
    }

    #[tokio::test]
    async fn test_select_respects_limit() {
        let store = MemoryStore::with_rows("t", vec![json!({ "k": "v" }); 3]);
        let rows = store.select("t", &[Filter::eq("k", "v")], 2).await.unwrap();
        assert_eq!(rows.len(), 2);
    }
}
