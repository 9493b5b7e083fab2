//! Pure transformation from a source row to its split rows. No I/O.

use serde_json::Value;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::calendar::{CalendarRow, SplitMetadata, SplitPayload, SplitRow};

/// Extracts the row's content items. Missing, non-array or empty values are
/// rejected: there is nothing to split.
pub fn content_items(row: &CalendarRow) -> Result<&[Value], AppError> {
    let items = match row.raw_content_items() {
        None => {
            return Err(AppError::Validation(format!(
                "Calendar row {} has no content_items",
                row.id
            )))
        }
        Some(Value::Array(items)) => items,
        Some(_) => {
            return Err(AppError::Validation(format!(
                "Calendar row {} has content_items that is not an array",
                row.id
            )))
        }
    };

    if items.is_empty() {
        return Err(AppError::Validation(format!(
            "Calendar row {} has an empty content_items array, nothing to split",
            row.id
        )));
    }

    Ok(items)
}

/// Builds one split row per item, in order, each under a fresh identifier.
pub fn build_split_rows(row: &CalendarRow, items: &[Value]) -> Vec<SplitRow> {
    let metadata = SplitMetadata::from(row);
    items
        .iter()
        .map(|item| SplitRow {
            id: Uuid::new_v4(),
            payload: SplitPayload {
                metadata: metadata.clone(),
                content_item: item.clone(),
            },
        })
        .collect()
}
