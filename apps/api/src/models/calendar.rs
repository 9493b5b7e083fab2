use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// The only table this service reads or writes.
pub const CALENDAR_TABLE: &str = "calendar_data";

/// A `month`/`year` value. Rows and requests carry these as either text or numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Text(String),
    Number(serde_json::Number),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Text(s) => f.write_str(s),
            Scalar::Number(n) => write!(f, "{n}"),
        }
    }
}

/// A source row of `calendar_data`. Only the columns this service uses are
/// decoded; everything else the store returns is ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct CalendarRow {
    pub id: String,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub month: Option<Scalar>,
    #[serde(default)]
    pub year: Option<Scalar>,
    #[serde(default)]
    pub platform: Option<String>,
    #[serde(default)]
    pub content_items: Option<Value>,
    /// Older rows keep their items nested under this JSON document column.
    #[serde(default)]
    pub calendar_data: Option<Value>,
}

impl CalendarRow {
    /// The row's `content_items` value, falling back to `calendar_data.content_items`.
    pub fn raw_content_items(&self) -> Option<&Value> {
        match &self.content_items {
            Some(Value::Null) | None => self
                .calendar_data
                .as_ref()
                .and_then(|doc| doc.get("content_items"))
                .filter(|v| !v.is_null()),
            Some(items) => Some(items),
        }
    }
}

/// Descriptive fields copied from the source row onto every split row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitMetadata {
    pub parent_calendar_id: String,
    pub user_id: Option<String>,
    pub month: Option<Scalar>,
    pub year: Option<Scalar>,
    pub platform: Option<String>,
}

impl From<&CalendarRow> for SplitMetadata {
    fn from(row: &CalendarRow) -> Self {
        Self {
            parent_calendar_id: row.id.clone(),
            user_id: row.user_id.clone(),
            month: row.month.clone(),
            year: row.year.clone(),
            platform: row.platform.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitPayload {
    pub metadata: SplitMetadata,
    pub content_item: Value,
}

/// One content item written back as its own row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitRow {
    pub id: Uuid,
    #[serde(rename = "calendar_data")]
    pub payload: SplitPayload,
}
