//! Fetch, split, insert. One read and one write against the table store per call.
//!
//! Not idempotent: splitting the same row twice inserts two independent sets.

use anyhow::Context;
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::errors::{AppError, Stage};
use crate::models::calendar::{CalendarRow, SplitRow, CALENDAR_TABLE};
use crate::split::request::{Lookup, SplitRequest};
use crate::split::splitter::{build_split_rows, content_items};
use crate::store::TableStore;

/// Enough to tell "exactly one" from "more than one" without pulling every match.
const LOOKUP_LIMIT: usize = 2;

#[derive(Debug, Serialize)]
pub struct SplitResponse {
    pub success: bool,
    pub source_row_id: String,
    /// Rows sent to the store.
    pub requested_count: usize,
    /// Rows the store reported back as inserted.
    pub inserted_count: usize,
    pub rows: Vec<SplitRow>,
}

/// Resolves the lookup to exactly one source row.
pub async fn resolve_source(
    store: &dyn TableStore,
    lookup: &Lookup,
) -> Result<CalendarRow, AppError> {
    let mut rows = store
        .select(CALENDAR_TABLE, &lookup.filters(), LOOKUP_LIMIT)
        .await
        .map_err(AppError::upstream(Stage::Read))?;

    match rows.len() {
        0 => Err(AppError::NotFound(format!(
            "No calendar row matches {}",
            lookup.describe()
        ))),
        1 => {
            let row = rows.remove(0);
            serde_json::from_value(row).map_err(|e| AppError::Upstream {
                stage: Stage::Read,
                source: e.into(),
            })
        }
        count => Err(AppError::AmbiguousMatch { count }),
    }
}

pub async fn split_calendar(
    store: &dyn TableStore,
    request: SplitRequest,
) -> Result<SplitResponse, AppError> {
    let lookup = request.into_lookup()?;
    info!("Resolving calendar row by {}", lookup.describe());

    let source = resolve_source(store, &lookup).await?;
    let items = content_items(&source)?;
    info!(
        "Calendar row {} has {} content item(s)",
        source.id,
        items.len()
    );

    let split_rows = build_split_rows(&source, items);
    let requested_count = split_rows.len();
    let batch = split_rows
        .iter()
        .map(serde_json::to_value)
        .collect::<Result<Vec<Value>, _>>()
        .context("Failed to serialize split rows")?;

    info!("Inserting {requested_count} split row(s) into {CALENDAR_TABLE}");
    let inserted = store
        .insert(CALENDAR_TABLE, batch)
        .await
        .map_err(AppError::upstream(Stage::Write))?;

    let rows = inserted
        .into_iter()
        .map(serde_json::from_value::<SplitRow>)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| AppError::Upstream {
            stage: Stage::Write,
            source: e.into(),
        })?;

    let inserted_count = rows.len();
    if inserted_count != requested_count {
        warn!(
            "Store reported {inserted_count} of {requested_count} split row(s) inserted for calendar row {}",
            source.id
        );
    } else {
        info!(
            "Split calendar row {} into {inserted_count} row(s)",
            source.id
        );
    }

    Ok(SplitResponse {
        success: true,
        source_row_id: source.id,
        requested_count,
        inserted_count,
        rows,
    })
}
