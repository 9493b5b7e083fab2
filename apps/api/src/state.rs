use std::sync::Arc;

use crate::config::Config;
use crate::store::TableStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Built once at startup. Tests swap in `MemoryStore`.
    pub store: Arc<dyn TableStore>,
    pub config: Config,
}
