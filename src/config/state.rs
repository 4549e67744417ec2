// Application state module
// Shared, read-mostly state handed to every connection task

use std::sync::atomic::AtomicBool;

use super::types::Config;
use crate::store::Store;

/// Application state
///
/// Holds no store connection: each request opens its own through `store`.
pub struct AppState {
    pub config: Config,
    pub store: Store,

    // Cached config value for fast access without touching `config`
    pub cached_access_log: AtomicBool,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        Self {
            config: config.clone(),
            store: Store::new(config.database_path()),
            cached_access_log: AtomicBool::new(config.logging.access_log),
        }
    }
}
