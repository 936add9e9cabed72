// Application state module
// Holds the configuration and route table injected into every request

use super::types::{Config, StorageConfig};
use crate::handler::RouteTable;

/// Application state, built once at startup and shared behind an `Arc`
pub struct AppState {
    pub config: Config,
    pub routes: RouteTable,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        Self {
            config: config.clone(),
            routes: RouteTable::from_storage(&config.storage),
        }
    }

    pub const fn storage(&self) -> &StorageConfig {
        &self.config.storage
    }

    pub const fn access_log(&self) -> bool {
        self.config.logging.access_log
    }
}
