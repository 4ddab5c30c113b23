// Application state module
// Holds the loaded configuration and the storage handle shared by all requests

use std::sync::Arc;
use tokio::sync::Notify;

use super::types::Config;
use crate::storage::FileStore;

/// Application state
pub struct AppState {
    pub config: Config,
    /// Storage rooted at `config.storage.root_dir`
    pub store: Arc<FileStore>,
    /// Fired once when the process should stop accepting connections
    pub shutdown: Arc<Notify>,
    /// Copied from `config.logging.access_log`; fixed for the process lifetime
    access_log: bool,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let store = Arc::new(FileStore::new(config.storage.root_dir.clone()));
        let access_log = config.logging.access_log;

        Self {
            config,
            store,
            shutdown: Arc::new(Notify::new()),
            access_log,
        }
    }

    /// Whether per-request access logging is on
    pub const fn access_log_enabled(&self) -> bool {
        self.access_log
    }
}
