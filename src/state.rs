//! Shared application state injected into every Axum handler.

use std::sync::Arc;

use crate::config::AppConfig;
use crate::database::MessageStore;

#[derive(Clone)]
pub struct AppState {
    /// Environment-derived configuration.
    pub config: Arc<AppConfig>,
    /// Message storage, constructed once at startup.
    pub store: Arc<dyn MessageStore>,
}

impl AppState {
    pub fn new(config: AppConfig, store: Arc<dyn MessageStore>) -> Self {
        Self {
            config: Arc::new(config),
            store,
        }
    }

    /// Whether persistence failures should still be answered with 200
    pub fn legacy_error_status(&self) -> bool {
        self.config.api.legacy_error_status
    }
}
