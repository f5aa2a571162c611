use std::sync::Arc;

use crate::auth::{AuthError, TokenService};
use crate::config::AppConfig;
use crate::database::Datastore;

/// Shared application state passed to all route handlers
#[derive(Debug, Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub tokens: Arc<TokenService>,
    pub store: Datastore,
}

impl AppState {
    pub fn new(config: AppConfig, store: Datastore) -> Result<Self, AuthError> {
        let tokens = TokenService::from_config(&config.security)?;
        Ok(Self {
            config: Arc::new(config),
            tokens: Arc::new(tokens),
            store,
        })
    }

    /// In-memory store with the given configuration
    pub fn in_memory(config: AppConfig) -> Result<Self, AuthError> {
        Self::new(config, Datastore::memory())
    }
}
