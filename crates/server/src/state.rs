//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::ServerConfig;
use crate::session::{SessionIssuer, TokenSigner};
use crate::store::AnyStore;

/// Application state shared across all handlers.
///
/// Built once at startup and never mutated afterwards. Cloning is cheap via
/// `Arc`; every request sees the same store handle.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ServerConfig,
    store: AnyStore,
    sessions: SessionIssuer,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Service configuration
    /// * `store` - Connected document store
    #[must_use]
    pub fn new(config: ServerConfig, store: impl Into<AnyStore>) -> Self {
        let sessions = SessionIssuer::new(
            TokenSigner::new(config.token_secret.clone()),
            config.environment,
        );

        Self {
            inner: Arc::new(AppStateInner {
                config,
                store: store.into(),
                sessions,
            }),
        }
    }

    /// Get a reference to the service configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    /// Get a reference to the document store.
    #[must_use]
    pub fn store(&self) -> &AnyStore {
        &self.inner.store
    }

    /// Get a reference to the session issuer.
    #[must_use]
    pub fn sessions(&self) -> &SessionIssuer {
        &self.inner.sessions
    }
}
