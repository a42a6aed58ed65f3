//! Local web dashboard for FlipperHTTP devices.
//!
//! Serves an embedded dashboard page plus a JSON API that forwards to the
//! device through the same [`FlipperClient`] the CLI uses. Every API route
//! is a pass-through call; the only local state is the configuration.

use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tokio::sync::RwLock;

use flipperctl_core::{FlipperClient, FlipperConfig, Result};

pub mod routes;

/// Shared state for dashboard handlers.
///
/// Cloning is cheap; the client and config are behind Arcs. The config
/// sits behind an RwLock because `POST /api/config` mutates it.
#[derive(Clone)]
pub struct AppState {
    client: Arc<FlipperClient>,
    config: Arc<RwLock<FlipperConfig>>,
    config_path: Option<PathBuf>,
}

impl AppState {
    /// Build state from a loaded configuration.
    ///
    /// `config_path` is where configuration updates are persisted; when
    /// `None`, updates apply in memory only.
    pub fn new(config: FlipperConfig, config_path: Option<PathBuf>) -> Result<Self> {
        let client = FlipperClient::new(&config)?;
        Ok(Self {
            client: Arc::new(client),
            config: Arc::new(RwLock::new(config)),
            config_path,
        })
    }

    /// The device client.
    pub fn client(&self) -> &FlipperClient {
        &self.client
    }

    /// The shared configuration.
    pub fn config(&self) -> &RwLock<FlipperConfig> {
        &self.config
    }

    /// Where configuration updates are persisted.
    pub fn config_path(&self) -> Option<&PathBuf> {
        self.config_path.as_ref()
    }
}

/// Build the dashboard router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(routes::index))
        .route("/api/health", get(routes::health))
        .route("/api/proxy/status", get(routes::proxy_status))
        .route("/api/proxy/start", post(routes::proxy_start))
        .route("/api/proxy/stop", post(routes::proxy_stop))
        .route("/api/proxy/rules", post(routes::proxy_rules))
        .route("/api/requests", get(routes::list_requests))
        .route("/api/requests/forward", post(routes::forward_request))
        .route("/api/system/info", get(routes::system_info))
        .route("/api/system/stats", get(routes::system_stats))
        .route(
            "/api/config",
            get(routes::get_config).post(routes::set_config),
        )
        .fallback(routes::not_found)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_state_construction() {
        let state = AppState::new(FlipperConfig::default(), None).unwrap();
        assert_eq!(state.client().base_url(), "http://localhost:8080");
        assert!(state.config_path().is_none());
    }

    #[test]
    fn test_app_state_clone_shares_config() {
        let state = AppState::new(FlipperConfig::default(), None).unwrap();
        let cloned = state.clone();
        assert!(Arc::ptr_eq(&state.config, &cloned.config));
    }

    #[test]
    fn test_create_router() {
        let state = AppState::new(FlipperConfig::default(), None).unwrap();
        // Router construction must not panic on route registration
        let _router = create_router(state);
    }
}
