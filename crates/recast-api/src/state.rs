//! Application state.

use crate::config::ApiConfig;

/// Shared application state.
///
/// The credential never lives here: it arrives with each request and is
/// folded into a per-run client config, so nothing about a run is shared
/// mutable state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
}

impl AppState {
    /// Create new application state.
    pub fn new(config: ApiConfig) -> Self {
        Self { config }
    }
}
