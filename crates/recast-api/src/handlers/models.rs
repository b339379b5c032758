//! Credential check and model listing.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;

use recast_gemini::{GeminiClient, GeminiConfig};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Request to verify a credential and list usable models.
#[derive(Debug, Deserialize)]
pub struct ConnectRequest {
    /// API credential to verify
    pub api_key: String,
}

/// Models available for analysis, short names, listing order.
#[derive(Debug, Serialize)]
pub struct ConnectResponse {
    pub models: Vec<String>,
}

/// Verify the credential by listing the service's models, filtered to those
/// that can serve generate-content calls.
pub async fn connect(
    State(state): State<AppState>,
    Json(request): Json<ConnectRequest>,
) -> ApiResult<Json<ConnectResponse>> {
    if request.api_key.trim().is_empty() {
        return Err(ApiError::bad_request("api_key must not be empty"));
    }

    let client = GeminiClient::new(gemini_config(&state, &request.api_key))?;
    let models = client.list_models().await?;

    info!("Credential accepted, {} generation models visible", models.len());

    Ok(Json(ConnectResponse {
        models: models.iter().map(|m| m.short_name().to_string()).collect(),
    }))
}

/// Per-request client config carrying the caller's credential.
pub(crate) fn gemini_config(state: &AppState, api_key: &str) -> GeminiConfig {
    let mut config = GeminiConfig::new(api_key).with_poll_timeout(state.config.poll_timeout);
    if let Some(ref base_url) = state.config.gemini_base_url {
        config = config.with_base_url(base_url);
    }
    config
}
