//! API error types.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use recast_gemini::GeminiError;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("Internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Gemini(#[from] GeminiError),
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Gemini(e) => match e {
                // A rejected credential comes back as a 400 from the service
                // with an explanatory body; everything else upstream is a
                // gateway-side failure from the caller's point of view.
                GeminiError::Connection(msg) if is_auth_failure(msg) => StatusCode::UNAUTHORIZED,
                GeminiError::Connection(_)
                | GeminiError::Upload(_)
                | GeminiError::Analysis(_)
                | GeminiError::MalformedResponse(_) => StatusCode::BAD_GATEWAY,
                GeminiError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
                GeminiError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

fn is_auth_failure(msg: &str) -> bool {
    msg.contains("API key") || msg.contains("API_KEY_INVALID") || msg.contains("401")
}

#[derive(Serialize)]
struct ErrorResponse {
    detail: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Don't expose internal error details in production
        let detail = match &self {
            ApiError::Internal(_) | ApiError::Gemini(GeminiError::Io(_)) => {
                if std::env::var("ENVIRONMENT").unwrap_or_default() == "production" {
                    "An internal error occurred".to_string()
                } else {
                    self.to_string()
                }
            }
            _ => self.to_string(),
        };

        let body = ErrorResponse { detail };

        (status, Json(body)).into_response()
    }
}
