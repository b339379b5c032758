//! Gemini client error types.

use std::time::Duration;

use thiserror::Error;

pub type GeminiResult<T> = Result<T, GeminiError>;

#[derive(Debug, Error)]
pub enum GeminiError {
    /// Model listing failed (bad credential or unreachable service).
    #[error("Connection failed: {0}")]
    Connection(String),

    /// File upload or state polling failed, including a terminal FAILED
    /// state reported by the service.
    #[error("Upload failed: {0}")]
    Upload(String),

    /// The file never left the processing state within the poll deadline.
    #[error("Timed out after {0:?} waiting for the uploaded file to become ready")]
    Timeout(Duration),

    /// The generate-content call failed; carries the service's message
    /// verbatim for diagnostics.
    #[error("Analysis failed: {0}")]
    Analysis(String),

    /// The response text was not the JSON shape the contract promises.
    #[error("Malformed model response: {0}")]
    MalformedResponse(String),

    /// Local staging I/O failure.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl GeminiError {
    /// True for failures of the remote boundary (as opposed to local I/O).
    pub fn is_remote(&self) -> bool {
        !matches!(self, Self::Io(_))
    }
}
