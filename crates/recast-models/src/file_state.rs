//! Remote file processing states.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Processing state of a file uploaded to the generative service.
///
/// The service reports `ACTIVE` for a file that is ready to be referenced;
/// it deserializes into [`FileState::Ready`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FileState {
    /// Bytes are still being transferred to the service
    #[default]
    Uploading,
    /// The service is ingesting the file
    Processing,
    /// The file can be referenced in a generate-content call
    #[serde(alias = "ACTIVE")]
    Ready,
    /// The service rejected or failed to ingest the file
    Failed,
}

impl FileState {
    /// Returns the state as a string for display.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Uploading => "uploading",
            Self::Processing => "processing",
            Self::Ready => "ready",
            Self::Failed => "failed",
        }
    }

    /// Returns true if the state is terminal (ready or failed).
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Ready | Self::Failed)
    }

    /// Returns true if the remote side is still working on the file.
    pub fn is_in_progress(&self) -> bool {
        matches!(self, Self::Uploading | Self::Processing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states() {
        assert!(!FileState::Uploading.is_terminal());
        assert!(!FileState::Processing.is_terminal());
        assert!(FileState::Ready.is_terminal());
        assert!(FileState::Failed.is_terminal());
    }

    #[test]
    fn test_in_progress_is_complement_of_terminal() {
        for state in [
            FileState::Uploading,
            FileState::Processing,
            FileState::Ready,
            FileState::Failed,
        ] {
            assert_eq!(state.is_in_progress(), !state.is_terminal());
        }
    }

    #[test]
    fn test_wire_names() {
        assert_eq!(
            serde_json::to_string(&FileState::Processing).unwrap(),
            "\"PROCESSING\""
        );
        let ready: FileState = serde_json::from_str("\"READY\"").unwrap();
        assert_eq!(ready, FileState::Ready);
    }

    #[test]
    fn test_active_alias_deserializes_as_ready() {
        let state: FileState = serde_json::from_str("\"ACTIVE\"").unwrap();
        assert_eq!(state, FileState::Ready);
    }
}
