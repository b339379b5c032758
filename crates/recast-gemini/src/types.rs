//! Wire types for the Gemini REST API.

use serde::{Deserialize, Serialize};

use recast_models::FileState;

/// An available model as reported by the list-models endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelInfo {
    /// Fully qualified name, e.g. "models/gemini-2.5-flash"
    pub name: String,

    /// Human-readable name
    #[serde(default)]
    pub display_name: Option<String>,

    /// Generation methods the model supports
    #[serde(default)]
    pub supported_generation_methods: Vec<String>,
}

impl ModelInfo {
    /// Whether the model can serve generate-content calls.
    pub fn supports_generation(&self) -> bool {
        self.supported_generation_methods
            .iter()
            .any(|m| m == "generateContent")
    }

    /// Model name with the "models/" prefix stripped.
    pub fn short_name(&self) -> &str {
        self.name.strip_prefix("models/").unwrap_or(&self.name)
    }
}

/// List-models response.
#[derive(Debug, Deserialize)]
pub struct ListModelsResponse {
    #[serde(default)]
    pub models: Vec<ModelInfo>,
}

/// A file uploaded to the service, as returned by upload and state polls.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteFile {
    /// Opaque resource name, e.g. "files/abc-123"
    pub name: String,

    /// URI to reference in generate-content calls
    pub uri: String,

    /// Current processing state
    #[serde(default)]
    pub state: FileState,

    /// MIME type, when reported
    #[serde(default)]
    pub mime_type: Option<String>,
}

/// Upload responses wrap the file in a "file" key.
#[derive(Debug, Deserialize)]
pub struct UploadFileResponse {
    pub file: RemoteFile,
}

/// Generate-content request.
#[derive(Debug, Serialize)]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    pub generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
pub struct Content {
    pub parts: Vec<Part>,
}

/// One part of a content entry: either inline text or a file reference.
#[derive(Debug, Serialize)]
pub struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(rename = "fileData", skip_serializing_if = "Option::is_none")]
    pub file_data: Option<FileData>,
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            file_data: None,
        }
    }

    pub fn file(file: &RemoteFile) -> Self {
        Self {
            text: None,
            file_data: Some(FileData {
                mime_type: file
                    .mime_type
                    .clone()
                    .unwrap_or_else(|| "video/mp4".to_string()),
                file_uri: file.uri.clone(),
            }),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct FileData {
    #[serde(rename = "mimeType")]
    pub mime_type: String,
    #[serde(rename = "fileUri")]
    pub file_uri: String,
}

#[derive(Debug, Serialize)]
pub struct GenerationConfig {
    #[serde(rename = "responseMimeType")]
    pub response_mime_type: String,
}

/// Generate-content response.
#[derive(Debug, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
pub struct Candidate {
    pub content: ResponseContent,
}

#[derive(Debug, Deserialize)]
pub struct ResponseContent {
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
pub struct ResponsePart {
    #[serde(default)]
    pub text: String,
}

impl GenerateContentResponse {
    /// Text of the first candidate's first part, if any.
    pub fn first_text(&self) -> Option<&str> {
        self.candidates
            .first()
            .and_then(|c| c.content.parts.first())
            .map(|p| p.text.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_info_filters_on_generate_content() {
        let raw = r#"{
            "name": "models/gemini-2.5-flash",
            "supportedGenerationMethods": ["generateContent", "countTokens"]
        }"#;
        let info: ModelInfo = serde_json::from_str(raw).unwrap();
        assert!(info.supports_generation());
        assert_eq!(info.short_name(), "gemini-2.5-flash");

        let embed: ModelInfo = serde_json::from_str(
            r#"{"name":"models/embedding-001","supportedGenerationMethods":["embedContent"]}"#,
        )
        .unwrap();
        assert!(!embed.supports_generation());
    }

    #[test]
    fn test_remote_file_active_state() {
        let raw = r#"{"name":"files/abc","uri":"https://example/files/abc","state":"ACTIVE"}"#;
        let file: RemoteFile = serde_json::from_str(raw).unwrap();
        assert_eq!(file.state, FileState::Ready);
    }

    #[test]
    fn test_generate_request_shape() {
        let file = RemoteFile {
            name: "files/abc".to_string(),
            uri: "https://example/files/abc".to_string(),
            state: FileState::Ready,
            mime_type: None,
        };
        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part::file(&file), Part::text("describe")],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json".to_string(),
            },
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json["contents"][0]["parts"][0]["fileData"]["fileUri"],
            "https://example/files/abc"
        );
        assert_eq!(json["contents"][0]["parts"][1]["text"], "describe");
        assert_eq!(
            json["generationConfig"]["responseMimeType"],
            "application/json"
        );
    }
}
