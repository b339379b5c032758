//! Gemini REST client: model listing, file upload with polling, generation.

use std::path::Path;
use std::time::{Duration, Instant};

use reqwest::Client;
use tokio::fs;
use tracing::{debug, info};

use crate::error::{GeminiError, GeminiResult};
use crate::stage::video_mime_type;
use crate::types::{
    Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig,
    ListModelsResponse, ModelInfo, Part, RemoteFile, UploadFileResponse,
};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Per-run client configuration.
///
/// Built fresh for every action from the credential the caller supplied;
/// nothing here is shared mutable state.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// API credential
    pub api_key: String,
    /// Service base URL (overridable for tests)
    pub base_url: String,
    /// Per-request timeout
    pub request_timeout: Duration,
    /// First poll delay after upload
    pub poll_initial_interval: Duration,
    /// Backoff cap between polls
    pub poll_max_interval: Duration,
    /// Overall deadline for the upload to become ready
    pub poll_timeout: Duration,
}

impl GeminiConfig {
    /// Create a config with default intervals for the given credential.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(300), // generation on video is slow
            poll_initial_interval: Duration::from_secs(1),
            poll_max_interval: Duration::from_secs(8),
            poll_timeout: Duration::from_secs(300),
        }
    }

    /// Override the service base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Override the overall poll deadline.
    pub fn with_poll_timeout(mut self, timeout: Duration) -> Self {
        self.poll_timeout = timeout;
        self
    }
}

/// Client for the generative-content service.
pub struct GeminiClient {
    http: Client,
    config: GeminiConfig,
}

impl GeminiClient {
    /// Create a new client.
    pub fn new(config: GeminiConfig) -> GeminiResult<Self> {
        let http = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| GeminiError::Connection(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self { http, config })
    }

    /// List models that support generate-content calls.
    pub async fn list_models(&self) -> GeminiResult<Vec<ModelInfo>> {
        let url = format!("{}/v1beta/models", self.config.base_url);

        let response = self
            .http
            .get(&url)
            .query(&[("key", self.config.api_key.as_str()), ("pageSize", "200")])
            .send()
            .await
            .map_err(|e| GeminiError::Connection(format!("Model listing failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(GeminiError::Connection(format!(
                "Model listing returned {status}: {body}"
            )));
        }

        let listing: ListModelsResponse = response
            .json()
            .await
            .map_err(|e| GeminiError::Connection(format!("Bad model listing payload: {e}")))?;

        Ok(listing
            .models
            .into_iter()
            .filter(ModelInfo::supports_generation)
            .collect())
    }

    /// Upload the file at `path` and return the initial remote handle.
    ///
    /// Uses the resumable upload protocol: a start request yields a session
    /// URL, the bytes go to that URL in one finalizing request.
    pub async fn upload_file(&self, path: &Path) -> GeminiResult<RemoteFile> {
        let bytes = fs::read(path).await?;
        let display_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "video.mp4".to_string());
        let mime_type = video_mime_type(path);

        let start_url = format!("{}/upload/v1beta/files", self.config.base_url);

        let start = self
            .http
            .post(&start_url)
            .query(&[("key", self.config.api_key.as_str())])
            .header("X-Goog-Upload-Protocol", "resumable")
            .header("X-Goog-Upload-Command", "start")
            .header("X-Goog-Upload-Header-Content-Length", bytes.len())
            .header("X-Goog-Upload-Header-Content-Type", mime_type)
            .json(&serde_json::json!({ "file": { "display_name": display_name } }))
            .send()
            .await
            .map_err(|e| GeminiError::Upload(format!("Upload start failed: {e}")))?;

        if !start.status().is_success() {
            let status = start.status();
            let body = start.text().await.unwrap_or_default();
            return Err(GeminiError::Upload(format!(
                "Upload start returned {status}: {body}"
            )));
        }

        let session_url = start
            .headers()
            .get("x-goog-upload-url")
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned)
            .ok_or_else(|| {
                GeminiError::Upload("Upload start response missing session URL".to_string())
            })?;

        debug!("Uploading {} bytes ({})", bytes.len(), display_name);

        let finalize = self
            .http
            .post(&session_url)
            .header("X-Goog-Upload-Command", "upload, finalize")
            .header("X-Goog-Upload-Offset", "0")
            .body(bytes)
            .send()
            .await
            .map_err(|e| GeminiError::Upload(format!("Upload finalize failed: {e}")))?;

        if !finalize.status().is_success() {
            let status = finalize.status();
            let body = finalize.text().await.unwrap_or_default();
            return Err(GeminiError::Upload(format!(
                "Upload finalize returned {status}: {body}"
            )));
        }

        let uploaded: UploadFileResponse = finalize
            .json()
            .await
            .map_err(|e| GeminiError::Upload(format!("Bad upload payload: {e}")))?;

        info!(
            "Uploaded {} as {} (state: {})",
            display_name,
            uploaded.file.name,
            uploaded.file.state.as_str()
        );

        Ok(uploaded.file)
    }

    /// Fetch the current state of an uploaded file.
    pub async fn get_file(&self, name: &str) -> GeminiResult<RemoteFile> {
        let url = format!("{}/v1beta/{}", self.config.base_url, name);

        let response = self
            .http
            .get(&url)
            .query(&[("key", self.config.api_key.as_str())])
            .send()
            .await
            .map_err(|e| GeminiError::Upload(format!("File poll failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(GeminiError::Upload(format!(
                "File poll returned {status}: {body}"
            )));
        }

        response
            .json()
            .await
            .map_err(|e| GeminiError::Upload(format!("Bad file poll payload: {e}")))
    }

    /// Poll until the file leaves its in-progress state, with exponential
    /// backoff and an overall deadline.
    pub async fn wait_until_ready(&self, mut file: RemoteFile) -> GeminiResult<RemoteFile> {
        let deadline = Instant::now() + self.config.poll_timeout;
        let mut interval = self.config.poll_initial_interval;

        while file.state.is_in_progress() {
            if Instant::now() + interval > deadline {
                return Err(GeminiError::Timeout(self.config.poll_timeout));
            }

            debug!(
                "File {} is {}, polling again in {:?}",
                file.name,
                file.state.as_str(),
                interval
            );
            tokio::time::sleep(interval).await;
            interval = (interval * 2).min(self.config.poll_max_interval);

            file = self.get_file(&file.name).await?;
        }

        match file.state {
            recast_models::FileState::Ready => Ok(file),
            state => Err(GeminiError::Upload(format!(
                "Remote processing of {} ended in state {}",
                file.name,
                state.as_str()
            ))),
        }
    }

    /// Upload the file at `path` and block until the service has ingested it.
    pub async fn upload_and_wait(&self, path: &Path) -> GeminiResult<RemoteFile> {
        let file = self.upload_file(path).await?;
        self.wait_until_ready(file).await
    }

    /// Issue one generate-content call combining the video reference and the
    /// prompt, in JSON response mode, and return the raw response text.
    ///
    /// No fallback across models and no retry: a failure ends the run and
    /// carries the service's message verbatim.
    pub async fn generate_content(
        &self,
        file: &RemoteFile,
        prompt: &str,
        model: &str,
    ) -> GeminiResult<String> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url, model
        );

        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part::file(file), Part::text(prompt)],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json".to_string(),
            },
        };

        info!("Requesting segment breakdown from {}", model);

        let response = self
            .http
            .post(&url)
            .query(&[("key", self.config.api_key.as_str())])
            .json(&request)
            .send()
            .await
            .map_err(|e| GeminiError::Analysis(format!("Generate-content request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(GeminiError::Analysis(format!(
                "Generate-content returned {status}: {body}"
            )));
        }

        let generated: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| GeminiError::Analysis(format!("Bad generate-content payload: {e}")))?;

        generated
            .first_text()
            .map(str::to_owned)
            .ok_or_else(|| GeminiError::Analysis("No content in model response".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(server: &MockServer) -> GeminiConfig {
        let mut config = GeminiConfig::new("test-key").with_base_url(server.uri());
        config.poll_initial_interval = Duration::from_millis(10);
        config.poll_max_interval = Duration::from_millis(20);
        config.poll_timeout = Duration::from_secs(2);
        config
    }

    #[test]
    fn test_config_defaults() {
        let config = GeminiConfig::new("k");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.poll_initial_interval, Duration::from_secs(1));
        assert_eq!(config.poll_timeout, Duration::from_secs(300));
    }

    #[tokio::test]
    async fn test_list_models_filters_generation_support() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1beta/models"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "models": [
                    {
                        "name": "models/gemini-2.5-flash",
                        "supportedGenerationMethods": ["generateContent"]
                    },
                    {
                        "name": "models/embedding-001",
                        "supportedGenerationMethods": ["embedContent"]
                    }
                ]
            })))
            .mount(&server)
            .await;

        let client = GeminiClient::new(test_config(&server)).unwrap();
        let models = client.list_models().await.unwrap();

        assert_eq!(models.len(), 1);
        assert_eq!(models[0].short_name(), "gemini-2.5-flash");
    }

    #[tokio::test]
    async fn test_list_models_bad_key_is_connection_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1beta/models"))
            .respond_with(ResponseTemplate::new(400).set_body_string("API key not valid"))
            .mount(&server)
            .await;

        let client = GeminiClient::new(test_config(&server)).unwrap();
        let err = client.list_models().await.unwrap_err();

        assert!(matches!(err, GeminiError::Connection(_)));
        assert!(err.to_string().contains("API key not valid"));
    }

    #[tokio::test]
    async fn test_upload_and_wait_polls_until_active() {
        let server = MockServer::start().await;

        let session_url = format!("{}/upload-session", server.uri());
        Mock::given(method("POST"))
            .and(path("/upload/v1beta/files"))
            .respond_with(
                ResponseTemplate::new(200).insert_header("x-goog-upload-url", session_url.as_str()),
            )
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/upload-session"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "file": {
                    "name": "files/abc",
                    "uri": "https://example/files/abc",
                    "state": "PROCESSING"
                }
            })))
            .mount(&server)
            .await;

        // First poll still processing, second poll active.
        Mock::given(method("GET"))
            .and(path("/v1beta/files/abc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "files/abc",
                "uri": "https://example/files/abc",
                "state": "PROCESSING"
            })))
            .up_to_n_times(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/v1beta/files/abc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "files/abc",
                "uri": "https://example/files/abc",
                "state": "ACTIVE"
            })))
            .mount(&server)
            .await;

        let dir = tempfile::TempDir::new().unwrap();
        let video = dir.path().join("clip.mp4");
        std::fs::write(&video, b"fake video").unwrap();

        let client = GeminiClient::new(test_config(&server)).unwrap();
        let file = client.upload_and_wait(&video).await.unwrap();

        assert_eq!(file.name, "files/abc");
        assert_eq!(file.state, recast_models::FileState::Ready);
    }

    #[tokio::test]
    async fn test_upload_reports_content_type_from_extension() {
        let server = MockServer::start().await;

        let session_url = format!("{}/upload-session", server.uri());
        // The start mock only matches when the quicktime content type is
        // declared, so an .mp4 fallback would fail the upload start.
        Mock::given(method("POST"))
            .and(path("/upload/v1beta/files"))
            .and(header("X-Goog-Upload-Header-Content-Type", "video/quicktime"))
            .respond_with(
                ResponseTemplate::new(200).insert_header("x-goog-upload-url", session_url.as_str()),
            )
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/upload-session"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "file": {
                    "name": "files/mov",
                    "uri": "https://example/files/mov",
                    "state": "ACTIVE",
                    "mimeType": "video/quicktime"
                }
            })))
            .mount(&server)
            .await;

        let dir = tempfile::TempDir::new().unwrap();
        let video = dir.path().join("clip.mov");
        std::fs::write(&video, b"fake quicktime").unwrap();

        let client = GeminiClient::new(test_config(&server)).unwrap();
        let file = client.upload_file(&video).await.unwrap();

        assert_eq!(file.name, "files/mov");
        assert_eq!(file.mime_type.as_deref(), Some("video/quicktime"));
    }

    #[tokio::test]
    async fn test_wait_until_ready_surfaces_remote_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1beta/files/bad"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "files/bad",
                "uri": "https://example/files/bad",
                "state": "FAILED"
            })))
            .mount(&server)
            .await;

        let client = GeminiClient::new(test_config(&server)).unwrap();
        let processing = RemoteFile {
            name: "files/bad".to_string(),
            uri: "https://example/files/bad".to_string(),
            state: recast_models::FileState::Processing,
            mime_type: None,
        };

        let err = client.wait_until_ready(processing).await.unwrap_err();
        assert!(matches!(err, GeminiError::Upload(_)));
        assert!(err.to_string().contains("failed"));
    }

    #[tokio::test]
    async fn test_wait_until_ready_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1beta/files/slow"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "files/slow",
                "uri": "https://example/files/slow",
                "state": "PROCESSING"
            })))
            .mount(&server)
            .await;

        let mut config = test_config(&server);
        config.poll_timeout = Duration::from_millis(50);

        let client = GeminiClient::new(config).unwrap();
        let processing = RemoteFile {
            name: "files/slow".to_string(),
            uri: "https://example/files/slow".to_string(),
            state: recast_models::FileState::Processing,
            mime_type: None,
        };

        let err = client.wait_until_ready(processing).await.unwrap_err();
        assert!(matches!(err, GeminiError::Timeout(_)));
    }

    #[tokio::test]
    async fn test_generate_content_returns_raw_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-2.5-flash:generateContent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{
                    "content": { "parts": [{ "text": "{\"segments\":[]}" }] }
                }]
            })))
            .mount(&server)
            .await;

        let client = GeminiClient::new(test_config(&server)).unwrap();
        let file = RemoteFile {
            name: "files/abc".to_string(),
            uri: "https://example/files/abc".to_string(),
            state: recast_models::FileState::Ready,
            mime_type: Some("video/mp4".to_string()),
        };

        let raw = client
            .generate_content(&file, "prompt", "gemini-2.5-flash")
            .await
            .unwrap();
        assert_eq!(raw, "{\"segments\":[]}");
    }

    #[tokio::test]
    async fn test_generate_content_surfaces_service_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-2.5-flash:generateContent"))
            .respond_with(ResponseTemplate::new(429).set_body_string("quota exceeded"))
            .mount(&server)
            .await;

        let client = GeminiClient::new(test_config(&server)).unwrap();
        let file = RemoteFile {
            name: "files/abc".to_string(),
            uri: "https://example/files/abc".to_string(),
            state: recast_models::FileState::Ready,
            mime_type: None,
        };

        let err = client
            .generate_content(&file, "prompt", "gemini-2.5-flash")
            .await
            .unwrap_err();
        assert!(matches!(err, GeminiError::Analysis(_)));
        assert!(err.to_string().contains("quota exceeded"));
    }
}
