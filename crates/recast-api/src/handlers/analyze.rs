//! Video analysis handler: stage, upload, poll, generate, render.

use std::path::Path;
use std::time::Instant;

use axum::extract::{Multipart, State};
use axum::Json;
use chrono::Utc;
use tracing::{info, warn};

use recast_gemini::{build_prompt, parse_segments, GeminiClient, StagedFile, DEFAULT_PERSONA};
use recast_models::{render, AnalyzeResponse, Segment};

use crate::error::{ApiError, ApiResult};
use crate::handlers::models::gemini_config;
use crate::metrics;
use crate::state::AppState;

/// Fields collected from the multipart request, before validation.
#[derive(Default)]
struct AnalyzeRequest {
    api_key: Option<String>,
    model: Option<String>,
    persona: Option<String>,
    video: Option<Vec<u8>>,
    video_name: Option<String>,
}

/// A request with every required part present.
#[derive(Debug)]
struct ValidatedRequest {
    api_key: String,
    model: String,
    persona: String,
    video: Vec<u8>,
    video_name: Option<String>,
}

impl AnalyzeRequest {
    /// Check the required parts; each missing or empty part is a 400 with a
    /// part-specific detail. A blank persona falls back to the default.
    fn validate(self) -> ApiResult<ValidatedRequest> {
        let api_key = self
            .api_key
            .ok_or_else(|| ApiError::bad_request("missing api_key part"))?;
        let model = self
            .model
            .ok_or_else(|| ApiError::bad_request("missing model part"))?;
        let video = self
            .video
            .ok_or_else(|| ApiError::bad_request("missing video part"))?;
        if video.is_empty() {
            return Err(ApiError::bad_request("video part is empty"));
        }
        let persona = self
            .persona
            .filter(|p| !p.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_PERSONA.to_string());

        Ok(ValidatedRequest {
            api_key,
            model,
            persona,
            video,
            video_name: self.video_name,
        })
    }
}

/// Run a full analysis: the uploaded video goes to the generative service,
/// the JSON breakdown comes back as render-ready display blocks.
///
/// The staged local copy is removed exactly once per run, whether the remote
/// calls succeed or not.
pub async fn analyze(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<Json<AnalyzeResponse>> {
    let request = read_multipart(multipart).await?.validate()?;

    let client = GeminiClient::new(gemini_config(&state, &request.api_key))?;
    let prompt = build_prompt(&request.persona);
    let model = request.model;

    let started = Instant::now();
    let staged = StagedFile::stage(&request.video, request.video_name.as_deref()).await?;

    let result = run_pipeline(&client, staged.path(), &prompt, &model).await;

    // Cleanup is owed on every path; a failed delete must not mask the
    // pipeline outcome.
    if let Err(e) = staged.release().await {
        warn!("Failed to release staged file: {}", e);
    }

    let duration = started.elapsed();
    metrics::record_analyze_run(&model, result.is_ok(), duration.as_secs_f64());

    let segments = result?;
    let blocks = render(&segments);

    info!(
        "Analysis with {} produced {} segments in {:?}",
        model,
        blocks.len(),
        duration
    );

    Ok(Json(AnalyzeResponse {
        model,
        analyzed_at: Utc::now(),
        segment_count: blocks.len(),
        blocks,
    }))
}

/// Upload the staged file, wait until the service has ingested it, request
/// the breakdown, and parse it.
async fn run_pipeline(
    client: &GeminiClient,
    staged_path: &Path,
    prompt: &str,
    model: &str,
) -> ApiResult<Vec<Segment>> {
    let file = client.upload_and_wait(staged_path).await?;
    let raw = client.generate_content(&file, prompt, model).await?;
    Ok(parse_segments(&raw)?)
}

/// Collect the known multipart fields; unknown fields are ignored.
async fn read_multipart(mut multipart: Multipart) -> ApiResult<AnalyzeRequest> {
    let mut request = AnalyzeRequest::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("invalid multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "api_key" => request.api_key = Some(read_text(field, "api_key").await?),
            "model" => request.model = Some(read_text(field, "model").await?),
            "persona" => request.persona = Some(read_text(field, "persona").await?),
            "video" => {
                request.video_name = field.file_name().map(|s| s.to_string());
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("failed to read video: {e}")))?;
                request.video = Some(bytes.to_vec());
            }
            other => {
                warn!("Ignoring unknown multipart field: {}", other);
            }
        }
    }

    Ok(request)
}

async fn read_text(field: axum::extract::multipart::Field<'_>, name: &str) -> ApiResult<String> {
    field
        .text()
        .await
        .map_err(|e| ApiError::bad_request(format!("failed to read {name}: {e}")))
}
