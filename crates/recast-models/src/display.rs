//! Display blocks for human review of a segment breakdown.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::segment::Segment;

/// Continuity/quality terms appended to every Kling prompt.
pub const KLING_CONTINUITY_SUFFIX: &str =
    ". Seamless motion, maintain posture from previous shot, 8k cinematic.";

/// One segment rendered for review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct DisplayBlock {
    /// Heading combining the 1-based segment index and its time range
    pub heading: String,

    /// Transcript text, empty when the model omitted it
    pub transcript: String,

    /// Motion trajectory description, empty when the model omitted it
    pub motion_logic: String,

    /// Kling prompt with the continuity suffix appended
    pub kling_prompt: String,

    /// SeaArt prompt, passed through unmodified
    pub seaart_prompt: String,
}

/// API response for a completed analysis run.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AnalyzeResponse {
    /// Model that produced the breakdown
    pub model: String,

    /// When the analysis completed
    pub analyzed_at: DateTime<Utc>,

    /// Number of rendered blocks
    pub segment_count: usize,

    /// Blocks in segment order
    pub blocks: Vec<DisplayBlock>,
}

/// Render segments into display blocks, in order.
///
/// Pure transform: headings are `"{index} | {time}"` with a 1-based index,
/// and the Kling prompt gets [`KLING_CONTINUITY_SUFFIX`] appended so the
/// downstream generator keeps posture continuity across shots.
pub fn render(segments: &[Segment]) -> Vec<DisplayBlock> {
    segments
        .iter()
        .enumerate()
        .map(|(i, seg)| DisplayBlock {
            heading: format!("{} | {}", i + 1, seg.time()),
            transcript: seg.transcript().to_string(),
            motion_logic: seg.motion_logic().to_string(),
            kling_prompt: format!("{}{}", seg.kling_prompt(), KLING_CONTINUITY_SUFFIX),
            seaart_prompt: seg.seaart_prompt().to_string(),
        })
        .collect()
}
