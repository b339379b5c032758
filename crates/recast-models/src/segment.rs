//! Segment breakdown returned by the generative model.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Upper bound on the number of segments accepted from a single response.
///
/// The model contract imposes no limit of its own; anything past this is
/// discarded at the parse boundary rather than rendered.
pub const MAX_SEGMENTS: usize = 200;

/// One time-bounded unit of the analyzed video.
///
/// Every field is optional: the model is allowed to omit any of them, and a
/// missing field must not prevent the rest of the segment (or the other
/// segments) from rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Default)]
pub struct Segment {
    /// Time range covered by the segment (e.g. "0-2s")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,

    /// Voice-to-text transcript for the segment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transcript: Option<String>,

    /// Hand/head movement description used to anchor shot-to-shot continuity
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub motion_logic: Option<String>,

    /// Video-generation prompt for Kling
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kling_prompt: Option<String>,

    /// Static reference-image prompt for SeaArt
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seaart_prompt: Option<String>,
}

impl Segment {
    /// Time range, empty when the model omitted it.
    pub fn time(&self) -> &str {
        self.time.as_deref().unwrap_or_default()
    }

    /// Transcript, empty when the model omitted it.
    pub fn transcript(&self) -> &str {
        self.transcript.as_deref().unwrap_or_default()
    }

    /// Motion description, empty when the model omitted it.
    pub fn motion_logic(&self) -> &str {
        self.motion_logic.as_deref().unwrap_or_default()
    }

    /// Kling prompt, empty when the model omitted it.
    pub fn kling_prompt(&self) -> &str {
        self.kling_prompt.as_deref().unwrap_or_default()
    }

    /// SeaArt prompt, empty when the model omitted it.
    pub fn seaart_prompt(&self) -> &str {
        self.seaart_prompt.as_deref().unwrap_or_default()
    }
}

/// Top-level shape of the model's JSON response.
///
/// A response without a `segments` key is legitimate (zero segments), so the
/// field defaults to an empty vec instead of failing deserialization.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default)]
pub struct SegmentBreakdown {
    /// Segments in the order the model produced them
    #[serde(default)]
    pub segments: Vec<Segment>,
}
