//! Shared data models for the Recast backend.
//!
//! This crate provides Serde-serializable types for:
//! - Segment breakdowns returned by the generative model
//! - Remote file processing states
//! - Display blocks rendered for the review UI

pub mod display;
pub mod file_state;
pub mod segment;

// Re-export common types
pub use display::{render, AnalyzeResponse, DisplayBlock, KLING_CONTINUITY_SUFFIX};
pub use file_state::FileState;
pub use segment::{Segment, SegmentBreakdown, MAX_SEGMENTS};
