//! Gemini generative-content client.
//!
//! This crate wraps the three remote calls the Recast pipeline depends on:
//! - list available models
//! - upload a video file and poll it until the service has ingested it
//! - generate content from a file reference and a prompt, in JSON mode
//!
//! plus the local pieces that feed them: staging uploaded bytes to a
//! transient file, building the deterministic analysis prompt, and parsing
//! the model's JSON response into segments.

pub mod client;
pub mod error;
pub mod parse;
pub mod prompt;
pub mod stage;
pub mod types;

pub use client::{GeminiClient, GeminiConfig};
pub use error::{GeminiError, GeminiResult};
pub use parse::parse_segments;
pub use prompt::{build_prompt, DEFAULT_PERSONA};
pub use stage::StagedFile;
pub use types::{ModelInfo, RemoteFile};
