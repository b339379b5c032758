//! Parsing of the model's JSON segment breakdown.

use tracing::warn;

use recast_models::{Segment, SegmentBreakdown, MAX_SEGMENTS};

use crate::error::{GeminiError, GeminiResult};

/// Parse raw response text into segments, in document order.
///
/// Tolerates markdown code fences around the JSON (the model occasionally
/// wraps its output in ```json even when the JSON response mode was
/// requested) and a missing `segments` key, which yields an empty vec.
/// Anything that is not valid JSON fails with
/// [`GeminiError::MalformedResponse`].
pub fn parse_segments(raw: &str) -> GeminiResult<Vec<Segment>> {
    let text = strip_code_fences(raw);

    let breakdown: SegmentBreakdown = serde_json::from_str(text)
        .map_err(|e| GeminiError::MalformedResponse(e.to_string()))?;

    let mut segments = breakdown.segments;
    if segments.len() > MAX_SEGMENTS {
        warn!(
            "Model returned {} segments, truncating to {}",
            segments.len(),
            MAX_SEGMENTS
        );
        segments.truncate(MAX_SEGMENTS);
    }

    Ok(segments)
}

/// Strip a leading ```json / ``` fence and a trailing ``` fence.
fn strip_code_fences(raw: &str) -> &str {
    let text = raw.trim();
    let text = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"))
        .unwrap_or(text);
    let text = text.strip_suffix("```").unwrap_or(text);
    text.trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_preserves_fields_and_order() {
        let raw = r#"{"segments":[
            {"time":"0-2s","transcript":"hey","motion_logic":"raise left hand","kling_prompt":"wave","seaart_prompt":"portrait"},
            {"time":"2-4s","kling_prompt":"turn"}
        ]}"#;
        let segments = parse_segments(raw).unwrap();
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].time(), "0-2s");
        assert_eq!(segments[0].transcript(), "hey");
        assert_eq!(segments[0].motion_logic(), "raise left hand");
        assert_eq!(segments[0].seaart_prompt(), "portrait");
        assert_eq!(segments[1].time(), "2-4s");
        assert_eq!(segments[1].transcript(), "");
    }

    #[test]
    fn test_not_json_is_malformed_response() {
        let err = parse_segments("not json").unwrap_err();
        assert!(matches!(err, GeminiError::MalformedResponse(_)));
    }

    #[test]
    fn test_empty_object_yields_empty_sequence() {
        assert!(parse_segments("{}").unwrap().is_empty());
    }

    #[test]
    fn test_fenced_json_is_accepted() {
        let raw = "```json\n{\"segments\":[{\"time\":\"0-1s\"}]}\n```";
        let segments = parse_segments(raw).unwrap();
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].time(), "0-1s");
    }

    #[test]
    fn test_segment_count_is_capped() {
        let many: Vec<String> = (0..MAX_SEGMENTS + 50)
            .map(|i| format!(r#"{{"time":"{i}s"}}"#))
            .collect();
        let raw = format!(r#"{{"segments":[{}]}}"#, many.join(","));
        let segments = parse_segments(&raw).unwrap();
        assert_eq!(segments.len(), MAX_SEGMENTS);
        assert_eq!(segments[0].time(), "0s");
    }
}
