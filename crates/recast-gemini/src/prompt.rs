//! Deterministic analysis prompt construction.

/// Default director persona: character identity plus a consistency clause.
pub const DEFAULT_PERSONA: &str = "Caucasian fitness model, honey-blonde hair, \
beauty mark on right cheek. Maintain 100% facial and clothing consistency \
across all segments.";

/// Build the instruction text sent alongside the video reference.
///
/// Pure and deterministic given `persona`: the persona is embedded verbatim,
/// followed by the four numbered analysis requirements and the expected
/// output shape. The output-shape line is what makes the JSON response mode
/// come back as `{"segments": [...]}`.
pub fn build_prompt(persona: &str) -> String {
    format!(
        "ACT AS: High-end Film Director. CHARACTER: {persona}\n\
         TASK: Deconstruct video into seamless segments for the US market.\n\
         ANALYSIS REQUIREMENTS:\n\
         1. TRANSCRIPT: Accurate voice-to-text.\n\
         2. MOTION SKELETON: Describe exact hand/head movements to ensure continuity.\n\
         3. SMOOTH TRANSITION: Ensure the END of segment 'n' flows perfectly into the START of 'n+1'.\n\
         4. LIGHTING: Keep shadows and light direction identical to the original video.\n\
         OUTPUT JSON: {{'segments': [{{'time', 'transcript', 'motion_logic', 'kling_prompt', 'seaart_prompt'}}]}}"
    )
}
