//! Prompts for the vision-model calls.
//!
//! Centralising every prompt here serves two purposes:
//!
//! 1. **Single source of truth** — changing what the model is asked to do
//!    requires editing exactly one place.
//!
//! 2. **Testability** — unit tests can inspect prompts directly without
//!    spinning up a real model.
//!
//! Callers can override either prompt: the description prompt via
//! [`crate::enrich::VisionOptions::prompt`], the transcription prompt via
//! [`crate::config::ConversionConfig::transcription_prompt`]. The constants
//! here apply only when no override is provided.

/// Default prompt asking the model to describe one extracted picture.
pub const DEFAULT_DESCRIBE_PROMPT: &str =
    "Describe the image in detail, including any text, objects, and layout. \
     Be accurate and thorough.";

/// Default prompt asking the model to transcribe one full page image into
/// Markdown.
pub const DEFAULT_TRANSCRIBE_PROMPT: &str = r#"You are given an image of a single PDF document page. Extract its textual content in clean, structured Markdown format suitable for indexing and embedding into a RAG system.

- Follow the reading order as naturally presented in the page.
- Use proper Markdown syntax for all sections: headings, subheadings, body text, bullet points, numbered lists, etc.
- Detect and extract **all tables**, even if they are embedded within text or mixed with other content. Convert them into valid **CSV format**, and enclose each table in a fenced block marked with ```csv```.
- Ensure merged or multi-row/column cells are flattened in a readable, linear CSV structure.
- If the page contains any **visual elements** (e.g. charts, images, diagrams), briefly describe them **in their actual location in the text**, using fenced blocks labeled ```Visual Description```.
- Do **not** wrap the entire output in a ```markdown``` block. Only tables and visual descriptions should use fenced blocks.
- Do **not** generate layout metadata, visual positions, or bounding-box outputs.
- Ensure consistent, deterministic structure across identical inputs for reliable indexing."#;
