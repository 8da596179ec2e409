//! Run output types: per-page transcription records and run summaries.

use crate::assemble::{ImageExport, TableExport};
use crate::error::ElementError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One transcribed page, as persisted in the JSON output.
///
/// `image_tokens_estimated` and `usd_estimated` come from the geometry-based
/// estimate in [`crate::cost`] and are approximations only — never
/// billing-accurate. `tokens_used` is the count the provider itself reported
/// for the call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageRecord {
    /// Input file name (no directory).
    pub filename: String,
    /// 1-based page number.
    pub page_number: usize,
    /// Transcribed Markdown content.
    pub content: String,
    /// Provider-assigned request/response identifier.
    pub response_id: String,
    /// Total tokens reported by the provider.
    pub tokens_used: u64,
    /// Estimated image tokens from pixel geometry (approximate).
    pub image_tokens_estimated: u64,
    /// Estimated USD for the page (approximate).
    pub usd_estimated: f64,
}

/// Result of a page-transcription run.
#[derive(Debug)]
pub struct TranscribeOutput {
    /// Successful pages, ordered by page number.
    pub pages: Vec<PageRecord>,
    /// Pages that failed after retries.
    pub failures: Vec<ElementError>,
    /// Path of the written JSON file.
    pub json_path: PathBuf,
    /// Summary statistics.
    pub stats: TranscribeStats,
}

/// Aggregate statistics for a transcription run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TranscribeStats {
    /// Pages in the document.
    pub total_pages: usize,
    /// Pages transcribed successfully.
    pub processed_pages: usize,
    /// Pages that failed after retries.
    pub failed_pages: usize,
    /// Sum of provider-reported tokens.
    pub total_tokens: u64,
    /// Sum of per-page estimated USD (approximate).
    pub total_usd_estimated: f64,
    /// Wall-clock duration of the whole run in milliseconds.
    pub total_duration_ms: u64,
    /// Time spent rasterising pages in milliseconds.
    pub render_duration_ms: u64,
}

/// Result of a structured extraction run.
#[derive(Debug)]
pub struct StructuredOutput {
    /// The assembled Markdown document.
    pub markdown: String,
    /// Path of the written Markdown file.
    pub markdown_path: PathBuf,
    /// Table exports, in document order.
    pub tables: Vec<TableExport>,
    /// Image exports, in document order.
    pub images: Vec<ImageExport>,
    /// Pictures whose description call failed (they fall back to the
    /// sentinel text in the assembled Markdown).
    pub failures: Vec<ElementError>,
    /// Pictures that ended up with a real description.
    pub described_pictures: usize,
    /// Wall-clock duration of the whole run in milliseconds.
    pub total_duration_ms: u64,
}
