//! Error types for the docmark library.
//!
//! Failures split along the fatal/non-fatal line:
//!
//! * [`DocmarkError`] is fatal: the run cannot proceed at all (missing
//!   credential, unreadable input, extraction failure, output directory not
//!   writable). The top-level pipeline functions return it directly.
//!
//! * [`ElementError`] is non-fatal: one picture description or one page
//!   transcription failed after retries. Reported alongside the run output
//!   so callers can inspect partial success; the affected picture falls back
//!   to the sentinel description and the affected page is skipped.
//!
//! A configuration error (missing API key, invalid option) is always raised
//! before any document work begins, so a failed run never leaves a partially
//! written output set behind for that reason.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the docmark library.
///
/// Per-element failures use [`ElementError`] and are reported in the run
/// output rather than propagated here.
#[derive(Debug, Error)]
pub enum DocmarkError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file exists and was read, but is not a PDF.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF '{path}' is corrupt: {detail}")]
    CorruptPdf { path: PathBuf, detail: String },

    // ── Extraction errors ─────────────────────────────────────────────────
    /// The extraction source could not produce a document. No output files
    /// are written when this is returned.
    #[error("Extraction failed for '{path}': {detail}")]
    ExtractionFailed { path: PathBuf, detail: String },

    /// pdfium returned an error while rasterising a specific page.
    #[error("Rasterisation failed for page {page}: {detail}")]
    RasterisationFailed { page: usize, detail: String },

    // ── Remote API errors ─────────────────────────────────────────────────
    /// The credential environment variable is not set.
    ///
    /// Raised before any document processing starts.
    #[error("Environment variable {var} is not set.\nExport your API key first: export {var}=sk-...")]
    MissingCredential { var: &'static str },

    /// The vision API returned a non-retryable error.
    #[error("Vision API error (HTTP {status}): {detail}")]
    ApiError { status: u16, detail: String },

    /// The HTTP request itself failed (connection refused, timeout, TLS).
    #[error("Vision API request failed: {detail}")]
    RequestFailed { detail: String },

    /// The vision API response did not contain usable content.
    #[error("Vision API returned an unusable response: {detail}")]
    EmptyResponse { detail: String },

    /// Every page failed after all retries; the output would be empty.
    #[error("All {total} pages failed after {retries} retries each.\nFirst error: {first_error}")]
    AllPagesFailed {
        total: usize,
        retries: u32,
        first_error: String,
    },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write an output file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A CSV file could not be written or read back.
    #[error("CSV error for '{path}': {detail}")]
    Csv { path: PathBuf, detail: String },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Pdfium binding errors ─────────────────────────────────────────────
    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\
Set PDFIUM_LIB_PATH=/path/to/libpdfium or install pdfium system-wide."
    )]
    PdfiumBindingFailed(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal error for a single element of a run.
///
/// The overall run continues; the error is reported in the output summary.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
pub enum ElementError {
    /// A picture description call failed after retries; the picture keeps
    /// the sentinel description.
    #[error("Picture {ref_id}: description failed after {retries} retries: {detail}")]
    DescriptionFailed {
        ref_id: String,
        retries: u32,
        detail: String,
    },

    /// A page transcription call failed after retries; the page is absent
    /// from the JSON output.
    #[error("Page {page}: transcription failed after {retries} retries: {detail}")]
    PageFailed {
        page: usize,
        retries: u32,
        detail: String,
    },
}
