//! # docmark
//!
//! Convert PDF documents to structured Markdown.
//!
//! Two pipelines cover two kinds of documents:
//!
//! * **Structured extraction** — an extraction source reduces the document
//!   to ordered elements (text, tables, pictures); tables land as CSV,
//!   pictures as PNG with optional vision-model descriptions, and the final
//!   Markdown embeds everything at its original reading-order position via
//!   placeholder substitution.
//! * **Page transcription** — each page is rasterised and handed to a
//!   vision model that transcribes it to Markdown wholesale; per-page
//!   results (with geometry-based token/cost estimates) land as ordered
//!   JSON.
//!
//! ## Pipeline Overview
//!
//! ```text
//! extract:     PDF ─▶ source ─▶ CSV/PNG exports ─▶ describe ─▶ assemble ─▶ <name>.md
//! transcribe:  PDF ─▶ render ─▶ encode ─▶ VLM ─▶ cost estimate ─▶ <name>_output_<model>_<detail>.json
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use docmark::{process_document, ConversionConfig, PdfiumSource, VisionClient, VisionOptions};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Reads OPENAI_API_KEY; fails fast before any document work.
//!     let client = VisionClient::new(VisionOptions::from_env()?)?;
//!     let config = ConversionConfig::default();
//!     let output = process_document(
//!         "contract.pdf",
//!         "output",
//!         &PdfiumSource::new(),
//!         Some(&client),
//!         &config,
//!     )
//!     .await?;
//!     println!("{}", output.markdown_path.display());
//!     Ok(())
//! }
//! ```
//!
//! Cost figures produced by this crate are geometry-based approximations of
//! provider billing, never billing-accurate; see [`cost`].

// ── Modules ──────────────────────────────────────────────────────────────

pub mod assemble;
pub mod config;
pub mod convert;
pub mod cost;
pub mod document;
pub mod enrich;
pub mod error;
pub mod extract;
pub mod output;
pub mod pipeline;
pub mod prompts;
pub mod tabular;
pub mod transcribe;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use assemble::{assemble, ImageExport, TableExport, NO_DESCRIPTION};
pub use config::{ConversionConfig, ConversionConfigBuilder, Detail};
pub use convert::process_document;
pub use cost::{CostEstimate, ModelRate, Pricing};
pub use document::{Document, DocumentSource, Element, PictureBlock, TableBlock, TextBlock};
pub use enrich::{VisionClient, VisionOptions, CREDENTIAL_VAR};
pub use error::{DocmarkError, ElementError};
pub use extract::PdfiumSource;
pub use output::{PageRecord, StructuredOutput, TranscribeOutput, TranscribeStats};
pub use transcribe::transcribe_document;
