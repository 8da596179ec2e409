//! The structured extraction pipeline.
//!
//! One call to [`process_document`] turns a PDF into a per-document output
//! set: `<name>-table-<n>.csv` for every table, `<name>-picture-<n>.png` for
//! every picture, and `<name>.md` — the raw Markdown export with every
//! placeholder replaced by rendered content.
//!
//! ## Write ordering
//!
//! CSV and PNG files are written (and closed) strictly before the Markdown
//! that references them, and the Markdown itself lands via temp-file-plus-
//! rename. A concurrent reader can therefore never observe a Markdown file
//! pointing at a not-yet-written asset, or a half-written Markdown file.
//!
//! ## Description policy
//!
//! A picture's description comes from the first extraction-time annotation
//! when one exists; otherwise from the vision client when one is configured.
//! A failed description call is retried, then degrades to the sentinel text
//! rather than aborting the run — the failure is reported in
//! [`StructuredOutput::failures`].

use crate::assemble::{assemble, ImageExport, TableExport};
use crate::config::ConversionConfig;
use crate::document::DocumentSource;
use crate::enrich::VisionClient;
use crate::error::{DocmarkError, ElementError};
use crate::output::StructuredOutput;
use crate::pipeline::input;
use crate::tabular;
use std::path::Path;
use std::time::Instant;
use tracing::{info, warn};

/// Run the structured pipeline for one document.
///
/// * `source` — extraction backend producing the element sequence.
/// * `client` — optional vision client for picture descriptions; with `None`
///   (or `config.describe_pictures == false`) the run is fully offline and
///   undescribed pictures keep the sentinel text.
///
/// # Errors
/// Fatal only: extraction failure (nothing written), or an output-file
/// write failure. Per-picture description failures are non-fatal.
pub async fn process_document(
    input_path: impl AsRef<Path>,
    output_dir: impl AsRef<Path>,
    source: &dyn DocumentSource,
    client: Option<&VisionClient>,
    config: &ConversionConfig,
) -> Result<StructuredOutput, DocmarkError> {
    let start = Instant::now();
    let input_path = input_path.as_ref();
    let output_dir = output_dir.as_ref();

    // Extraction happens before any file is created, so an extraction
    // failure leaves no partial output behind.
    let document = source.load(input_path)?;
    let name = if document.name.is_empty() {
        input::document_name(input_path)
    } else {
        document.name.clone()
    };
    info!(
        "extracted '{}': {} elements ({} tables, {} pictures)",
        name,
        document.elements().len(),
        document.tables().count(),
        document.pictures().count()
    );

    std::fs::create_dir_all(output_dir).map_err(|e| DocmarkError::OutputWriteFailed {
        path: output_dir.to_path_buf(),
        source: e,
    })?;

    // ── Tables → CSV, then render Markdown from the file just written ────
    let mut tables: Vec<TableExport> = Vec::new();
    for (i, table) in document.tables().enumerate() {
        let csv_path = output_dir.join(format!("{}-table-{}.csv", name, i + 1));
        tabular::write_csv(&csv_path, &table.rows)?;
        let persisted = tabular::read_csv(&csv_path)?;
        info!("saved table {} to {}", i + 1, csv_path.display());
        tables.push(TableExport {
            ref_id: table.ref_id.clone(),
            markdown: tabular::rows_to_markdown(&persisted),
            csv_path,
        });
    }

    // ── Pictures → PNG + description ─────────────────────────────────────
    let describer = client.filter(|_| config.describe_pictures);
    let mut images: Vec<ImageExport> = Vec::new();
    let mut failures: Vec<ElementError> = Vec::new();

    for (i, picture) in document.pictures().enumerate() {
        let image_path = output_dir.join(format!("{}-picture-{}.png", name, i + 1));
        std::fs::write(&image_path, &picture.png).map_err(|e| {
            DocmarkError::OutputWriteFailed {
                path: image_path.clone(),
                source: e,
            }
        })?;
        info!("saved picture {} to {}", i + 1, image_path.display());

        let description = match picture.annotations.first() {
            Some(annotation) => Some(annotation.clone()),
            None => match describer {
                Some(vision) => {
                    match vision
                        .describe_picture(
                            &picture.png,
                            config.max_retries,
                            config.retry_backoff_ms,
                        )
                        .await
                    {
                        Ok(text) => Some(text),
                        Err(e) => {
                            warn!("description failed for {}: {e}", picture.ref_id);
                            failures.push(ElementError::DescriptionFailed {
                                ref_id: picture.ref_id.clone(),
                                retries: config.max_retries,
                                detail: e.to_string(),
                            });
                            None
                        }
                    }
                }
                None => None,
            },
        };

        images.push(ImageExport {
            ref_id: picture.ref_id.clone(),
            image_path,
            description,
        });
    }

    // ── Assemble and persist the Markdown last ───────────────────────────
    let raw_markdown = document.export_markdown();
    let markdown = assemble(&raw_markdown, &tables, &images);
    let markdown_path = output_dir.join(format!("{name}.md"));
    write_atomic(&markdown_path, markdown.as_bytes()).await?;

    let described_pictures = images.iter().filter(|i| i.description.is_some()).count();
    info!(
        "wrote {} ({} tables, {} pictures, {} described) in {}ms",
        markdown_path.display(),
        tables.len(),
        images.len(),
        described_pictures,
        start.elapsed().as_millis()
    );

    Ok(StructuredOutput {
        markdown,
        markdown_path,
        tables,
        images,
        failures,
        described_pictures,
        total_duration_ms: start.elapsed().as_millis() as u64,
    })
}

/// Write a file via sibling temp file + rename so readers never observe a
/// partial file.
pub(crate) async fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), DocmarkError> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    let tmp_path = path.with_file_name(format!("{file_name}.tmp"));

    tokio::fs::write(&tmp_path, contents)
        .await
        .map_err(|e| DocmarkError::OutputWriteFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

    tokio::fs::rename(&tmp_path, path)
        .await
        .map_err(|e| DocmarkError::OutputWriteFailed {
            path: path.to_path_buf(),
            source: e,
        })
}
