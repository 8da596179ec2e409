//! Placeholder substitution: splice exported tables and pictures back into
//! the raw Markdown at their original reading-order positions.
//!
//! The raw export marks each table and picture with a delimited comment,
//! e.g. `<!-- table: #/tables/0 -->`. Substitution is literal string
//! replacement keyed by the full marker, not a structural re-parse of the
//! Markdown. The trailing ` -->` delimiter makes every marker unambiguous
//! even when one reference id is a prefix of another (`#/tables/1` vs
//! `#/tables/10`).
//!
//! A marker absent from the raw Markdown is silently skipped: the exported
//! file still exists on disk but is not embedded. This mirrors the exporter
//! contract (it may legitimately omit elements) and is a documented
//! limitation, not an error.

use std::path::{Path, PathBuf};

/// Fallback description for a picture with no annotation and no
/// vision-model description.
pub const NO_DESCRIPTION: &str = "no description available";

/// A table persisted to CSV, plus its Markdown rendering.
#[derive(Debug, Clone)]
pub struct TableExport {
    /// Reference id of the source table element.
    pub ref_id: String,
    /// Path of the written CSV file.
    pub csv_path: PathBuf,
    /// GFM table text re-rendered from the CSV, so the embedded view always
    /// matches the persisted file.
    pub markdown: String,
}

/// A picture persisted to PNG, plus its description if one was produced.
#[derive(Debug, Clone)]
pub struct ImageExport {
    /// Reference id of the source picture element.
    pub ref_id: String,
    /// Path of the written PNG file.
    pub image_path: PathBuf,
    /// Description text; `None` substitutes [`NO_DESCRIPTION`].
    pub description: Option<String>,
}

/// The placeholder marker emitted for a table element.
pub fn table_marker(ref_id: &str) -> String {
    format!("<!-- table: {ref_id} -->")
}

/// The placeholder marker emitted for a picture element.
pub fn picture_marker(ref_id: &str) -> String {
    format!("<!-- picture: {ref_id} -->")
}

/// Build the final Markdown document from the raw export and the per-element
/// exports.
///
/// Every table marker present in `raw_markdown` is replaced by the table's
/// Markdown rendering; every picture marker by an image reference to the
/// saved file followed by a description line (the sentinel when none was
/// produced). All referenced files must already be on disk — callers write
/// CSVs and PNGs strictly before invoking this and before persisting the
/// result.
///
/// With no tables and no pictures the input is returned unchanged.
pub fn assemble(
    raw_markdown: &str,
    table_exports: &[TableExport],
    image_exports: &[ImageExport],
) -> String {
    let mut markdown = raw_markdown.to_string();

    for table in table_exports {
        let marker = table_marker(&table.ref_id);
        if !markdown.contains(&marker) {
            tracing::debug!("table marker {marker} not present in export, skipping");
            continue;
        }
        markdown = markdown.replace(&marker, table.markdown.trim_end());
    }

    for image in image_exports {
        let marker = picture_marker(&image.ref_id);
        if !markdown.contains(&marker) {
            tracing::debug!("picture marker {marker} not present in export, skipping");
            continue;
        }
        let description = image.description.as_deref().unwrap_or(NO_DESCRIPTION);
        let block = format!(
            "![{}]({})\n\n{}",
            image.ref_id,
            file_name(&image.image_path),
            description
        );
        markdown = markdown.replace(&marker, &block);
    }

    markdown
}

/// The bare file name used in the image link, relative to the Markdown file
/// that sits in the same output directory.
fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
