//! Tabular data persistence: CSV write/read and GFM table rendering.
//!
//! Tables are persisted to CSV before the Markdown that references them is
//! written, and the embedded Markdown view is rendered from the CSV read
//! back from disk rather than from the in-memory rows. That round trip
//! guarantees the embedded cell values match the persisted file even if a
//! value was altered by CSV quoting rules on the way out.

use crate::error::DocmarkError;
use std::path::Path;

/// Write rows to a CSV file. Rows may be ragged; each row is written with
/// its own field count, matching what the extraction source produced.
pub fn write_csv(path: &Path, rows: &[Vec<String>]) -> Result<(), DocmarkError> {
    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(|e| DocmarkError::Csv {
            path: path.to_path_buf(),
            detail: e.to_string(),
        })?;

    for row in rows {
        writer.write_record(row).map_err(|e| DocmarkError::Csv {
            path: path.to_path_buf(),
            detail: e.to_string(),
        })?;
    }

    writer.flush().map_err(|e| DocmarkError::Csv {
        path: path.to_path_buf(),
        detail: e.to_string(),
    })
}

/// Read a CSV file back into rows of cell strings.
pub fn read_csv(path: &Path) -> Result<Vec<Vec<String>>, DocmarkError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(|e| DocmarkError::Csv {
            path: path.to_path_buf(),
            detail: e.to_string(),
        })?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| DocmarkError::Csv {
            path: path.to_path_buf(),
            detail: e.to_string(),
        })?;
        rows.push(record.iter().map(str::to_string).collect());
    }
    Ok(rows)
}

/// Render rows as a GFM pipe table. The first row becomes the header,
/// followed by a separator row sized to the widest row.
///
/// Pipe characters inside cells are escaped so cell content can never break
/// the table structure. An empty row set renders to an empty string.
pub fn rows_to_markdown(rows: &[Vec<String>]) -> String {
    if rows.is_empty() {
        return String::new();
    }

    let columns = rows.iter().map(Vec::len).max().unwrap_or(0).max(1);

    let render_row = |row: &[String]| -> String {
        let mut line = String::from("|");
        for i in 0..columns {
            let cell = row.get(i).map(String::as_str).unwrap_or("");
            line.push(' ');
            line.push_str(&cell.replace('|', "\\|"));
            line.push_str(" |");
        }
        line
    };

    let mut out = String::new();
    out.push_str(&render_row(&rows[0]));
    out.push('\n');
    out.push('|');
    for _ in 0..columns {
        out.push_str(" --- |");
    }
    out.push('\n');
    for row in &rows[1..] {
        out.push_str(&render_row(row));
        out.push('\n');
    }
    out
}
