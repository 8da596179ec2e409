//! End-to-end tests for the structured pipeline, driven by an in-memory
//! fixture source so no pdfium library or network access is needed.

use docmark::{
    process_document, tabular, ConversionConfig, Document, DocumentSource, NO_DESCRIPTION,
};
use std::io::Cursor;
use std::path::Path;
use tempfile::TempDir;

/// A fixture backend: two tables, one picture, prose in between.
struct FixtureSource {
    /// Annotation attached to the picture, if any.
    picture_annotation: Option<String>,
}

impl FixtureSource {
    fn plain() -> Self {
        Self {
            picture_annotation: None,
        }
    }

    fn annotated(text: &str) -> Self {
        Self {
            picture_annotation: Some(text.to_string()),
        }
    }
}

impl DocumentSource for FixtureSource {
    fn load(&self, _path: &Path) -> Result<Document, docmark::DocmarkError> {
        let mut doc = Document::new("sample");
        doc.add_text("# Quarterly Report\n\nParts used this quarter:");
        doc.add_table(rows(&[&["Item", "Qty"], &["Bolt", "4"], &["Nut", "8"]]));
        doc.add_text("Revenue came in above forecast.");
        doc.add_table(rows(&[
            &["Quarter", "Revenue"],
            &["Q1", "1,200"],
            &["Q2", "1,950"],
        ]));
        doc.add_picture(
            tiny_png(),
            self.picture_annotation.iter().cloned().collect(),
        );
        doc.add_text("End of report.");
        Ok(doc)
    }
}

fn rows(data: &[&[&str]]) -> Vec<Vec<String>> {
    data.iter()
        .map(|r| r.iter().map(|c| c.to_string()).collect())
        .collect()
}

fn tiny_png() -> Vec<u8> {
    let img = image::DynamicImage::ImageRgba8(image::RgbaImage::from_pixel(
        4,
        4,
        image::Rgba([200, 40, 40, 255]),
    ));
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .expect("PNG encoding of the fixture image must succeed");
    buf
}

fn files_with_extension(dir: &Path, ext: &str) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .filter(|n| n.ends_with(ext))
        .collect();
    names.sort();
    names
}

#[tokio::test]
async fn offline_run_writes_complete_output_set() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("out");
    let config = ConversionConfig::default();

    let output = process_document(
        dir.path().join("sample.pdf"),
        &out,
        &FixtureSource::plain(),
        None,
        &config,
    )
    .await
    .expect("offline run must succeed");

    // Exactly 2 CSVs, 1 PNG, 1 Markdown file.
    assert_eq!(
        files_with_extension(&out, ".csv"),
        vec!["sample-table-1.csv", "sample-table-2.csv"]
    );
    assert_eq!(
        files_with_extension(&out, ".png"),
        vec!["sample-picture-1.png"]
    );
    assert_eq!(files_with_extension(&out, ".md"), vec!["sample.md"]);
    assert!(
        files_with_extension(&out, ".tmp").is_empty(),
        "atomic write must not leave temp files behind"
    );

    assert_eq!(output.tables.len(), 2);
    assert_eq!(output.images.len(), 1);
    assert_eq!(output.described_pictures, 0);
    assert!(output.failures.is_empty());
}

#[tokio::test]
async fn assembled_markdown_embeds_tables_and_sentinel() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("out");

    let output = process_document(
        dir.path().join("sample.pdf"),
        &out,
        &FixtureSource::plain(),
        None,
        &ConversionConfig::default(),
    )
    .await
    .unwrap();

    let markdown = std::fs::read_to_string(out.join("sample.md")).unwrap();
    assert_eq!(markdown, output.markdown);

    // Both tables are embedded; no placeholder survives.
    assert!(markdown.contains("| Item | Qty |"));
    assert!(markdown.contains("| Q2 | 1,950 |"));
    assert!(!markdown.contains("<!-- table:"));
    assert!(!markdown.contains("<!-- picture:"));

    // The undescribed picture contributes the sentinel exactly once, right
    // after its image link.
    assert_eq!(markdown.matches(NO_DESCRIPTION).count(), 1);
    assert!(markdown.contains("![#/pictures/0](sample-picture-1.png)"));

    // Reading order is preserved around the substitutions.
    let intro = markdown.find("Quarterly Report").unwrap();
    let first_table = markdown.find("| Item | Qty |").unwrap();
    let second_table = markdown.find("| Quarter | Revenue |").unwrap();
    let outro = markdown.find("End of report.").unwrap();
    assert!(intro < first_table && first_table < second_table && second_table < outro);
}

#[tokio::test]
async fn embedded_cells_match_persisted_csv() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("out");

    let output = process_document(
        dir.path().join("sample.pdf"),
        &out,
        &FixtureSource::plain(),
        None,
        &ConversionConfig::default(),
    )
    .await
    .unwrap();

    for export in &output.tables {
        let persisted = tabular::read_csv(&export.csv_path).unwrap();
        for row in &persisted {
            for cell in row {
                assert!(
                    export.markdown.contains(cell.as_str()),
                    "cell {cell:?} from {} missing in embedded table",
                    export.csv_path.display()
                );
            }
        }
        // The embedded rendering is exactly the persisted data re-rendered.
        assert_eq!(export.markdown, tabular::rows_to_markdown(&persisted));
    }
}

#[tokio::test]
async fn annotation_takes_precedence_over_sentinel() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("out");

    let output = process_document(
        dir.path().join("sample.pdf"),
        &out,
        &FixtureSource::annotated("A wiring diagram of the control unit."),
        None,
        &ConversionConfig::default(),
    )
    .await
    .unwrap();

    let markdown = std::fs::read_to_string(out.join("sample.md")).unwrap();
    assert!(markdown.contains("A wiring diagram of the control unit."));
    assert!(!markdown.contains(NO_DESCRIPTION));
    assert_eq!(output.described_pictures, 1);
}

#[tokio::test]
async fn document_with_no_exports_round_trips_unchanged() {
    struct TextOnly;
    impl DocumentSource for TextOnly {
        fn load(&self, _path: &Path) -> Result<Document, docmark::DocmarkError> {
            let mut doc = Document::new("plain");
            doc.add_text("Just a paragraph.");
            Ok(doc)
        }
    }

    let dir = TempDir::new().unwrap();
    let out = dir.path().join("out");

    let output = process_document(
        dir.path().join("plain.pdf"),
        &out,
        &TextOnly,
        None,
        &ConversionConfig::default(),
    )
    .await
    .unwrap();

    // With nothing to substitute the assembled Markdown equals the raw export.
    assert_eq!(output.markdown, "Just a paragraph.\n");
    assert!(files_with_extension(&out, ".csv").is_empty());
    assert!(files_with_extension(&out, ".png").is_empty());
}
