//! The extracted-document model: elements, reference ids, and the
//! placeholder-bearing Markdown export.
//!
//! An extraction source reduces a PDF to an ordered sequence of
//! [`Element`]s — text blocks, tables, pictures — in reading order. Each
//! element carries a reference id that is unique within its document and
//! stable for the lifetime of the run; ids are assigned at insertion
//! (`#/texts/0`, `#/tables/1`, …) so uniqueness holds by construction.
//!
//! [`Document::export_markdown`] emits text bodies verbatim and a delimited
//! placeholder comment for every table and picture. The assembler later
//! replaces those placeholders with rendered content; see
//! [`crate::assemble`].

use crate::error::DocmarkError;
use std::path::Path;

/// One extracted unit of document content.
///
/// Exhaustive pattern matching over this enum is the only dispatch mechanism
/// used by the pipelines; there is no runtime type inspection.
#[derive(Debug, Clone)]
pub enum Element {
    /// A block of running text.
    Text(TextBlock),
    /// A table with rectangular cell data.
    Table(TableBlock),
    /// A raster picture.
    Picture(PictureBlock),
}

impl Element {
    /// The element's stable reference id.
    pub fn ref_id(&self) -> &str {
        match self {
            Element::Text(t) => &t.ref_id,
            Element::Table(t) => &t.ref_id,
            Element::Picture(p) => &p.ref_id,
        }
    }
}

/// A block of running text in reading order.
#[derive(Debug, Clone)]
pub struct TextBlock {
    pub ref_id: String,
    /// Markdown-safe text content.
    pub text: String,
}

/// A table as rectangular rows of cell strings. The first row is treated as
/// the header when rendered to Markdown.
#[derive(Debug, Clone)]
pub struct TableBlock {
    pub ref_id: String,
    pub rows: Vec<Vec<String>>,
}

/// A raster picture, decoded to PNG bytes by the extraction source.
#[derive(Debug, Clone)]
pub struct PictureBlock {
    pub ref_id: String,
    /// PNG-encoded image data.
    pub png: Vec<u8>,
    /// Description annotations attached by the extraction source, if any.
    /// The first annotation wins when the document is assembled.
    pub annotations: Vec<String>,
}

/// An extracted document: ordered elements plus the document name used to
/// derive output filenames.
#[derive(Debug, Clone, Default)]
pub struct Document {
    /// Document name, normally the input file stem.
    pub name: String,
    elements: Vec<Element>,
}

impl Document {
    /// Create an empty document with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            elements: Vec::new(),
        }
    }

    /// Append a text block, assigning the next `#/texts/N` reference id.
    pub fn add_text(&mut self, text: impl Into<String>) -> &TextBlock {
        let ref_id = format!("#/texts/{}", self.count_kind("#/texts/"));
        self.elements.push(Element::Text(TextBlock {
            ref_id,
            text: text.into(),
        }));
        match self.elements.last() {
            Some(Element::Text(t)) => t,
            _ => unreachable!(),
        }
    }

    /// Append a table, assigning the next `#/tables/N` reference id.
    pub fn add_table(&mut self, rows: Vec<Vec<String>>) -> &TableBlock {
        let ref_id = format!("#/tables/{}", self.count_kind("#/tables/"));
        self.elements.push(Element::Table(TableBlock { ref_id, rows }));
        match self.elements.last() {
            Some(Element::Table(t)) => t,
            _ => unreachable!(),
        }
    }

    /// Append a picture, assigning the next `#/pictures/N` reference id.
    pub fn add_picture(&mut self, png: Vec<u8>, annotations: Vec<String>) -> &PictureBlock {
        let ref_id = format!("#/pictures/{}", self.count_kind("#/pictures/"));
        self.elements.push(Element::Picture(PictureBlock {
            ref_id,
            png,
            annotations,
        }));
        match self.elements.last() {
            Some(Element::Picture(p)) => p,
            _ => unreachable!(),
        }
    }

    fn count_kind(&self, prefix: &str) -> usize {
        self.elements
            .iter()
            .filter(|e| e.ref_id().starts_with(prefix))
            .count()
    }

    /// All elements in reading order.
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    /// Tables in reading order.
    pub fn tables(&self) -> impl Iterator<Item = &TableBlock> {
        self.elements.iter().filter_map(|e| match e {
            Element::Table(t) => Some(t),
            _ => None,
        })
    }

    /// Pictures in reading order.
    pub fn pictures(&self) -> impl Iterator<Item = &PictureBlock> {
        self.elements.iter().filter_map(|e| match e {
            Element::Picture(p) => Some(p),
            _ => None,
        })
    }

    /// Export the document as raw Markdown with placeholder markers.
    ///
    /// Text bodies are emitted verbatim; every table and picture contributes
    /// a delimited marker comment at its reading-order position. The result
    /// ends with exactly one newline.
    pub fn export_markdown(&self) -> String {
        let mut parts: Vec<String> = Vec::with_capacity(self.elements.len());
        for element in &self.elements {
            match element {
                Element::Text(t) => parts.push(t.text.trim_end().to_string()),
                Element::Table(t) => parts.push(crate::assemble::table_marker(&t.ref_id)),
                Element::Picture(p) => parts.push(crate::assemble::picture_marker(&p.ref_id)),
            }
        }
        let mut md = parts.join("\n\n");
        md.push('\n');
        md
    }
}

/// A producer of extracted documents.
///
/// Implementations wrap a concrete conversion backend. The crate ships
/// [`crate::extract::PdfiumSource`]; structure-aware backends (table
/// recognition, layout models) implement the same trait.
pub trait DocumentSource {
    /// Extract `path` into an ordered [`Document`].
    ///
    /// A failure here is fatal for the run: no output files have been
    /// written yet when this returns `Err`.
    fn load(&self, path: &Path) -> Result<Document, DocmarkError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_ids_are_unique_and_kind_scoped() {
        let mut doc = Document::new("sample");
        doc.add_text("intro");
        doc.add_table(vec![vec!["a".into()]]);
        doc.add_picture(vec![1, 2, 3], vec![]);
        doc.add_table(vec![vec!["b".into()]]);

        let ids: Vec<&str> = doc.elements().iter().map(|e| e.ref_id()).collect();
        assert_eq!(
            ids,
            vec!["#/texts/0", "#/tables/0", "#/pictures/0", "#/tables/1"]
        );

        let mut sorted = ids.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), ids.len(), "ids must be unique");
    }

    #[test]
    fn export_preserves_reading_order() {
        let mut doc = Document::new("sample");
        doc.add_text("before");
        doc.add_table(vec![vec!["x".into()]]);
        doc.add_text("after");

        let md = doc.export_markdown();
        let before = md.find("before").unwrap();
        let marker = md.find("<!-- table: #/tables/0 -->").unwrap();
        let after = md.find("after").unwrap();
        assert!(before < marker && marker < after);
        assert!(md.ends_with('\n'));
    }

    #[test]
    fn iterators_filter_by_kind() {
        let mut doc = Document::new("sample");
        doc.add_table(vec![]);
        doc.add_picture(vec![], vec!["a chart".into()]);
        doc.add_table(vec![]);

        assert_eq!(doc.tables().count(), 2);
        assert_eq!(doc.pictures().count(), 1);
        assert_eq!(
            doc.pictures().next().unwrap().annotations,
            vec!["a chart".to_string()]
        );
    }
}
