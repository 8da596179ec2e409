//! A pdfium-backed extraction source.
//!
//! Emits one text element per page (the page text in the order pdfium
//! reports it) and one picture element per embedded image object, decoded to
//! PNG. pdfium exposes no table structure, so this source never emits table
//! elements; structure-aware backends implement the same trait and do.
//!
//! `load` is synchronous and CPU-bound like every pdfium call. The
//! structured pipeline processes documents one at a time, so it invokes the
//! source directly rather than through a blocking-pool hop.

use crate::document::{Document, DocumentSource};
use crate::error::DocmarkError;
use crate::pipeline::input;
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::io::Cursor;
use std::path::Path;
use tracing::{debug, warn};

/// Extraction source built on `pdfium-render`.
#[derive(Debug, Default)]
pub struct PdfiumSource;

impl PdfiumSource {
    pub fn new() -> Self {
        Self
    }
}

impl DocumentSource for PdfiumSource {
    fn load(&self, path: &Path) -> Result<Document, DocmarkError> {
        let path = input::validate_pdf(path)?;

        let pdfium = crate::pipeline::render::bind_pdfium()?;
        let pdf = pdfium
            .load_pdf_from_file(&path, None)
            .map_err(|e| DocmarkError::ExtractionFailed {
                path: path.clone(),
                detail: format!("{e:?}"),
            })?;

        let mut document = Document::new(input::document_name(&path));

        for (page_idx, page) in pdf.pages().iter().enumerate() {
            let text = page
                .text()
                .map(|t| t.all())
                .map_err(|e| DocmarkError::ExtractionFailed {
                    path: path.clone(),
                    detail: format!("text extraction failed on page {}: {e:?}", page_idx + 1),
                })?;
            if !text.trim().is_empty() {
                document.add_text(text.trim());
            }

            for object in page.objects().iter() {
                let Some(image_object) = object.as_image_object() else {
                    continue;
                };
                match image_object.get_raw_image() {
                    Ok(img) => {
                        let png = png_bytes(&img).map_err(|e| DocmarkError::ExtractionFailed {
                            path: path.clone(),
                            detail: format!("PNG encoding failed on page {}: {e}", page_idx + 1),
                        })?;
                        let picture = document.add_picture(png, Vec::new());
                        debug!(
                            "page {}: extracted image {} ({} bytes)",
                            page_idx + 1,
                            picture.ref_id,
                            picture.png.len()
                        );
                    }
                    Err(e) => {
                        // Some embedded images use filters pdfium cannot
                        // decode standalone; skip rather than fail the page.
                        warn!("page {}: skipping undecodable image: {e:?}", page_idx + 1);
                    }
                }
            }
        }

        Ok(document)
    }
}

fn png_bytes(img: &DynamicImage) -> Result<Vec<u8>, image::ImageError> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)?;
    Ok(buf)
}
