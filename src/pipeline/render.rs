//! PDF rasterisation: render every page to a `DynamicImage` via pdfium.
//!
//! The `pdfium-render` crate wraps the pdfium C++ library, which uses
//! thread-local state internally and is not safe to call from async
//! contexts. `tokio::task::spawn_blocking` moves the work onto the blocking
//! thread pool so the async workers keep serving the network-bound stages.
//!
//! Page size is capped by pixel dimension rather than DPI: page sizes vary
//! wildly, and a fixed pixel cap bounds both memory and the image-token cost
//! of every page regardless of physical size.

use crate::error::DocmarkError;
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::path::Path;
use tracing::{debug, info};

/// Rasterise all pages of a PDF into images.
///
/// Runs inside `spawn_blocking` since pdfium operations are CPU-bound.
///
/// # Returns
/// A vector of `(page_index_0based, DynamicImage)` tuples in page order.
pub async fn render_pages(
    pdf_path: &Path,
    max_pixels: u32,
) -> Result<Vec<(usize, DynamicImage)>, DocmarkError> {
    let path = pdf_path.to_path_buf();

    tokio::task::spawn_blocking(move || render_pages_blocking(&path, max_pixels))
        .await
        .map_err(|e| DocmarkError::Internal(format!("render task panicked: {e}")))?
}

/// Bind to the pdfium shared library, preferring `PDFIUM_LIB_PATH` when set.
pub(crate) fn bind_pdfium() -> Result<Pdfium, DocmarkError> {
    let bindings = match std::env::var("PDFIUM_LIB_PATH") {
        Ok(path) if !path.is_empty() => {
            Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(&path))
                .or_else(|_| Pdfium::bind_to_system_library())
        }
        _ => Pdfium::bind_to_system_library(),
    }
    .map_err(|e| DocmarkError::PdfiumBindingFailed(format!("{e:?}")))?;
    Ok(Pdfium::new(bindings))
}

fn render_pages_blocking(
    pdf_path: &Path,
    max_pixels: u32,
) -> Result<Vec<(usize, DynamicImage)>, DocmarkError> {
    let pdfium = bind_pdfium()?;

    let document =
        pdfium
            .load_pdf_from_file(pdf_path, None)
            .map_err(|e| DocmarkError::CorruptPdf {
                path: pdf_path.to_path_buf(),
                detail: format!("{e:?}"),
            })?;

    let pages = document.pages();
    let total_pages = pages.len() as usize;
    info!("PDF loaded: {} pages", total_pages);

    let render_config = PdfRenderConfig::new()
        .set_target_width(max_pixels as i32)
        .set_maximum_height(max_pixels as i32);

    let mut results = Vec::with_capacity(total_pages);

    for (idx, page) in pages.iter().enumerate() {
        let bitmap =
            page.render_with_config(&render_config)
                .map_err(|e| DocmarkError::RasterisationFailed {
                    page: idx + 1,
                    detail: format!("{e:?}"),
                })?;

        let image = bitmap.as_image();
        debug!(
            "rendered page {} → {}x{} px",
            idx + 1,
            image.width(),
            image.height()
        );

        results.push((idx, image));
    }

    Ok(results)
}
