//! The page-transcription pipeline.
//!
//! Each page is rasterised to PNG, sent to the vision model for a full-page
//! Markdown transcription, and costed from its pixel geometry. The result is
//! `<name>_output_<model>_<detail>.json`: an ordered list of per-page
//! records.
//!
//! Page calls are independent, so they fan out through
//! `futures::stream::buffer_unordered` up to the configured concurrency and
//! are re-sorted by page number before the JSON is written. A page that
//! fails after retries is skipped and reported; the run only aborts when
//! every page failed.

use crate::config::ConversionConfig;
use crate::convert::write_atomic;
use crate::cost::round6;
use crate::enrich::VisionClient;
use crate::error::{DocmarkError, ElementError};
use crate::output::{PageRecord, TranscribeOutput, TranscribeStats};
use crate::pipeline::{encode, input, postprocess, render};
use crate::prompts::DEFAULT_TRANSCRIBE_PROMPT;
use futures::stream::{self, StreamExt};
use std::path::Path;
use std::time::Instant;
use tracing::{info, warn};

/// Transcribe every page of a PDF and write the ordered JSON output.
///
/// * `output_dir` — where the JSON lands; defaults to the input file's
///   directory when `None`.
///
/// # Errors
/// Fatal: unreadable/invalid input, rasterisation failure, every page
/// failing, or the JSON write failing. A single failed page is non-fatal
/// and reported in [`TranscribeOutput::failures`].
pub async fn transcribe_document(
    input_path: impl AsRef<Path>,
    output_dir: Option<&Path>,
    client: &VisionClient,
    config: &ConversionConfig,
) -> Result<TranscribeOutput, DocmarkError> {
    let total_start = Instant::now();
    let input_path = input::validate_pdf(input_path.as_ref())?;
    let name = input::document_name(&input_path);
    let filename = input_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| name.clone());

    // ── Rasterise ────────────────────────────────────────────────────────
    let render_start = Instant::now();
    let rendered = render::render_pages(&input_path, config.max_rendered_pixels).await?;
    let render_duration_ms = render_start.elapsed().as_millis() as u64;
    let total_pages = rendered.len();
    info!("rendered {total_pages} pages in {render_duration_ms}ms");
    if total_pages == 0 {
        return Err(DocmarkError::CorruptPdf {
            path: input_path.clone(),
            detail: "document contains no pages".into(),
        });
    }

    // ── Encode ───────────────────────────────────────────────────────────
    let encoded: Vec<(usize, encode::EncodedPage)> = rendered
        .iter()
        .filter_map(|(idx, img)| match encode::encode_page(img) {
            Ok(page) => Some((*idx, page)),
            Err(e) => {
                warn!("failed to encode page {}: {e}", idx + 1);
                None
            }
        })
        .collect();

    // ── Transcribe concurrently ──────────────────────────────────────────
    let prompt = config
        .transcription_prompt
        .as_deref()
        .unwrap_or(DEFAULT_TRANSCRIBE_PROMPT);
    let model = client.options().model.clone();

    let outcomes: Vec<Result<PageRecord, ElementError>> =
        stream::iter(encoded.iter().map(|(idx, page)| {
            let page_num = idx + 1;
            let filename = filename.clone();
            let model = model.clone();
            async move {
                info!("processing page {page_num}/{total_pages}");
                let outcome = client
                    .transcribe_page(
                        &page.base64,
                        config.detail,
                        prompt,
                        client.options().max_tokens,
                        config.max_retries,
                        config.retry_backoff_ms,
                    )
                    .await
                    .map_err(|e| ElementError::PageFailed {
                        page: page_num,
                        retries: config.max_retries,
                        detail: e.to_string(),
                    })?;

                let estimate = config.pricing.estimate(page.width, page.height, &model);

                Ok(PageRecord {
                    filename,
                    page_number: page_num,
                    content: postprocess::clean_markdown(&outcome.content),
                    response_id: outcome.response_id,
                    tokens_used: outcome.total_tokens,
                    image_tokens_estimated: estimate.image_tokens,
                    usd_estimated: estimate.usd,
                })
            }
        }))
        .buffer_unordered(config.concurrency)
        .collect()
        .await;

    let mut pages: Vec<PageRecord> = Vec::new();
    let mut failures: Vec<ElementError> = Vec::new();
    for outcome in outcomes {
        match outcome {
            Ok(record) => pages.push(record),
            Err(e) => {
                warn!("{e}");
                failures.push(e);
            }
        }
    }

    if pages.is_empty() {
        let first_error = failures
            .first()
            .map(ToString::to_string)
            .unwrap_or_else(|| "unknown error".to_string());
        return Err(DocmarkError::AllPagesFailed {
            total: total_pages,
            retries: config.max_retries,
            first_error,
        });
    }

    // Concurrent completion order is arbitrary; the JSON contract is
    // page order.
    pages.sort_by_key(|p| p.page_number);

    // ── Persist the ordered JSON ─────────────────────────────────────────
    let mut dir = output_dir
        .map(Path::to_path_buf)
        .or_else(|| input_path.parent().map(Path::to_path_buf))
        .unwrap_or_default();
    if dir.as_os_str().is_empty() {
        // A bare relative input like "report.pdf" has an empty parent.
        dir = std::path::PathBuf::from(".");
    }
    std::fs::create_dir_all(&dir).map_err(|e| DocmarkError::OutputWriteFailed {
        path: dir.clone(),
        source: e,
    })?;
    let json_path = dir.join(format!(
        "{}_output_{}_{}.json",
        name, model, config.detail
    ));
    let body = serde_json::to_vec_pretty(&pages)
        .map_err(|e| DocmarkError::Internal(format!("JSON serialisation failed: {e}")))?;
    write_atomic(&json_path, &body).await?;

    let stats = TranscribeStats {
        total_pages,
        processed_pages: pages.len(),
        failed_pages: failures.len(),
        total_tokens: pages.iter().map(|p| p.tokens_used).sum(),
        total_usd_estimated: round6(pages.iter().map(|p| p.usd_estimated).sum()),
        total_duration_ms: total_start.elapsed().as_millis() as u64,
        render_duration_ms,
    };

    info!(
        "transcription complete: {}/{} pages, ~${} estimated, {}ms total → {}",
        stats.processed_pages,
        stats.total_pages,
        stats.total_usd_estimated,
        stats.total_duration_ms,
        json_path.display()
    );

    Ok(TranscribeOutput {
        pages,
        failures,
        json_path,
        stats,
    })
}
