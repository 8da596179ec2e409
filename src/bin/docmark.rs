//! CLI binary for docmark.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `ConversionConfig`/`VisionOptions` and prints results.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use docmark::{
    process_document, transcribe_document, ConversionConfig, Detail, PdfiumSource, VisionClient,
    VisionOptions,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Structured extraction: tables → CSV, pictures → PNG + descriptions
  docmark extract report.pdf -o output

  # Extraction without remote calls (no API key needed)
  docmark extract report.pdf -o output --no-describe

  # Full-page transcription with per-page cost estimates
  docmark transcribe report.pdf --model gpt-4.1 --detail high

  # Cheaper transcription, more parallel calls
  docmark transcribe report.pdf --model gpt-4.1-nano --concurrency 8

OUTPUT FILES (per document <name>):
  extract      <name>-table-<n>.csv   one per table, 1-indexed
               <name>-picture-<n>.png one per picture, 1-indexed
               <name>.md              assembled Markdown
  transcribe   <name>_output_<model>_<detail>.json

COST ESTIMATES:
  Transcription cost figures are derived from page pixel geometry
  (32 px patches, capped at 1536 image tokens, model-specific
  multipliers). They are approximations, never billing-accurate.

ENVIRONMENT VARIABLES:
  OPENAI_API_KEY   API credential; required unless --no-describe
  DOCMARK_MODEL    Override the default model
  PDFIUM_LIB_PATH  Path to an existing libpdfium
"#;

/// Convert PDF documents to structured Markdown.
#[derive(Parser, Debug)]
#[command(
    name = "docmark",
    version,
    about = "Convert PDF documents to structured Markdown",
    long_about = "Convert PDF documents to structured Markdown: extract tables to CSV and \
pictures to PNG with vision-model descriptions, or transcribe whole pages with a vision model.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "DOCMARK_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true, env = "DOCMARK_QUIET")]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract tables, pictures, and text into CSV/PNG/Markdown files.
    Extract {
        /// Local PDF file path.
        input: PathBuf,

        /// Output directory for CSV/PNG/Markdown files.
        #[arg(short, long, default_value = "output", env = "DOCMARK_OUTPUT_DIR")]
        output_dir: PathBuf,

        /// Skip vision-model picture descriptions (fully offline).
        #[arg(long)]
        no_describe: bool,

        /// Vision model used for picture descriptions.
        #[arg(long, default_value = "gpt-4o-mini", env = "DOCMARK_MODEL")]
        model: String,

        /// Max output tokens per description.
        #[arg(long, default_value_t = 300)]
        max_tokens: usize,

        /// Path to a text file containing a custom description prompt.
        #[arg(long)]
        prompt_file: Option<PathBuf>,

        /// Per-request timeout in seconds.
        #[arg(long, default_value_t = 60)]
        timeout: u64,

        /// Retries per description on transient API failure.
        #[arg(long, default_value_t = 3)]
        max_retries: u32,
    },

    /// Transcribe every page with a vision model into ordered JSON.
    Transcribe {
        /// Local PDF file path.
        input: PathBuf,

        /// Output directory for the JSON file (default: beside the input).
        #[arg(short, long, env = "DOCMARK_OUTPUT_DIR")]
        output_dir: Option<PathBuf>,

        /// Vision model used for page transcription.
        #[arg(long, default_value = "gpt-4.1", env = "DOCMARK_MODEL")]
        model: String,

        /// Image detail level: high or low.
        #[arg(long, value_enum, default_value = "high")]
        detail: DetailArg,

        /// Number of concurrent page calls.
        #[arg(short, long, default_value_t = 4, env = "DOCMARK_CONCURRENCY")]
        concurrency: usize,

        /// Max output tokens per page.
        #[arg(long, default_value_t = 4096)]
        max_tokens: usize,

        /// Maximum rendered page dimension in pixels.
        #[arg(long, default_value_t = 2000)]
        max_pixels: u32,

        /// Path to a text file containing a custom transcription prompt.
        #[arg(long)]
        prompt_file: Option<PathBuf>,

        /// Per-request timeout in seconds.
        #[arg(long, default_value_t = 60)]
        timeout: u64,

        /// Retries per page on transient API failure.
        #[arg(long, default_value_t = 3)]
        max_retries: u32,
    },
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum DetailArg {
    High,
    Low,
}

impl From<DetailArg> for Detail {
    fn from(v: DetailArg) -> Self {
        match v {
            DetailArg::High => Detail::High,
            DetailArg::Low => Detail::Low,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    match cli.command {
        Command::Extract {
            input,
            output_dir,
            no_describe,
            model,
            max_tokens,
            prompt_file,
            timeout,
            max_retries,
        } => {
            // Credentials are resolved before any document work; a missing
            // key fails here, not halfway through an extraction.
            let client = if no_describe {
                None
            } else {
                let mut options = VisionOptions::from_env()
                    .context("Picture descriptions need an API key (or pass --no-describe)")?
                    .with_model(model)
                    .with_max_tokens(max_tokens)
                    .with_timeout_secs(timeout);
                if let Some(ref path) = prompt_file {
                    let prompt = tokio::fs::read_to_string(path)
                        .await
                        .with_context(|| format!("Failed to read prompt from {path:?}"))?;
                    options = options.with_prompt(prompt);
                }
                Some(VisionClient::new(options).context("Failed to build vision client")?)
            };

            let config = ConversionConfig::builder()
                .describe_pictures(!no_describe)
                .max_retries(max_retries)
                .build()
                .context("Invalid configuration")?;

            let spinner = make_spinner(cli.quiet, "Extracting");
            let output = process_document(
                &input,
                &output_dir,
                &PdfiumSource::new(),
                client.as_ref(),
                &config,
            )
            .await
            .context("Extraction failed")?;
            spinner.finish_and_clear();

            if !cli.quiet {
                eprintln!(
                    "{} {}  {}",
                    green("✔"),
                    bold(&output.markdown_path.display().to_string()),
                    dim(&format!("{}ms", output.total_duration_ms)),
                );
                eprintln!(
                    "   {} tables  {} pictures ({} described)",
                    output.tables.len(),
                    output.images.len(),
                    output.described_pictures,
                );
                for failure in &output.failures {
                    eprintln!("   {} {}", cyan("⚠"), failure);
                }
            }
        }

        Command::Transcribe {
            input,
            output_dir,
            model,
            detail,
            concurrency,
            max_tokens,
            max_pixels,
            prompt_file,
            timeout,
            max_retries,
        } => {
            let options = VisionOptions::from_env()
                .context("Transcription needs an API key")?
                .with_model(model)
                .with_max_tokens(max_tokens)
                .with_timeout_secs(timeout);
            let client = VisionClient::new(options).context("Failed to build vision client")?;

            let mut builder = ConversionConfig::builder()
                .detail(detail.into())
                .concurrency(concurrency)
                .max_retries(max_retries)
                .max_rendered_pixels(max_pixels);
            if let Some(ref path) = prompt_file {
                let prompt = tokio::fs::read_to_string(path)
                    .await
                    .with_context(|| format!("Failed to read prompt from {path:?}"))?;
                builder = builder.transcription_prompt(prompt);
            }
            let config = builder.build().context("Invalid configuration")?;

            let spinner = make_spinner(cli.quiet, "Transcribing");
            let output = transcribe_document(&input, output_dir.as_deref(), &client, &config)
                .await
                .context("Transcription failed")?;
            spinner.finish_and_clear();

            if !cli.quiet {
                eprintln!(
                    "{} {}/{} pages  →  {}",
                    if output.stats.failed_pages == 0 {
                        green("✔")
                    } else {
                        cyan("⚠")
                    },
                    bold(&output.stats.processed_pages.to_string()),
                    output.stats.total_pages,
                    bold(&output.json_path.display().to_string()),
                );
                eprintln!(
                    "   {} tokens  ~${} estimated {}  {}",
                    dim(&output.stats.total_tokens.to_string()),
                    output.stats.total_usd_estimated,
                    dim("(approximate, not billing-accurate)"),
                    dim(&format!("{}ms", output.stats.total_duration_ms)),
                );
                for failure in &output.failures {
                    eprintln!("   {} {}", cyan("⚠"), failure);
                }
            }
        }
    }

    Ok(())
}

/// A steady-tick spinner while the pipeline runs; hidden in quiet mode.
fn make_spinner(quiet: bool, prefix: &str) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {elapsed}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]),
    );
    bar.set_prefix(prefix.to_string());
    bar.enable_steady_tick(Duration::from_millis(80));
    bar
}
