//! Configuration types for docmark runs.
//!
//! All run behaviour is controlled through [`ConversionConfig`], built via
//! its [`ConversionConfigBuilder`]. One struct holds every knob, so a config
//! can be cloned across tasks and logged whole. Remote-endpoint settings
//! live separately in [`crate::enrich::VisionOptions`] because they carry a
//! credential and are only required when enrichment or transcription is
//! actually used.

use crate::cost::Pricing;
use crate::error::DocmarkError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Configuration for a docmark processing run.
///
/// Built via [`ConversionConfig::builder()`] or using
/// [`ConversionConfig::default()`].
///
/// # Example
/// ```rust
/// use docmark::{ConversionConfig, Detail};
///
/// let config = ConversionConfig::builder()
///     .concurrency(8)
///     .detail(Detail::Low)
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct ConversionConfig {
    /// Maximum rendered page dimension (width or height) in pixels. Default: 2000.
    ///
    /// A safety cap: an A0 poster rendered without one could produce a
    /// 13 000 × 18 000 px image and exhaust memory. Either dimension is
    /// capped, scaling the other proportionally. The capped dimensions also
    /// feed the image-token cost estimate, so this knob bounds per-page cost.
    pub max_rendered_pixels: u32,

    /// Number of concurrent transcription API calls. Default: 4.
    ///
    /// Page calls are network-bound, not CPU-bound. The structured pipeline
    /// ignores this and always processes elements one at a time.
    pub concurrency: usize,

    /// Image detail level forwarded to the vision API. Default: [`Detail::High`].
    ///
    /// Also embedded in the transcription JSON output filename.
    pub detail: Detail,

    /// Maximum retry attempts on a transient API failure. Default: 3.
    ///
    /// Permanent errors (bad API key, 400) are not retried.
    pub max_retries: u32,

    /// Initial retry delay in milliseconds (exponential backoff). Default: 500.
    ///
    /// Doubles after each attempt: 500 ms → 1 s → 2 s.
    pub retry_backoff_ms: u64,

    /// Ask the vision API to describe extracted pictures. Default: true.
    ///
    /// When false the structured pipeline runs fully offline: pictures keep
    /// their extraction-time annotations if any, otherwise the sentinel
    /// description.
    pub describe_pictures: bool,

    /// Custom page-transcription prompt. If None, uses the built-in default.
    pub transcription_prompt: Option<String>,

    /// Token and rate constants for the cost estimate.
    pub pricing: Pricing,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            max_rendered_pixels: 2000,
            concurrency: 4,
            detail: Detail::default(),
            max_retries: 3,
            retry_backoff_ms: 500,
            describe_pictures: true,
            transcription_prompt: None,
            pricing: Pricing::default(),
        }
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn max_rendered_pixels(mut self, px: u32) -> Self {
        self.config.max_rendered_pixels = px.max(100);
        self
    }

    pub fn concurrency(mut self, n: usize) -> Self {
        self.config.concurrency = n.max(1);
        self
    }

    pub fn detail(mut self, detail: Detail) -> Self {
        self.config.detail = detail;
        self
    }

    pub fn max_retries(mut self, n: u32) -> Self {
        self.config.max_retries = n;
        self
    }

    pub fn retry_backoff_ms(mut self, ms: u64) -> Self {
        self.config.retry_backoff_ms = ms;
        self
    }

    pub fn describe_pictures(mut self, v: bool) -> Self {
        self.config.describe_pictures = v;
        self
    }

    pub fn transcription_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.transcription_prompt = Some(prompt.into());
        self
    }

    pub fn pricing(mut self, pricing: Pricing) -> Self {
        self.config.pricing = pricing;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, DocmarkError> {
        let c = &self.config;
        if c.concurrency == 0 {
            return Err(DocmarkError::InvalidConfig(
                "Concurrency must be ≥ 1".into(),
            ));
        }
        if c.max_rendered_pixels < 100 {
            return Err(DocmarkError::InvalidConfig(format!(
                "max_rendered_pixels must be ≥ 100, got {}",
                c.max_rendered_pixels
            )));
        }
        Ok(self.config)
    }
}

/// Image detail level requested from the vision API.
///
/// `High` lets GPT-4-class models use their full image tile budget; `Low`
/// forces a single overview tile and loses fine print. Embedded in the
/// transcription output filename so runs at different levels never collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Detail {
    /// Full tile budget (default). Required for small fonts and dense tables.
    #[default]
    High,
    /// Single overview tile. Cheaper, loses fine structure.
    Low,
}

impl Detail {
    /// The wire value sent to the API and used in output filenames.
    pub fn as_str(self) -> &'static str {
        match self {
            Detail::High => "high",
            Detail::Low => "low",
        }
    }
}

impl fmt::Display for Detail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
