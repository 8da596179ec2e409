//! Image-token and dollar-cost estimation for vision API calls.
//!
//! Vision providers bill images by token, and image token counts derive from
//! pixel dimensions: the image is partitioned into fixed-size square patches
//! and each patch costs one token, up to a provider-side maximum. Model
//! variants then scale the raw patch count by an empirical multiplier before
//! applying a per-1000-token rate.
//!
//! Every number here is an approximation tied to observed provider behaviour,
//! never billing-accurate. The constants live in [`Pricing`] with a
//! [`Default`] rather than as module consts so deployments can re-tune them
//! when the provider changes its accounting.

use serde::{Deserialize, Serialize};

/// Token accounting and rate constants for the estimate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pricing {
    /// Square patch edge in pixels.
    pub patch_size: u32,
    /// Provider cap on billable image tokens, applied before any multiplier.
    pub max_image_tokens: u64,
    /// USD per 1000 tokens used when the model is not listed.
    pub default_rate_per_1k: f64,
    /// Per-model multiplier and rate entries.
    pub models: Vec<ModelRate>,
}

/// Empirical accounting constants for one model variant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelRate {
    /// Model identifier as sent to the API.
    pub id: String,
    /// Scale applied to the capped patch count; truncates toward zero.
    pub multiplier: f64,
    /// USD per 1000 adjusted tokens.
    pub rate_per_1k: f64,
}

impl Default for Pricing {
    fn default() -> Self {
        Self {
            patch_size: 32,
            max_image_tokens: 1536,
            default_rate_per_1k: 0.0005,
            models: vec![
                ModelRate {
                    id: "gpt-4.1".into(),
                    multiplier: 1.0,
                    rate_per_1k: 0.0005,
                },
                ModelRate {
                    id: "gpt-4.1-mini".into(),
                    multiplier: 1.62,
                    rate_per_1k: 0.0001,
                },
                ModelRate {
                    id: "gpt-4.1-nano".into(),
                    multiplier: 2.46,
                    rate_per_1k: 0.000025,
                },
            ],
        }
    }
}

/// An estimated token count and dollar cost for one image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostEstimate {
    /// Image tokens after the model multiplier.
    pub image_tokens: u64,
    /// Approximate USD, rounded to 6 decimal places.
    pub usd: f64,
}

impl Pricing {
    /// Raw patch count for an image, capped at [`Pricing::max_image_tokens`].
    ///
    /// Patch counts per axis use ceiling division, so a 1×1 px image still
    /// occupies one patch while a 0-sized axis contributes zero.
    pub fn image_patches(&self, width_px: u32, height_px: u32) -> u64 {
        let per_axis = |px: u32| -> u64 { px.div_ceil(self.patch_size) as u64 };
        let patches = per_axis(width_px) * per_axis(height_px);
        patches.min(self.max_image_tokens)
    }

    /// Estimate image tokens and USD cost for an image processed by `model`.
    ///
    /// The estimate is non-negative, monotonic in each pixel dimension, and
    /// zero for a zero-sized image. Unknown models use a ×1.0 multiplier and
    /// the default rate.
    pub fn estimate(&self, width_px: u32, height_px: u32, model: &str) -> CostEstimate {
        let patches = self.image_patches(width_px, height_px);

        let (multiplier, rate) = self
            .models
            .iter()
            .find(|m| m.id == model)
            .map(|m| (m.multiplier, m.rate_per_1k))
            .unwrap_or((1.0, self.default_rate_per_1k));

        let image_tokens = (patches as f64 * multiplier) as u64;
        let usd = round6(image_tokens as f64 / 1000.0 * rate);

        CostEstimate { image_tokens, usd }
    }
}

/// Round to 6 decimal places, the finest granularity worth reporting for
/// per-page fractions of a cent.
pub(crate) fn round6(v: f64) -> f64 {
    (v * 1_000_000.0).round() / 1_000_000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_sized_image_costs_nothing() {
        let pricing = Pricing::default();
        let est = pricing.estimate(0, 0, "gpt-4.1");
        assert_eq!(est.image_tokens, 0);
        assert_eq!(est.usd, 0.0);
    }

    #[test]
    fn one_pixel_occupies_one_patch() {
        let pricing = Pricing::default();
        assert_eq!(pricing.image_patches(1, 1), 1);
        assert_eq!(pricing.image_patches(32, 32), 1);
        assert_eq!(pricing.image_patches(33, 32), 2);
    }

    #[test]
    fn patch_count_is_capped_before_multiplier() {
        let pricing = Pricing::default();
        // 8192/32 = 256 patches per axis; 256*256 = 65536, far over the cap.
        assert_eq!(pricing.image_patches(8192, 8192), 1536);

        // The nano multiplier is applied to the capped count, so the token
        // estimate may exceed the cap while the raw patch count never does.
        let est = pricing.estimate(8192, 8192, "gpt-4.1-nano");
        assert_eq!(est.image_tokens, (1536.0 * 2.46) as u64);
    }

    #[test]
    fn estimate_is_monotonic_in_each_dimension() {
        let pricing = Pricing::default();
        let mut prev = 0u64;
        for w in [0, 10, 100, 500, 1000, 2000, 5000] {
            let est = pricing.estimate(w, 768, "gpt-4.1");
            assert!(est.image_tokens >= prev, "width {w} decreased the estimate");
            prev = est.image_tokens;
        }
        let mut prev = 0u64;
        for h in [0, 10, 100, 500, 1000, 2000, 5000] {
            let est = pricing.estimate(1024, h, "gpt-4.1");
            assert!(est.image_tokens >= prev, "height {h} decreased the estimate");
            prev = est.image_tokens;
        }
    }

    #[test]
    fn unknown_model_uses_default_rate() {
        let pricing = Pricing::default();
        let known = pricing.estimate(1024, 1024, "gpt-4.1");
        let unknown = pricing.estimate(1024, 1024, "some-future-model");
        assert_eq!(known.image_tokens, unknown.image_tokens);
        assert_eq!(known.usd, unknown.usd);
    }

    #[test]
    fn mini_multiplier_truncates() {
        let pricing = Pricing::default();
        // 1024/32 = 32 patches per axis → 1024 patches; 1024 * 1.62 = 1658.88
        let est = pricing.estimate(1024, 1024, "gpt-4.1-mini");
        assert_eq!(est.image_tokens, 1658);
    }

    #[test]
    fn cost_is_rounded_to_six_decimals() {
        let pricing = Pricing::default();
        // 1024 patches at the gpt-4.1 rate: 1024/1000 * 0.0005 = 0.000512
        let est = pricing.estimate(1024, 1024, "gpt-4.1");
        assert_eq!(est.usd, 0.000512);

        // nano: 1024 * 2.46 = 2519 tokens; 2.519 * 0.000025 = 0.000062975
        let est = pricing.estimate(1024, 1024, "gpt-4.1-nano");
        assert_eq!(est.usd, 0.000063);
    }
}
