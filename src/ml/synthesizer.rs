// ============================================================
// Layer 5 — Feature Synthesizer
// ============================================================
// The activation-maximization loop. Given a resolved layer
// path, a unit selector and a run configuration, it ascends
// the gradient of the unit's activation with respect to a
// synthetic image, regularizes, and returns the final raster.
//
// Per-iteration order (load-bearing, do not reorder):
//   1. normalize the image with the network's channel stats
//   2. forward up to the tapped layer (differentiable)
//   3. reduce the tap to the selected unit's scalar
//   4. loss = -activation; backward; Adam step on the image
//   5. subtract 0.01 x totalVariation(image) from every pixel
//   6. every blur_every iterations (1-indexed): 3x3 box blur
//   7. clamp to [-2, 2]
// Steps 5-7 run outside the autodiff graph. The loop executes
// exactly `iterations` times — there is no convergence-based
// early exit, and the progress callback cannot stop it.
//
// Known gaps, kept deliberately: non-finite values appearing
// mid-loop are not detected (they propagate into the output),
// and there is no cancellation primitive.
//
// Reference: Burn Book §6 (Autodiff)
//            Olah et al. (2017) Feature Visualization
//            Kingma & Ba (2015) Adam

use burn::prelude::*;
use burn::tensor::backend::AutodiffBackend;
use rand::{rngs::StdRng, Rng, SeedableRng};
use rand_distr::StandardNormal;

use crate::application::visualize_use_case::SynthesisConfig;
use crate::domain::error::{VisualizationError, VizResult};
use crate::domain::raster::RasterImage;
use crate::domain::selection::{ProgressSample, UnitSelector};
use crate::ml::image_ops;
use crate::ml::network::{unit_activation, ObservableNetwork};
use crate::ml::optimizer::AdamPixelOptimizer;
use crate::ml::session::VisionSession;

/// How many progress signals a full run aims to emit.
const PROGRESS_SIGNALS: usize = 20;

/// Post-normalization search space bound for every pixel.
const PIXEL_BOUND: f64 = 2.0;

/// Weight of the scalar total-variation penalty.
const TV_WEIGHT: f64 = 0.01;

/// Runs activation maximization against one session's network.
pub struct FeatureSynthesizer<'s, B, N>
where
    B: AutodiffBackend,
    N: ObservableNetwork<B>,
{
    session: &'s VisionSession<B, N>,
}

impl<'s, B, N> FeatureSynthesizer<'s, B, N>
where
    B: AutodiffBackend,
    N: ObservableNetwork<B>,
{
    pub fn new(session: &'s VisionSession<B, N>) -> Self {
        Self { session }
    }

    /// Synthesize the image that maximally activates `selector`
    /// at `layer_path`. Deterministic for a fixed seed, network
    /// and configuration.
    pub fn generate<F>(
        &self,
        layer_path: &str,
        selector: UnitSelector,
        config: &SynthesisConfig,
        mut on_progress: F,
    ) -> VizResult<RasterImage>
    where
        F: FnMut(ProgressSample),
    {
        validate_config(config)?;

        // Observation setup: resolve the path once, before the
        // loop. With the explicit-port design nothing is ever
        // "installed", so a failure here leaves no state behind.
        let entry = self
            .session
            .catalog()
            .entry(layer_path)
            .ok_or_else(|| VisualizationError::LayerNotFound(layer_path.to_string()))?;

        // Reject an out-of-range unit before any work happens,
        // whenever the catalog declares the axis size. Networks
        // that leave it undeclared are still checked against the
        // tapped tensor inside the loop.
        if let (UnitSelector::Index(unit), Some(width)) = (selector, entry.output_width) {
            if unit >= width {
                return Err(VisualizationError::InvalidParameter(format!(
                    "unit index {unit} out of range for '{layer_path}' (axis size {width})"
                )));
            }
        }

        let size = config.image_size;
        let device = self.session.device().clone();
        tracing::debug!(
            "Synthesizing {size}x{size} image for '{layer_path}' over {} iterations",
            config.iterations,
        );

        // Seeded N(0,1) start, drawn on the host so the seed
        // alone fixes the starting point for any backend
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let noise: Vec<f32> = (0..3 * size * size)
            .map(|_| rng.sample::<f32, _>(StandardNormal))
            .collect();
        let mut image: Tensor<B::InnerBackend, 4> =
            Tensor::from_data(TensorData::new(noise, [1, 3, size, size]), &device);

        let mut optimizer: AdamPixelOptimizer<B::InnerBackend> =
            AdamPixelOptimizer::new(config.learning_rate, [1, 3, size, size], &device);
        let report_every = (config.iterations / PROGRESS_SIGNALS).max(1);

        for iteration in 0..config.iterations {
            // Lift the pixels into the autodiff graph. The image
            // is the only gradient root; the network's parameters
            // are frozen and never updated.
            let pixels = Tensor::<B, 4>::from_inner(image.clone()).require_grad();
            let normalized = image_ops::normalize(pixels.clone());

            let tapped = self
                .session
                .network()
                .forward_tapped(normalized, layer_path)?;
            let activation = unit_activation(tapped, selector, layer_path)?;
            let activation_value = activation.clone().into_scalar().elem::<f64>();

            // Ascend by descending the negated activation
            let loss = activation.neg();
            let grads = loss.backward();
            let grad = pixels.grad(&grads).ok_or_else(|| {
                VisualizationError::InvalidParameter(format!(
                    "no gradient path from '{layer_path}' back to the image"
                ))
            })?;

            image = optimizer.step(image, grad);

            let tv = image_ops::total_variation(&image);
            image = image.sub_scalar(TV_WEIGHT * tv);

            if (iteration + 1) % config.blur_every == 0 {
                image = image_ops::box_blur(image);
            }

            image = image.clamp(-PIXEL_BOUND, PIXEL_BOUND);

            if (iteration + 1) % report_every == 0 {
                on_progress(ProgressSample {
                    iteration: iteration + 1,
                    total: config.iterations,
                    activation: activation_value,
                });
            }
        }

        // The one and only fixed-point conversion, after the loop
        // and outside gradient tracking
        image_ops::to_raster(image).ok_or_else(|| {
            VisualizationError::InvalidParameter(
                "backend returned a malformed raster buffer".to_string(),
            )
        })
    }
}

fn validate_config(config: &SynthesisConfig) -> VizResult<()> {
    if config.image_size == 0 {
        return Err(VisualizationError::InvalidParameter(
            "image size must be positive".to_string(),
        ));
    }
    if config.iterations == 0 {
        return Err(VisualizationError::InvalidParameter(
            "iteration count must be positive".to_string(),
        ));
    }
    if config.blur_every == 0 {
        return Err(VisualizationError::InvalidParameter(
            "blur period must be positive".to_string(),
        ));
    }
    Ok(())
}
