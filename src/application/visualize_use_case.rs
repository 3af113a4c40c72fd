// ============================================================
// Layer 2 — VisualizeUseCase
// ============================================================
// Orchestrates a visualization request end to end:
//
//   Step 1: Resolve the layer          (Layer 4 - inspect)
//   Step 2: Name the selected unit     (Layer 4 - inspect)
//   Step 3: Run the synthesis loop     (Layer 5 - ml)
//   Step 4: Package the outcome
//
// The range variant repeats this for a (start, end, step)
// sweep of unit indices, offsetting the seed per unit so each
// image starts from its own noise. What happens to the images
// afterwards — encoding, saving, display — is the caller's
// business, not this layer's.
//
// Reference: Rust Book §13 (Iterators and Closures)

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use burn::tensor::backend::AutodiffBackend;

use crate::domain::error::VisualizationError;
use crate::domain::raster::RasterImage;
use crate::domain::selection::{ProgressSample, UnitSelector};
use crate::ml::network::ObservableNetwork;
use crate::ml::session::VisionSession;
use crate::ml::synthesizer::FeatureSynthesizer;

// ─── Synthesis Configuration ─────────────────────────────────────────────────
// All knobs for one optimization run. Serialisable so callers
// can persist or transport a run's parameters; immutable for
// the duration of the run; independent between runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynthesisConfig {
    /// Width and height of the synthesized image, in pixels
    pub image_size: usize,

    /// How many gradient-ascent iterations to run — the loop
    /// always executes exactly this many, with no early exit
    pub iterations: usize,

    /// Adam step size for the pixel updates
    pub learning_rate: f64,

    /// Apply the 3x3 box blur every this many iterations
    pub blur_every: usize,

    /// Seed for the starting noise. A fixed seed makes the run
    /// bit-for-bit reproducible; `None` draws from entropy.
    pub seed: Option<u64>,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            image_size: 224,
            iterations: 1000,
            learning_rate: 0.01,
            blur_every: 10,
            seed: Some(42),
        }
    }
}

// ─── Request / Outcome ───────────────────────────────────────────────────────
/// One visualization request: which layer, which unit, how.
#[derive(Debug, Clone)]
pub struct VisualizeRequest {
    /// Dotted layer path, e.g. `visual.blocks.0.conv2`
    pub layer: String,

    /// Unit index within the layer's output axis;
    /// `None` maximizes the mean over the whole axis
    pub unit: Option<usize>,

    pub config: SynthesisConfig,
}

/// What a completed run hands back to the caller.
#[derive(Debug, Clone)]
pub struct VisualizationOutcome {
    pub layer: String,

    /// The human-readable unit name (`channel_3`, `neuron_12`),
    /// when a unit was selected and the layer names its units
    pub unit_name: Option<String>,

    /// The activation measured at the last progress signal
    pub final_activation: f64,

    pub image: RasterImage,
}

/// A `(start, end, step)` sweep over unit indices. The end is
/// clipped to the layer's axis size before iterating.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct UnitRange {
    pub start: usize,
    pub end: usize,
    pub step: usize,
}

// ─── VisualizeUseCase ────────────────────────────────────────────────────────
/// Owns a session and coordinates directory + engine for it.
pub struct VisualizeUseCase<B, N>
where
    B: AutodiffBackend,
    N: ObservableNetwork<B>,
{
    session: VisionSession<B, N>,
}

impl<B, N> VisualizeUseCase<B, N>
where
    B: AutodiffBackend,
    N: ObservableNetwork<B>,
{
    pub fn new(session: VisionSession<B, N>) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &VisionSession<B, N> {
        &self.session
    }

    /// Run one visualization end to end.
    pub fn execute<F>(
        &self,
        request: &VisualizeRequest,
        mut on_progress: F,
    ) -> Result<VisualizationOutcome>
    where
        F: FnMut(ProgressSample),
    {
        let directory = self.session.directory();

        // ── Step 1: Resolve the layer through the directory ──────────────────
        let info = directory
            .describe_layer(&request.layer)
            .ok_or_else(|| VisualizationError::LayerNotFound(request.layer.clone()))?;
        tracing::info!(
            "Visualizing '{}' ({}, {} params)",
            info.path,
            info.kind,
            info.parameter_count,
        );

        // ── Step 2: Fetch the human-readable unit name ────────────────────────
        let unit_name = match request.unit {
            Some(index) => directory.list_units(&request.layer)?.get(index).cloned(),
            None => None,
        };

        // ── Step 3: Run the synthesis loop (Layer 5) ──────────────────────────
        let synthesizer = FeatureSynthesizer::new(&self.session);
        let mut final_activation = 0.0;
        let image = synthesizer.generate(
            &request.layer,
            UnitSelector::from(request.unit),
            &request.config,
            |sample| {
                final_activation = sample.activation;
                on_progress(sample);
            },
        )?;

        // ── Step 4: Package the outcome ───────────────────────────────────────
        Ok(VisualizationOutcome {
            layer: request.layer.clone(),
            unit_name,
            final_activation,
            image,
        })
    }

    /// Visualize a sweep of units in one layer. Each unit's run
    /// offsets the configured seed by its index, so every image
    /// starts from distinct (but reproducible) noise.
    pub fn execute_range(
        &self,
        layer: &str,
        range: &UnitRange,
        config: &SynthesisConfig,
    ) -> Result<Vec<VisualizationOutcome>> {
        if range.step == 0 {
            bail!("unit range step must be positive");
        }

        let units = self.session.directory().list_units(layer)?;
        // Clip the sweep to the layer's actual axis size
        let end = range.end.min(units.len());

        let mut outcomes = Vec::new();
        for unit in (range.start..end).step_by(range.step) {
            let mut run_config = config.clone();
            run_config.seed = config.seed.map(|base| base + unit as u64);

            let request = VisualizeRequest {
                layer: layer.to_string(),
                unit: Some(unit),
                config: run_config,
            };
            outcomes.push(self.execute(&request, |_| {})?);
        }

        tracing::info!(
            "Range sweep complete: {} units visualized in '{layer}'",
            outcomes.len(),
        );
        Ok(outcomes)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::model::{VisionEncoderConfig, VisionModel};
    use burn::backend::{Autodiff, NdArray};

    type TestBackend = Autodiff<NdArray>;

    fn test_use_case() -> VisualizeUseCase<TestBackend, VisionModel<TestBackend>> {
        let device = Default::default();
        let model =
            VisionModel::new(&VisionEncoderConfig::new(2, 1, 8), &device).unwrap();
        VisualizeUseCase::new(VisionSession::new(model, device))
    }

    fn quick_config() -> SynthesisConfig {
        SynthesisConfig {
            image_size: 8,
            iterations: 6,
            learning_rate: 0.05,
            blur_every: 5,
            seed: Some(42),
        }
    }

    #[test]
    fn test_config_defaults_match_reference_run() {
        let config = SynthesisConfig::default();
        assert_eq!(config.image_size, 224);
        assert_eq!(config.iterations, 1000);
        assert!((config.learning_rate - 0.01).abs() < 1e-12);
        assert_eq!(config.blur_every, 10);
        assert_eq!(config.seed, Some(42));
    }

    #[test]
    fn test_config_serde_roundtrip() {
        let config = SynthesisConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: SynthesisConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.image_size, config.image_size);
        assert_eq!(parsed.seed, config.seed);
    }

    #[test]
    fn test_execute_names_the_unit() {
        let use_case = test_use_case();
        let request = VisualizeRequest {
            layer: "visual.stem".to_string(),
            unit: Some(1),
            config: quick_config(),
        };

        let outcome = use_case.execute(&request, |_| {}).unwrap();
        assert_eq!(outcome.layer, "visual.stem");
        assert_eq!(outcome.unit_name.as_deref(), Some("channel_1"));
        assert_eq!(outcome.image.as_bytes().len(), 8 * 8 * 3);
    }

    #[test]
    fn test_execute_mean_has_no_unit_name() {
        let use_case = test_use_case();
        let request = VisualizeRequest {
            layer: "visual.head".to_string(),
            unit: None,
            config: quick_config(),
        };

        let outcome = use_case.execute(&request, |_| {}).unwrap();
        assert_eq!(outcome.unit_name, None);
    }

    #[test]
    fn test_execute_forwards_progress() {
        let use_case = test_use_case();
        let request = VisualizeRequest {
            layer: "visual.stem".to_string(),
            unit: Some(0),
            config: quick_config(),
        };

        let mut count = 0;
        let outcome = use_case.execute(&request, |_| count += 1).unwrap();
        assert_eq!(count, 6);
        assert!(outcome.final_activation.is_finite());
    }

    #[test]
    fn test_execute_unknown_layer_fails() {
        let use_case = test_use_case();
        let request = VisualizeRequest {
            layer: "visual.absent".to_string(),
            unit: None,
            config: quick_config(),
        };
        assert!(use_case.execute(&request, |_| {}).is_err());
    }

    #[test]
    fn test_range_is_clipped_to_axis_size() {
        let use_case = test_use_case();
        // The stem has 2 channels; a sweep asking for 0..10 gets 2
        let range = UnitRange { start: 0, end: 10, step: 1 };
        let outcomes = use_case
            .execute_range("visual.stem", &range, &quick_config())
            .unwrap();

        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[0].unit_name.as_deref(), Some("channel_0"));
        assert_eq!(outcomes[1].unit_name.as_deref(), Some("channel_1"));
    }

    #[test]
    fn test_range_steps_over_units() {
        let use_case = test_use_case();
        // The head has 8 neurons; 0..8 step 4 visits 0 and 4
        let range = UnitRange { start: 0, end: 8, step: 4 };
        let outcomes = use_case
            .execute_range("visual.head", &range, &quick_config())
            .unwrap();

        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[0].unit_name.as_deref(), Some("neuron_0"));
        assert_eq!(outcomes[1].unit_name.as_deref(), Some("neuron_4"));
    }

    #[test]
    fn test_range_offsets_the_seed_per_unit() {
        let use_case = test_use_case();
        let range = UnitRange { start: 0, end: 2, step: 1 };
        let outcomes = use_case
            .execute_range("visual.stem", &range, &quick_config())
            .unwrap();
        // Different seeds (42, 43) start from different noise
        assert_ne!(
            outcomes[0].image.as_bytes(),
            outcomes[1].image.as_bytes()
        );
    }

    #[test]
    fn test_range_zero_step_fails() {
        let use_case = test_use_case();
        let range = UnitRange { start: 0, end: 2, step: 0 };
        assert!(use_case
            .execute_range("visual.stem", &range, &quick_config())
            .is_err());
    }
}
