// ============================================================
// Layer 5 — Observation Port
// ============================================================
// The seam between the engine and any network it can drive.
//
// Instead of an ambient forward-hook mechanism, a network
// exposes the tap by construction: `forward_tapped` evaluates
// the forward sub-path up to AND INCLUDING the addressed layer
// and hands that layer's output straight back. Two things fall
// out of this design:
//   - downstream computation past the tap is never evaluated
//   - there is no installed tap state to leak; a failed call
//     leaves nothing behind and the next call starts clean
//
// The forward path up to the tap must stay differentiable —
// the engine differentiates the tapped scalar with respect to
// the input image, and only with respect to it.
//
// Reference: Rust Book §10 (Traits: Defining Shared Behaviour)
//            Burn Book §6 (Autodiff)

use burn::prelude::*;

use crate::domain::error::{VisualizationError, VizResult};
use crate::domain::selection::UnitSelector;
use crate::inspect::catalog::LayerCatalog;

// ─── TappedTensor ─────────────────────────────────────────────────────────────
/// The output captured at the addressed layer. Only rank-4
/// feature maps and rank-2 feature vectors can be reduced to a
/// unit scalar; rank-3 outputs (e.g. token sequences) are
/// carried so the engine can reject them with a precise error.
#[derive(Debug, Clone)]
pub enum TappedTensor<B: Backend> {
    Rank2(Tensor<B, 2>),
    Rank3(Tensor<B, 3>),
    Rank4(Tensor<B, 4>),
}

impl<B: Backend> TappedTensor<B> {
    pub fn rank(&self) -> usize {
        match self {
            TappedTensor::Rank2(_) => 2,
            TappedTensor::Rank3(_) => 3,
            TappedTensor::Rank4(_) => 4,
        }
    }
}

// ─── ObservableNetwork ────────────────────────────────────────────────────────
/// Any pre-trained network the engine can optimize against.
///
/// Implementations own a walk-once `LayerCatalog` (built when
/// the network is constructed) and evaluate their forward pass
/// with an early return at the addressed layer. The network is
/// never mutated — concurrent read-only evaluation must be safe.
pub trait ObservableNetwork<B: Backend> {
    /// The flat registry of addressable sub-components.
    fn catalog(&self) -> &LayerCatalog;

    /// Evaluate the forward sub-path up to and including `path`
    /// and return that layer's output. Fails with `LayerNotFound`
    /// when the path does not resolve.
    fn forward_tapped(&self, input: Tensor<B, 4>, path: &str) -> VizResult<TappedTensor<B>>;
}

// ─── Unit Activation ──────────────────────────────────────────────────────────
/// Reduce a tapped output to the selected unit's scalar.
///
/// Rank-4 (batch, channel, height, width): index or average the
/// channel axis, then average everything that remains.
/// Rank-2 (batch, feature): index or average the feature axis,
/// then average over the batch.
/// Any other rank is unsupported.
///
/// An index at or beyond the axis size fails — it is never
/// clamped into range.
pub fn unit_activation<B: Backend>(
    tapped: TappedTensor<B>,
    selector: UnitSelector,
    path: &str,
) -> VizResult<Tensor<B, 1>> {
    match tapped {
        TappedTensor::Rank4(output) => {
            let [batch, channels, height, width] = output.dims();
            match selector {
                UnitSelector::Index(unit) if unit >= channels => {
                    Err(out_of_range(unit, channels, path))
                }
                UnitSelector::Index(unit) => Ok(output
                    .slice([0..batch, unit..unit + 1, 0..height, 0..width])
                    .mean()),
                UnitSelector::Mean => Ok(output.mean()),
            }
        }
        TappedTensor::Rank2(output) => {
            let [batch, features] = output.dims();
            match selector {
                UnitSelector::Index(unit) if unit >= features => {
                    Err(out_of_range(unit, features, path))
                }
                UnitSelector::Index(unit) => {
                    Ok(output.slice([0..batch, unit..unit + 1]).mean())
                }
                UnitSelector::Mean => Ok(output.mean()),
            }
        }
        other => Err(VisualizationError::UnsupportedLayerShape {
            path: path.to_string(),
            rank: other.rank(),
        }),
    }
}

fn out_of_range(unit: usize, axis: usize, path: &str) -> VisualizationError {
    VisualizationError::InvalidParameter(format!(
        "unit index {unit} out of range for '{path}' (axis size {axis})"
    ))
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    fn device() -> <TestBackend as Backend>::Device {
        Default::default()
    }

    #[test]
    fn test_rank4_index_selects_one_channel() {
        // Two channels: all ones and all threes
        let ones = Tensor::<TestBackend, 4>::ones([1, 1, 2, 2], &device());
        let threes = Tensor::<TestBackend, 4>::ones([1, 1, 2, 2], &device()) * 3.0;
        let output = Tensor::cat(vec![ones, threes], 1);

        let a0 = unit_activation(TappedTensor::Rank4(output.clone()), UnitSelector::Index(0), "l")
            .unwrap()
            .into_scalar();
        let a1 = unit_activation(TappedTensor::Rank4(output), UnitSelector::Index(1), "l")
            .unwrap()
            .into_scalar();
        assert!((a0 - 1.0).abs() < 1e-6);
        assert!((a1 - 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_rank4_mean_averages_everything() {
        let ones = Tensor::<TestBackend, 4>::ones([1, 1, 2, 2], &device());
        let threes = Tensor::<TestBackend, 4>::ones([1, 1, 2, 2], &device()) * 3.0;
        let output = Tensor::cat(vec![ones, threes], 1);

        let a = unit_activation(TappedTensor::Rank4(output), UnitSelector::Mean, "l")
            .unwrap()
            .into_scalar();
        assert!((a - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_rank2_index_selects_one_feature() {
        let output = Tensor::<TestBackend, 2>::from_data([[1.0, 5.0, 9.0]], &device());
        let a = unit_activation(TappedTensor::Rank2(output), UnitSelector::Index(2), "l")
            .unwrap()
            .into_scalar();
        assert!((a - 9.0).abs() < 1e-6);
    }

    #[test]
    fn test_index_is_never_clamped() {
        let output = Tensor::<TestBackend, 2>::from_data([[1.0, 2.0]], &device());
        let result =
            unit_activation(TappedTensor::Rank2(output), UnitSelector::Index(2), "l");
        assert!(matches!(
            result,
            Err(VisualizationError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_rank3_is_unsupported() {
        let output = Tensor::<TestBackend, 3>::ones([1, 4, 8], &device());
        let result =
            unit_activation(TappedTensor::Rank3(output), UnitSelector::Index(0), "tokens");
        match result {
            Err(VisualizationError::UnsupportedLayerShape { path, rank }) => {
                assert_eq!(path, "tokens");
                assert_eq!(rank, 3);
            }
            other => panic!("expected UnsupportedLayerShape, got {other:?}"),
        }
    }
}
