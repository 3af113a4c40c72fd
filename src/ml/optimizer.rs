// ============================================================
// Layer 5 — Adam on the Pixel Tensor
// ============================================================
// The optimization variable here is a raw image tensor, not a
// module, so Burn's module-oriented optimizers don't apply —
// the Adam update is stepped by hand with the textbook
// equations:
//
//   m = β1·m + (1-β1)·g          (running mean)
//   v = β2·v + (1-β2)·g²         (running variance)
//   m̂ = m / (1-β1ᵗ)              (bias correction)
//   v̂ = v / (1-β2ᵗ)
//   θ = θ - lr·m̂ / (√v̂ + ε)      (update)
//
// One optimizer instance belongs to exactly one synthesis run;
// state is never shared across runs or threads.
//
// Reference: Kingma & Ba (2015) Adam
//            Burn Book §5 (Training)

use burn::prelude::*;

const BETA_1: f64 = 0.9;
const BETA_2: f64 = 0.999;
const EPSILON: f64 = 1e-8;

/// Adam state for a single (1, 3, H, W) image tensor.
pub struct AdamPixelOptimizer<B: Backend> {
    learning_rate: f64,
    step_count: usize,
    mean: Tensor<B, 4>,
    variance: Tensor<B, 4>,
}

impl<B: Backend> AdamPixelOptimizer<B> {
    pub fn new(learning_rate: f64, shape: [usize; 4], device: &B::Device) -> Self {
        Self {
            learning_rate,
            step_count: 0,
            mean: Tensor::zeros(shape, device),
            variance: Tensor::zeros(shape, device),
        }
    }

    /// Apply one bias-corrected Adam step to `image` and return
    /// the updated tensor. `grad` is d(loss)/d(image).
    pub fn step(&mut self, image: Tensor<B, 4>, grad: Tensor<B, 4>) -> Tensor<B, 4> {
        self.step_count += 1;

        self.mean = self.mean.clone().mul_scalar(BETA_1)
            + grad.clone().mul_scalar(1.0 - BETA_1);
        self.variance = self.variance.clone().mul_scalar(BETA_2)
            + grad.powf_scalar(2.0).mul_scalar(1.0 - BETA_2);

        let bias_1 = 1.0 - BETA_1.powi(self.step_count as i32);
        let bias_2 = 1.0 - BETA_2.powi(self.step_count as i32);

        let mean_hat = self.mean.clone().div_scalar(bias_1);
        let variance_hat = self.variance.clone().div_scalar(bias_2);

        image - mean_hat.mul_scalar(self.learning_rate) / (variance_hat.sqrt().add_scalar(EPSILON))
    }

    /// Number of steps taken so far.
    pub fn step_count(&self) -> usize {
        self.step_count
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    fn scalar_image(value: f32) -> Tensor<TestBackend, 4> {
        Tensor::ones([1, 1, 1, 1], &Default::default()) * value
    }

    fn first_value(t: &Tensor<TestBackend, 4>) -> f32 {
        t.clone().into_data().to_vec::<f32>().unwrap()[0]
    }

    #[test]
    fn test_first_step_moves_by_learning_rate() {
        // With bias correction, step one reduces to lr·g/(|g|+ε),
        // so a unit gradient moves the pixel by almost exactly lr
        let mut adam = AdamPixelOptimizer::new(0.1, [1, 1, 1, 1], &Default::default());
        let updated = adam.step(scalar_image(0.0), scalar_image(1.0));
        assert!((first_value(&updated) + 0.1).abs() < 1e-4);
    }

    #[test]
    fn test_negative_gradient_ascends() {
        let mut adam = AdamPixelOptimizer::new(0.1, [1, 1, 1, 1], &Default::default());
        let updated = adam.step(scalar_image(0.0), scalar_image(-1.0));
        assert!(first_value(&updated) > 0.0);
    }

    #[test]
    fn test_state_persists_across_steps() {
        let mut adam = AdamPixelOptimizer::new(0.1, [1, 1, 1, 1], &Default::default());
        let mut image = scalar_image(0.0);
        for _ in 0..5 {
            image = adam.step(image, scalar_image(1.0));
        }
        assert_eq!(adam.step_count(), 5);
        // Five consistent unit gradients keep walking downhill
        assert!(first_value(&image) < -0.4);
    }
}
