// ============================================================
// Layer 5 — Image-Space Operations
// ============================================================
// The fixed tensor operations the synthesis loop applies to
// its image: channel normalization with the target network
// family's statistics, the total-variation smoothness penalty,
// the periodic 3x3 box blur, and the single end-of-run
// conversion to an 8-bit raster.
//
// The mean/std constants are the CLIP image statistics — the
// network family this visualizer was built around. They are
// baked in on purpose: the synthesized image lives in the
// normalized space the network was trained on, and the final
// raster must invert exactly the same transform.
//
// Reference: Burn Book §3 (Tensor Operations)
//            Radford et al. (2021) CLIP

use burn::prelude::*;
use burn::tensor::module::avg_pool2d;

use crate::domain::raster::RasterImage;

/// Per-channel mean of the target network's training images
pub const CHANNEL_MEAN: [f32; 3] = [0.481_454_66, 0.457_827_5, 0.408_210_73];

/// Per-channel standard deviation of the same statistics
pub const CHANNEL_STD: [f32; 3] = [0.268_629_54, 0.261_302_58, 0.275_777_11];

/// Broadcastable (1, 3, 1, 1) constant tensor for one statistic.
fn channel_tensor<B: Backend>(values: [f32; 3], device: &B::Device) -> Tensor<B, 4> {
    Tensor::<B, 1>::from_floats(values, device).reshape([1, 3, 1, 1])
}

/// Map pixel space into the network's normalized input space:
/// `(x - mean) / std`, per channel.
pub fn normalize<B: Backend>(image: Tensor<B, 4>) -> Tensor<B, 4> {
    let device = image.device();
    (image - channel_tensor(CHANNEL_MEAN, &device)) / channel_tensor(CHANNEL_STD, &device)
}

/// Invert `normalize`: `x * std + mean`, per channel.
pub fn denormalize<B: Backend>(image: Tensor<B, 4>) -> Tensor<B, 4> {
    let device = image.device();
    image * channel_tensor(CHANNEL_STD, &device) + channel_tensor(CHANNEL_MEAN, &device)
}

/// Mean absolute difference between horizontal neighbours plus
/// mean absolute difference between vertical neighbours. No
/// wraparound; a 1-pixel axis simply contributes nothing.
pub fn total_variation<B: Backend>(image: &Tensor<B, 4>) -> f64 {
    let [batch, channels, height, width] = image.dims();
    let mut tv = 0.0;

    if width > 1 {
        let right = image.clone().slice([0..batch, 0..channels, 0..height, 0..width - 1])
            - image.clone().slice([0..batch, 0..channels, 0..height, 1..width]);
        tv += right.abs().mean().into_scalar().elem::<f64>();
    }
    if height > 1 {
        let down = image.clone().slice([0..batch, 0..channels, 0..height - 1, 0..width])
            - image.clone().slice([0..batch, 0..channels, 1..height, 0..width]);
        tv += down.abs().mean().into_scalar().elem::<f64>();
    }

    tv
}

/// 3x3 box blur: average pooling with stride 1 and same-size
/// padding (padded positions count toward the average).
pub fn box_blur<B: Backend>(image: Tensor<B, 4>) -> Tensor<B, 4> {
    avg_pool2d(image, [3, 3], [1, 1], [1, 1], true)
}

/// The one-shot end-of-run conversion: denormalize, clamp to
/// [0, 1], scale to 8-bit, round, and interleave channel-last.
/// Returns `None` only if the backend hands back a malformed
/// buffer.
pub fn to_raster<B: Backend>(image: Tensor<B, 4>) -> Option<RasterImage> {
    let [_, _, height, width] = image.dims();

    let clamped = denormalize(image).clamp(0.0, 1.0);
    // (1, 3, H, W) → (1, H, W, 3), row-major interleaved RGB
    let interleaved = clamped.permute([0, 2, 3, 1]);

    let values: Vec<f32> = interleaved.into_data().convert::<f32>().to_vec().ok()?;
    let pixels: Vec<u8> = values.iter().map(|v| (v * 255.0).round() as u8).collect();

    RasterImage::new(width, height, pixels)
}
