// ============================================================
// Layer 5 — Built-in Vision Encoder
// ============================================================
// A small convolutional image encoder in the spirit of a CLIP
// visual tower: a conv stem, a stack of conv blocks, a global
// pool and a linear embedding head. It exists so the crate is
// usable end-to-end without any external weights — tests and
// the quickstart drive the engine against it, and it doubles
// as the reference implementation of ObservableNetwork.
//
// Loading real pre-trained models is deliberately not handled
// here; any caller-supplied network that implements the
// ObservableNetwork seam plugs into the same engine.
//
// Every named sub-component is registered into the layer
// catalog exactly once, at construction, as a dotted path
// under the `visual.` prefix (the root itself is not listed).
// Parameters are detached from gradient tracking right away —
// the engine only ever differentiates with respect to its
// input image.
//
// Reference: Burn Book §3 (Building Blocks)
//            Radford et al. (2021) CLIP

use anyhow::Result;
use burn::{
    nn::{
        conv::{Conv2d, Conv2dConfig},
        pool::{
            AdaptiveAvgPool2d, AdaptiveAvgPool2dConfig, MaxPool2d, MaxPool2dConfig,
        },
        GroupNorm, GroupNormConfig, Linear, LinearConfig, PaddingConfig2d,
    },
    prelude::*,
    tensor::activation::relu,
};

use crate::domain::error::{VisualizationError, VizResult};
use crate::domain::layer::{LayerEntry, LayerKind};
use crate::inspect::catalog::LayerCatalog;
use crate::ml::network::{ObservableNetwork, TappedTensor};

#[derive(Config, Debug)]
pub struct VisionEncoderConfig {
    /// Output channels of the stem convolution; each block
    /// doubles this
    pub base_width: usize,
    /// Number of conv blocks (each halves the spatial size)
    pub num_blocks: usize,
    /// Width of the final embedding head
    pub embed_dim: usize,
}

impl VisionEncoderConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> VisionEncoder<B> {
        let stem = Conv2dConfig::new([3, self.base_width], [3, 3])
            .with_padding(PaddingConfig2d::Explicit(1, 1))
            .init(device);

        let mut blocks = Vec::with_capacity(self.num_blocks);
        let mut channels = self.base_width;
        for _ in 0..self.num_blocks {
            blocks.push(build_block(channels, channels * 2, device));
            channels *= 2;
        }

        let pool = AdaptiveAvgPool2dConfig::new([1, 1]).init();
        let head = LinearConfig::new(channels, self.embed_dim).init(device);

        VisionEncoder { stem, blocks, pool, head }
    }
}

fn build_block<B: Backend>(
    in_channels: usize,
    out_channels: usize,
    device: &B::Device,
) -> ConvBlock<B> {
    let conv1 = Conv2dConfig::new([in_channels, out_channels], [3, 3])
        .with_padding(PaddingConfig2d::Explicit(1, 1))
        .init(device);
    let conv2 = Conv2dConfig::new([out_channels, out_channels], [3, 3])
        .with_padding(PaddingConfig2d::Explicit(1, 1))
        .init(device);
    // Group count must divide the channel count
    let groups = if out_channels % 4 == 0 { 4 } else { 1 };
    let norm = GroupNormConfig::new(groups, out_channels).init(device);
    let pool = MaxPool2dConfig::new([2, 2]).with_strides([2, 2]).init();
    ConvBlock { conv1, conv2, norm, pool }
}

#[derive(Module, Debug)]
pub struct ConvBlock<B: Backend> {
    pub conv1: Conv2d<B>,
    pub conv2: Conv2d<B>,
    pub norm:  GroupNorm<B>,
    pub pool:  MaxPool2d,
}

impl<B: Backend> ConvBlock<B> {
    pub fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        let x = relu(self.conv1.forward(x));
        let x = relu(self.conv2.forward(x));
        let x = self.norm.forward(x);
        self.pool.forward(x)
    }
}

#[derive(Module, Debug)]
pub struct VisionEncoder<B: Backend> {
    pub stem:   Conv2d<B>,
    pub blocks: Vec<ConvBlock<B>>,
    pub pool:   AdaptiveAvgPool2d,
    pub head:   Linear<B>,
}

impl<B: Backend> VisionEncoder<B> {
    /// input: [batch, 3, H, W] → embedding: [batch, embed_dim]
    pub fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 2> {
        let mut x = relu(self.stem.forward(x));
        for block in &self.blocks {
            x = block.forward(x);
        }
        let x = self.pool.forward(x);
        let x = x.flatten::<2>(1, 3);
        self.head.forward(x)
    }
}

// ─── VisionModel ──────────────────────────────────────────────────────────────
/// The encoder paired with its walk-once layer catalog.
pub struct VisionModel<B: Backend> {
    encoder: VisionEncoder<B>,
    catalog: LayerCatalog,
}

impl<B: Backend> VisionModel<B> {
    pub fn new(config: &VisionEncoderConfig, device: &B::Device) -> Result<Self> {
        // Freeze the parameters: the engine differentiates the
        // image, never the network
        let encoder = config.init::<B>(device).no_grad();
        let catalog = build_catalog(config, &encoder)?;
        tracing::debug!("Vision model ready: {} catalogued layers", catalog.len());
        Ok(Self { encoder, catalog })
    }

    pub fn encoder(&self) -> &VisionEncoder<B> {
        &self.encoder
    }
}

/// One walk over the encoder, registering every named
/// sub-component as a dotted path in execution order.
fn build_catalog<B: Backend>(
    config: &VisionEncoderConfig,
    encoder: &VisionEncoder<B>,
) -> Result<LayerCatalog> {
    let mut catalog = LayerCatalog::new();
    let mut channels = config.base_width;

    catalog.register(LayerEntry::new(
        "visual.stem",
        LayerKind::Conv2d,
        encoder.stem.num_params(),
        Some(channels),
    ))?;

    for (i, block) in encoder.blocks.iter().enumerate() {
        let out_channels = channels * 2;
        catalog.register(LayerEntry::new(
            format!("visual.blocks.{i}"),
            LayerKind::Composite,
            block.num_params(),
            None,
        ))?;
        catalog.register(LayerEntry::new(
            format!("visual.blocks.{i}.conv1"),
            LayerKind::Conv2d,
            block.conv1.num_params(),
            Some(out_channels),
        ))?;
        catalog.register(LayerEntry::new(
            format!("visual.blocks.{i}.conv2"),
            LayerKind::Conv2d,
            block.conv2.num_params(),
            Some(out_channels),
        ))?;
        catalog.register(LayerEntry::new(
            format!("visual.blocks.{i}.norm"),
            LayerKind::GroupNorm,
            block.norm.num_params(),
            Some(out_channels),
        ))?;
        catalog.register(LayerEntry::new(
            format!("visual.blocks.{i}.pool"),
            LayerKind::MaxPool2d,
            0,
            None,
        ))?;
        channels = out_channels;
    }

    catalog.register(LayerEntry::new(
        "visual.pool",
        LayerKind::AdaptiveAvgPool2d,
        0,
        None,
    ))?;
    catalog.register(LayerEntry::new(
        "visual.head",
        LayerKind::Linear,
        encoder.head.num_params(),
        Some(config.embed_dim),
    ))?;

    Ok(catalog)
}

impl<B: Backend> ObservableNetwork<B> for VisionModel<B> {
    fn catalog(&self) -> &LayerCatalog {
        &self.catalog
    }

    /// Forward with an early return at the addressed layer.
    /// Conv taps capture the convolution's own output, before
    /// the activation function — the same thing a forward hook
    /// on that module would have seen.
    fn forward_tapped(&self, input: Tensor<B, 4>, path: &str) -> VizResult<TappedTensor<B>> {
        if !self.catalog.contains(path) {
            return Err(VisualizationError::LayerNotFound(path.to_string()));
        }

        let x = self.encoder.stem.forward(input);
        if path == "visual.stem" {
            return Ok(TappedTensor::Rank4(x));
        }
        let mut x = relu(x);

        for (i, block) in self.encoder.blocks.iter().enumerate() {
            let prefix = format!("visual.blocks.{i}");

            let pre = block.conv1.forward(x);
            if path == format!("{prefix}.conv1") {
                return Ok(TappedTensor::Rank4(pre));
            }
            let a = relu(pre);

            let pre = block.conv2.forward(a);
            if path == format!("{prefix}.conv2") {
                return Ok(TappedTensor::Rank4(pre));
            }
            let a = relu(pre);

            let normed = block.norm.forward(a);
            if path == format!("{prefix}.norm") {
                return Ok(TappedTensor::Rank4(normed));
            }

            let pooled = block.pool.forward(normed);
            if path == format!("{prefix}.pool") || path == prefix {
                return Ok(TappedTensor::Rank4(pooled));
            }
            x = pooled;
        }

        let x = self.encoder.pool.forward(x);
        if path == "visual.pool" {
            return Ok(TappedTensor::Rank4(x));
        }

        let x = x.flatten::<2>(1, 3);
        let x = self.encoder.head.forward(x);
        if path == "visual.head" {
            return Ok(TappedTensor::Rank2(x));
        }

        // Catalogued but unreachable in the walk above — a bug in
        // the registration, surfaced rather than swallowed
        Err(VisualizationError::LayerNotFound(path.to_string()))
    }
}
