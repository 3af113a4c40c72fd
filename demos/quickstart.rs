// ============================================================
// Quickstart — the whole pipeline in one sitting
// ============================================================
// Builds the bundled vision encoder, browses its layer
// catalog, then synthesizes one visualization with a progress
// readout. Run with:
//
//   cargo run --example quickstart

use anyhow::Result;
use neuron_viz::{
    FeatureSynthesizer, SynthesisConfig, UnitSelector, VisionEncoderConfig, VisionModel,
    VisionSession,
};

type Backend = burn::backend::Autodiff<burn::backend::NdArray>;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("neuron_viz=info".parse()?),
        )
        .init();

    // ── Build the network and its session ─────────────────────────────────────
    let device = Default::default();
    let model = VisionModel::<Backend>::new(&VisionEncoderConfig::new(16, 3, 128), &device)?;
    let session = VisionSession::new(model, device);

    // ── Browse the layer catalog ──────────────────────────────────────────────
    let directory = session.directory();
    let layers = directory.list_layers();
    println!("{} addressable layers:", layers.len());
    for name in &layers {
        if let Some(info) = directory.describe_layer(name) {
            println!("  {name}  ({}, {} params)", info.kind, info.parameter_count);
        }
    }

    let layer = "visual.blocks.1.conv2";
    let units = directory.list_units(layer)?;
    println!("\n'{layer}' has {} units; maximizing {}", units.len(), units[0]);

    // ── Synthesize one visualization ──────────────────────────────────────────
    let config = SynthesisConfig {
        image_size: 64,
        iterations: 200,
        learning_rate: 0.05,
        blur_every: 10,
        seed: Some(42),
    };

    let synthesizer = FeatureSynthesizer::new(&session);
    let image = synthesizer.generate(layer, UnitSelector::Index(0), &config, |p| {
        println!(
            "  iteration {:>4}/{} | activation {:+.4}",
            p.iteration, p.total, p.activation
        );
    })?;

    println!(
        "\nDone: {}x{} raster, {} bytes, first pixel {:?}",
        image.width(),
        image.height(),
        image.as_bytes().len(),
        image.pixel(0, 0),
    );
    Ok(())
}
