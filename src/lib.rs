// ============================================================
// Layer 1 — Public API
// ============================================================
// neuron-viz synthesizes the image that maximally activates a
// chosen unit of a vision network — gradient ascent on the
// pixels of a seeded noise image, with total-variation and
// blur regularization, against any network that exposes the
// ObservableNetwork seam.
//
// The crate is a library: presentation concerns (CLIs, web
// routes, file output, progress rendering) belong to callers.
// A typical caller does:
//
//   let model   = VisionModel::new(&encoder_config, &device)?;
//   let session = VisionSession::new(model, device);
//   let layers  = session.directory().list_layers();
//   let image   = FeatureSynthesizer::new(&session)
//       .generate("visual.blocks.0.conv2",
//                 UnitSelector::Index(3),
//                 &SynthesisConfig::default(),
//                 |p| eprintln!("{}/{}", p.iteration, p.total))?;
//
// See demos/quickstart.rs for the runnable version.
//
// Reference: Rust Book §7 (Modules), §14 (Crates)

#![recursion_limit = "256"]

pub mod application;
pub mod domain;
pub mod inspect;
pub mod ml;

pub use application::visualize_use_case::{
    SynthesisConfig, UnitRange, VisualizationOutcome, VisualizeRequest, VisualizeUseCase,
};
pub use domain::error::{VisualizationError, VizResult};
pub use domain::layer::{LayerEntry, LayerInfo, LayerKind};
pub use domain::raster::RasterImage;
pub use domain::selection::{ProgressSample, UnitSelector};
pub use inspect::catalog::LayerCatalog;
pub use inspect::directory::LayerDirectory;
pub use ml::model::{VisionEncoder, VisionEncoderConfig, VisionModel};
pub use ml::network::{ObservableNetwork, TappedTensor};
pub use ml::session::VisionSession;
pub use ml::synthesizer::FeatureSynthesizer;
