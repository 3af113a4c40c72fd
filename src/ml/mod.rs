// ============================================================
// Layer 5 — ML / Engine Layer (Burn)
// ============================================================
// This layer contains ALL Burn framework specific code.
// No other layer imports from burn directly — only this one.
//
// Why isolate Burn code here?
//   - If Burn's API changes, we only update this layer
//   - Directory queries and domain types stay testable
//     without a tensor backend
//   - The optimization math is clearly separated from
//     metadata handling and orchestration
//
// What's in this layer:
//
//   network.rs     — The observation-port seam
//                    The ObservableNetwork trait: a catalog of
//                    addressable layers plus a differentiable
//                    forward that stops at — and returns — the
//                    addressed layer's output. Also reduces a
//                    tapped tensor to the selected unit's scalar.
//
//   model.rs       — A small built-in vision encoder
//                    Conv stem, conv/norm/pool blocks, adaptive
//                    pool and a linear head, with every named
//                    sub-component registered at construction.
//
//   optimizer.rs   — Adam on the pixel tensor
//                    Running mean/variance with bias correction,
//                    stepping the image and nothing else.
//
//   image_ops.rs   — Image-space tensor operations
//                    Channel normalization, total variation,
//                    3x3 box blur, and the one-shot conversion
//                    to an 8-bit raster.
//
//   session.rs     — Caller-owned network + device pairing
//
//   synthesizer.rs — The activation-maximization loop
//                    Seeded init, forward-to-tap, backward,
//                    Adam step, regularization, periodic blur,
//                    clamp, progress signals, raster output.
//
// Reference: Burn Book §3 (Building Blocks)
//            Burn Book §6 (Autodiff)
//            Olah et al. (2017) Feature Visualization

/// The network observation seam and unit-activation reduction
pub mod network;

/// Built-in demo vision encoder with a registered layer catalog
pub mod model;

/// Adam optimizer state for the synthesized image
pub mod optimizer;

/// Normalization, total variation, blur, raster conversion
pub mod image_ops;

/// Caller-owned session: the network and its device
pub mod session;

/// The gradient-ascent synthesis engine
pub mod synthesizer;
