// ============================================================
// Layer 3 — Error Taxonomy
// ============================================================
// All failures the core can surface, as one typed enum.
//
// Every variant is a local validation failure detected before
// or at the start of the optimization loop — the caller never
// receives a partial image alongside an error. Non-finite
// values appearing mid-loop are NOT detected here; they simply
// propagate into the output (a known gap, kept on purpose so
// runs stay byte-for-byte reproducible with the reference
// behaviour).
//
// The surrounding layers translate these into user-facing
// messages; the core itself never prints or retries.
//
// Reference: Rust Book §9 (Error Handling)
//            thiserror crate documentation

use thiserror::Error;

/// Failures surfaced by the directory and the synthesis engine.
#[derive(Debug, Error)]
pub enum VisualizationError {
    /// The dotted path does not resolve to any catalogued layer.
    /// Resolution is exact-match only — no prefix or partial hits.
    #[error("layer '{0}' not found in the network")]
    LayerNotFound(String),

    /// A caller-supplied value is outside its valid range:
    /// non-positive image size or iteration count, a zero blur
    /// period, or a unit index at or beyond the layer's axis size.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// The tapped layer produced a tensor of a rank the unit
    /// selector cannot reduce (anything other than 2 or 4).
    #[error("layer '{path}' produced an unsupported rank-{rank} output")]
    UnsupportedLayerShape { path: String, rank: usize },
}

/// Shorthand used throughout the core layers.
pub type VizResult<T> = Result<T, VisualizationError>;
