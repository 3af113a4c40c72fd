// ============================================================
// Layer 3 — Layer Metadata
// ============================================================
// Describes the addressable sub-components of a network as
// plain data: what kind of layer sits at a path, how many
// learnable scalars it owns, and how wide its output axis is.
//
// These records are produced once, when a network registers
// itself into a LayerCatalog (Layer 4), and consumed by the
// LayerDirectory queries. Nothing here ever touches a tensor.
//
// Reference: Rust Book §5 (Structs), §6 (Enums)

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unit names for layers outside the dense/conv categories are
/// capped at this many entries to avoid pathological enumeration.
pub const UNIT_NAME_CAP: usize = 768;

// ─── LayerKind ────────────────────────────────────────────────────────────────
/// What kind of sub-component sits at a catalogued path.
///
/// The kind decides how the layer's units are named:
///   - `Linear`  → `neuron_<i>`
///   - `Conv2d`  → `channel_<i>`
///   - anything else with a unit axis → `unit_<i>` (capped)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LayerKind {
    /// A dense (fully connected) layer
    Linear,
    /// A 2D convolution
    Conv2d,
    /// A group normalisation layer
    GroupNorm,
    /// A 2D max pooling layer (no parameters, no unit axis)
    MaxPool2d,
    /// An adaptive average pooling layer (no parameters, no unit axis)
    AdaptiveAvgPool2d,
    /// A composite node owning child layers (e.g. a conv block)
    Composite,
    /// Any other component kind, carrying its type name
    Other(String),
}

impl LayerKind {
    /// The `<category>` half of a `<category>_<index>` unit name.
    pub fn unit_category(&self) -> &str {
        match self {
            LayerKind::Linear => "neuron",
            LayerKind::Conv2d => "channel",
            _ => "unit",
        }
    }

    /// True when unit enumeration for this kind is subject to the
    /// safety cap (everything outside the dense/conv categories).
    pub fn is_capped(&self) -> bool {
        !matches!(self, LayerKind::Linear | LayerKind::Conv2d)
    }
}

impl fmt::Display for LayerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayerKind::Linear => write!(f, "Linear"),
            LayerKind::Conv2d => write!(f, "Conv2d"),
            LayerKind::GroupNorm => write!(f, "GroupNorm"),
            LayerKind::MaxPool2d => write!(f, "MaxPool2d"),
            LayerKind::AdaptiveAvgPool2d => write!(f, "AdaptiveAvgPool2d"),
            LayerKind::Composite => write!(f, "Composite"),
            LayerKind::Other(name) => write!(f, "{name}"),
        }
    }
}

// ─── LayerEntry ───────────────────────────────────────────────────────────────
/// One registered sub-component of a network.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayerEntry {
    /// Dotted path from the network root, e.g. `visual.blocks.0.conv1`
    pub path: String,

    /// What kind of component this is
    pub kind: LayerKind,

    /// Learnable scalar count of the WHOLE subtree rooted here.
    /// A composite block therefore reports the sum of its children —
    /// the same convention as iterating a module's own parameters.
    pub parameter_count: usize,

    /// Size of the output axis units are indexed along:
    /// out_features for dense layers, out_channels for convolutions,
    /// the weight's leading dimension otherwise. `None` when the
    /// component has no unit axis at all (pools, composites).
    pub output_width: Option<usize>,
}

impl LayerEntry {
    pub fn new(
        path: impl Into<String>,
        kind: LayerKind,
        parameter_count: usize,
        output_width: Option<usize>,
    ) -> Self {
        Self {
            path: path.into(),
            kind,
            parameter_count,
            output_width,
        }
    }
}

// ─── LayerInfo ────────────────────────────────────────────────────────────────
/// The answer to a `describe_layer` query — a snapshot of one
/// entry, detached from the catalog so callers can hold onto it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayerInfo {
    pub path: String,
    pub kind: LayerKind,
    pub parameter_count: usize,
    pub output_width: Option<usize>,
}

impl From<&LayerEntry> for LayerInfo {
    fn from(entry: &LayerEntry) -> Self {
        Self {
            path: entry.path.clone(),
            kind: entry.kind.clone(),
            parameter_count: entry.parameter_count,
            output_width: entry.output_width,
        }
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_categories() {
        assert_eq!(LayerKind::Linear.unit_category(), "neuron");
        assert_eq!(LayerKind::Conv2d.unit_category(), "channel");
        assert_eq!(LayerKind::GroupNorm.unit_category(), "unit");
        assert_eq!(LayerKind::Other("Attention".into()).unit_category(), "unit");
    }

    #[test]
    fn test_cap_applies_outside_dense_and_conv() {
        assert!(!LayerKind::Linear.is_capped());
        assert!(!LayerKind::Conv2d.is_capped());
        assert!(LayerKind::GroupNorm.is_capped());
        assert!(LayerKind::Composite.is_capped());
    }

    #[test]
    fn test_display_matches_type_names() {
        assert_eq!(LayerKind::Conv2d.to_string(), "Conv2d");
        assert_eq!(LayerKind::Other("MultiHeadAttention".into()).to_string(),
                   "MultiHeadAttention");
    }
}
