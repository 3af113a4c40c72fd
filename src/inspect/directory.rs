// ============================================================
// Layer 4 — Layer Directory
// ============================================================
// The query surface over a LayerCatalog. Three operations,
// all pure, side-effect-free and synchronous:
//
//   list_layers()        → every path, sorted, duplicate-free
//   describe_layer(path) → metadata snapshot, None if unknown
//   list_units(path)     → the per-unit name list for one layer
//
// Naming convention for units, by layer kind:
//   Linear  → neuron_0, neuron_1, ...
//   Conv2d  → channel_0, channel_1, ...
//   others  → unit_0, ... (capped at 768 names)
//
// Note the asymmetry in unknown-path handling: describe_layer
// answers with None so callers can decide whether a miss is
// fatal, while list_units fails — a unit query against a layer
// that does not exist has no sensible empty answer, whereas a
// layer that merely HAS no units (a pool, a composite block)
// legitimately yields an empty list.
//
// Reference: Rust Book §8 (Vectors), §13 (Iterators)

use crate::domain::error::{VisualizationError, VizResult};
use crate::domain::layer::{LayerInfo, UNIT_NAME_CAP};
use crate::inspect::catalog::LayerCatalog;

/// Read-only view over one network's layer catalog.
pub struct LayerDirectory<'a> {
    catalog: &'a LayerCatalog,
}

impl<'a> LayerDirectory<'a> {
    pub fn new(catalog: &'a LayerCatalog) -> Self {
        Self { catalog }
    }

    /// Every addressable path, sorted lexicographically.
    /// Deterministic for a fixed network, never contains
    /// duplicates (the catalog rejects them at registration).
    pub fn list_layers(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .catalog
            .entries()
            .map(|e| e.path.clone())
            .collect();
        names.sort();
        names
    }

    /// Metadata for one layer, or None for an unknown path.
    pub fn describe_layer(&self, path: &str) -> Option<LayerInfo> {
        self.catalog.entry(path).map(LayerInfo::from)
    }

    /// Ordered unit names for one layer.
    ///
    /// The list length equals the layer's declared output-axis
    /// size (out_features / out_channels / weight leading dim as
    /// recorded at registration), except for the capped catch-all
    /// category. Layers without a unit axis yield an empty list.
    pub fn list_units(&self, path: &str) -> VizResult<Vec<String>> {
        let entry = self
            .catalog
            .entry(path)
            .ok_or_else(|| VisualizationError::LayerNotFound(path.to_string()))?;

        let axis = match entry.output_width {
            Some(width) => width,
            None => return Ok(Vec::new()),
        };

        let category = entry.kind.unit_category();
        let count = if entry.kind.is_capped() {
            axis.min(UNIT_NAME_CAP)
        } else {
            axis
        };

        Ok((0..count).map(|i| format!("{category}_{i}")).collect())
    }
}
