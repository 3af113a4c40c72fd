// ============================================================
// Layer 4 — Layer Catalog
// ============================================================
// An ordered map from dotted path names to layer metadata,
// built exactly once when a network is constructed.
//
// The map preserves registration order, which follows the
// network's forward execution order. Queries that need the
// lexicographic view (list_layers) sort on the way out, so
// the catalog can stay in the order taps are evaluated in.
//
// Resolution is exact-match only: a path either hits one
// entry or misses — there is no prefix matching and no
// silent fallback.
//
// Reference: indexmap crate documentation
//            Rust Book §8 (Hash Maps)

use anyhow::{bail, Result};
use indexmap::IndexMap;

use crate::domain::layer::LayerEntry;

/// The flat registry of a network's addressable sub-components.
#[derive(Debug, Clone, Default)]
pub struct LayerCatalog {
    entries: IndexMap<String, LayerEntry>,
}

impl LayerCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register one sub-component. Paths must be unique — a
    /// duplicate registration is a bug in the network's walk and
    /// is rejected rather than silently overwritten.
    pub fn register(&mut self, entry: LayerEntry) -> Result<()> {
        if self.entries.contains_key(&entry.path) {
            bail!("layer path '{}' registered twice", entry.path);
        }
        tracing::debug!(
            "Catalogued layer '{}' ({}, {} params)",
            entry.path,
            entry.kind,
            entry.parameter_count,
        );
        self.entries.insert(entry.path.clone(), entry);
        Ok(())
    }

    /// Exact-match lookup of one entry.
    pub fn entry(&self, path: &str) -> Option<&LayerEntry> {
        self.entries.get(path)
    }

    /// True when `path` resolves in this catalog.
    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    /// All entries in registration (forward execution) order.
    pub fn entries(&self) -> impl Iterator<Item = &LayerEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::layer::LayerKind;

    fn entry(path: &str) -> LayerEntry {
        LayerEntry::new(path, LayerKind::Conv2d, 10, Some(4))
    }

    #[test]
    fn test_registration_preserves_order() {
        let mut catalog = LayerCatalog::new();
        catalog.register(entry("visual.stem")).unwrap();
        catalog.register(entry("visual.blocks.0")).unwrap();
        catalog.register(entry("visual.head")).unwrap();

        let order: Vec<&str> = catalog.entries().map(|e| e.path.as_str()).collect();
        assert_eq!(order, ["visual.stem", "visual.blocks.0", "visual.head"]);
    }

    #[test]
    fn test_duplicate_path_is_rejected() {
        let mut catalog = LayerCatalog::new();
        catalog.register(entry("visual.stem")).unwrap();
        assert!(catalog.register(entry("visual.stem")).is_err());
        // The first registration survives untouched
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn test_lookup_is_exact_match_only() {
        let mut catalog = LayerCatalog::new();
        catalog.register(entry("visual.blocks.0.conv1")).unwrap();

        assert!(catalog.contains("visual.blocks.0.conv1"));
        assert!(!catalog.contains("visual.blocks.0"));
        assert!(!catalog.contains("visual.blocks.0.conv"));
        assert!(!catalog.contains(""));
    }
}
