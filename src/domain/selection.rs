// ============================================================
// Layer 3 — Unit Selection & Progress
// ============================================================
// Two small value types shared between the engine and its
// callers:
//
//   UnitSelector   — which scalar slot of a layer's output the
//                    engine should maximise. Picking no index
//                    degenerates to the mean over the whole
//                    unit axis.
//
//   ProgressSample — the periodic, purely observational signal
//                    emitted while the loop runs. It never
//                    influences the optimization and cannot
//                    stop it.
//
// Reference: Rust Book §6 (Enums and Pattern Matching)

use serde::{Deserialize, Serialize};

// ─── UnitSelector ─────────────────────────────────────────────────────────────
/// Addresses a single scalar-producing slot within a layer's
/// output: a channel of a conv map or a feature of a dense layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnitSelector {
    /// Average over the whole unit axis instead of indexing it
    Mean,
    /// A specific index into the unit axis.
    /// Must satisfy `0 <= index < axis size` — out-of-range
    /// selection fails, it is never clamped.
    Index(usize),
}

impl UnitSelector {
    /// The index, when one was selected.
    pub fn index(&self) -> Option<usize> {
        match self {
            UnitSelector::Mean => None,
            UnitSelector::Index(i) => Some(*i),
        }
    }
}

/// `None` means "no unit picked", i.e. the mean over the axis —
/// the same convention the optional neuron index had upstream.
impl From<Option<usize>> for UnitSelector {
    fn from(index: Option<usize>) -> Self {
        match index {
            Some(i) => UnitSelector::Index(i),
            None => UnitSelector::Mean,
        }
    }
}

// ─── ProgressSample ───────────────────────────────────────────────────────────
/// One periodic progress observation from a running synthesis.
/// Emitted roughly 20 times over a full run, in order, with
/// `iteration` strictly increasing and never above `total`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProgressSample {
    /// 1-based iteration index at the time of emission
    pub iteration: usize,

    /// Total number of iterations this run will execute
    pub total: usize,

    /// The scalar activation measured in the current iteration,
    /// before the optimizer step was applied
    pub activation: f64,
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selector_from_option() {
        assert_eq!(UnitSelector::from(None), UnitSelector::Mean);
        assert_eq!(UnitSelector::from(Some(7)), UnitSelector::Index(7));
    }

    #[test]
    fn test_selector_index_accessor() {
        assert_eq!(UnitSelector::Mean.index(), None);
        assert_eq!(UnitSelector::Index(3).index(), Some(3));
    }
}
