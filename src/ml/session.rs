// ============================================================
// Layer 5 — Vision Session
// ============================================================
// A caller-owned pairing of one loaded network and the device
// it evaluates on. The directory and the synthesis engine are
// both handed this object explicitly — there is no process-wide
// model or device singleton anywhere in the crate.
//
// The session is read-only once built: the network is never
// mutated, so one session can back any number of sequential or
// parallel synthesis runs (each run owns its own image tensor
// and optimizer state).
//
// Reference: Rust Book §10 (Generics and Trait Bounds)

use burn::tensor::backend::AutodiffBackend;

use crate::inspect::catalog::LayerCatalog;
use crate::inspect::directory::LayerDirectory;
use crate::ml::network::ObservableNetwork;

/// One loaded network plus its target device.
pub struct VisionSession<B, N>
where
    B: AutodiffBackend,
    N: ObservableNetwork<B>,
{
    network: N,
    device: B::Device,
}

impl<B, N> VisionSession<B, N>
where
    B: AutodiffBackend,
    N: ObservableNetwork<B>,
{
    pub fn new(network: N, device: B::Device) -> Self {
        Self { network, device }
    }

    pub fn network(&self) -> &N {
        &self.network
    }

    pub fn device(&self) -> &B::Device {
        &self.device
    }

    pub fn catalog(&self) -> &LayerCatalog {
        self.network.catalog()
    }

    /// A directory view over this session's network.
    pub fn directory(&self) -> LayerDirectory<'_> {
        LayerDirectory::new(self.network.catalog())
    }
}
