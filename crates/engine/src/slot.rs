use std::sync::{Arc, OnceLock};

use crate::engine::Corrector;

/// Process-wide holder for the loaded engine.
///
/// Starts empty while the model loads in the background and is filled
/// exactly once. Clones share the same slot.
#[derive(Clone, Default)]
pub struct EngineSlot {
    inner: Arc<OnceLock<Arc<dyn Corrector>>>,
}

impl EngineSlot {
    /// A slot with nothing installed yet.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A slot that already holds `engine`.
    pub fn loaded(engine: Arc<dyn Corrector>) -> Self {
        let slot = Self::default();
        let _ = slot.inner.set(engine);
        slot
    }

    /// Install the engine. Returns the rejected engine if one is already set.
    pub fn install(&self, engine: Arc<dyn Corrector>) -> Result<(), Arc<dyn Corrector>> {
        self.inner.set(engine)
    }

    pub fn get(&self) -> Option<Arc<dyn Corrector>> {
        self.inner.get().cloned()
    }

    pub fn is_loaded(&self) -> bool {
        self.inner.get().is_some()
    }
}
