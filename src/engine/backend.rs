//! Seam between the decoding adapters and the opaque inference engine.

use std::any::Any;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use super::descriptor::EngineDescriptor;
use super::error::EngineError;
use super::tensor::FeatureMap;

static NEXT_HANDLE_ID: AtomicU64 = AtomicU64::new(1);

/// Opaque mutable engine state carried across prediction calls.
///
/// Each handle gets a process-unique id. Handles are not `Clone`: the adapter
/// that allocated one is its only owner.
pub struct CacheHandle {
    id: u64,
    payload: Box<dyn Any + Send + Sync>,
}

impl CacheHandle {
    /// Wrap engine-specific state in a fresh handle.
    pub fn new<T: Any + Send + Sync>(payload: T) -> Self {
        Self {
            id: NEXT_HANDLE_ID.fetch_add(1, Ordering::Relaxed),
            payload: Box::new(payload),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.payload.downcast_ref()
    }

    pub fn downcast_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.payload.downcast_mut()
    }
}

impl fmt::Debug for CacheHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheHandle").field("id", &self.id).finish_non_exhaustive()
    }
}

/// An inference engine with an introspectable tensor contract.
#[async_trait::async_trait]
pub trait InferenceBackend: Send + Sync {
    /// Declared inputs, outputs and state features.
    fn descriptor(&self) -> &EngineDescriptor;

    /// Allocate fresh mutable state for a new sequence.
    fn make_state(&self) -> Result<CacheHandle, EngineError>;

    /// Run one forward pass. When `state` is given the engine reads and
    /// updates it in place.
    async fn predict(
        &self,
        inputs: FeatureMap,
        state: Option<&mut CacheHandle>,
    ) -> Result<FeatureMap, EngineError>;
}
