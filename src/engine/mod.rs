//! Incremental decoding over a fixed-contract inference engine.
//!
//! Inspects the engine's declared shapes and cache state, selects a decoding
//! strategy, and turns a growing token sequence into next-token scores.

pub mod adapter;
pub mod backend;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod generate;
pub mod mask;
pub mod padded;
pub mod phase;
pub mod probe;
pub mod shape;
pub mod stateful;
pub mod tensor;

pub use adapter::DecodingAdapter;
pub use backend::{CacheHandle, InferenceBackend};
pub use config::{AdapterSettings, DecodeOptions};
pub use descriptor::{DimRange, EngineDescriptor, FeatureDescription, FeatureNames, ShapeConstraint};
pub use error::{DecodeError, EngineError};
pub use generate::{
    FinishReason, GenerationConfig, GenerationLoop, GenerationOutput, GreedySampler, TokenSampler,
};
pub use mask::{build_mask, MaskKind};
pub use padded::PaddedWindowAdapter;
pub use phase::{DecodePhase, DecodeState};
pub use probe::{probe_cache_capability, CacheCapability};
pub use shape::{inspect_context_window, ContextDefaults, ContextWindow, DEFAULT_FALLBACK_CONTEXT};
pub use stateful::StatefulCacheAdapter;
pub use tensor::{DataType, FeatureMap, MultiArray, ScoreVector, TensorData, TokenTensor};
