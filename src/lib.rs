//! GG-Decode
//!
//! Incremental decoding adapter for inference engines with a rigid,
//! introspectable tensor contract. Callers see an unbounded, growing token
//! sequence; the engine sees either a padded fixed window per step or a
//! prefill followed by single-token extensions over an engine-managed cache.
//!
//! # Components
//!
//! - **Shape inspection**: derives the accepted context window from the
//!   declared token-id input.
//! - **Cache probe**: classifies cache support from paired state/IO features.
//! - **Adapters**: `PaddedWindowAdapter` and `StatefulCacheAdapter`, chosen
//!   once per session by `DecodingAdapter::load`.
//! - **Masks**: pure builders for the auxiliary mask inputs.
//!
//! Configuration errors fail at load. Nothing silently degrades to a
//! different strategy.

pub mod config;
pub mod engine;
pub mod models;
pub mod telemetry;

use std::sync::Arc;

use engine::{
    DecodeError, DecodeOptions, DecodingAdapter, GenerationConfig, GenerationLoop,
    InferenceBackend,
};
use models::ModelPackage;
use telemetry::LogError;

/// A decoding session bound to one engine: adapter, options and loop.
#[derive(Debug)]
pub struct Session {
    pub adapter: DecodingAdapter,
    pub options: DecodeOptions,
    pub generation: GenerationLoop,
}

impl Session {
    /// Select an adapter for `engine` using the package's settings and
    /// generation config. The engine must declare the package's descriptor.
    pub fn from_package(
        engine: Arc<dyn InferenceBackend>,
        package: &ModelPackage,
    ) -> Result<Self, DecodeError> {
        if engine.descriptor() != &package.descriptor {
            return Err(DecodeError::Configuration(format!(
                "engine contract does not match {} in {}",
                models::DESCRIPTOR_FILE,
                package.root().display()
            )));
        }
        let adapter = DecodingAdapter::load(engine, &package.settings)?;
        let generation = package.generation_config();
        Ok(Self {
            adapter,
            options: generation.decode,
            generation: GenerationLoop::new(generation),
        })
    }

    /// Select an adapter for `engine` using environment configuration.
    ///
    /// Also installs the `GG_DECODE_LOG_*` subscriber unless the host has
    /// already installed one.
    pub fn from_env(engine: Arc<dyn InferenceBackend>) -> Result<Self, DecodeError> {
        let env = config::load();
        match telemetry::init_logging(&env.log) {
            Ok(()) | Err(LogError::AlreadyInitialized) => {}
            Err(e) => return Err(DecodeError::Configuration(e.to_string())),
        }
        let adapter = DecodingAdapter::load(engine, &env.adapter)?;
        let generation = GenerationConfig {
            decode: env.decode,
            ..Default::default()
        };
        Ok(Self {
            adapter,
            options: env.decode,
            generation: GenerationLoop::new(generation),
        })
    }
}
