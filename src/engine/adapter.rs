//! Strategy selection and the adapter facing the generation loop.
//!
//! The shape inspector and cache probe run once at load; the chosen variant
//! is fixed for the life of the session.

use std::sync::Arc;

use super::backend::InferenceBackend;
use super::config::{AdapterSettings, DecodeOptions};
use super::error::{DecodeError, EngineError};
use super::padded::PaddedWindowAdapter;
use super::probe::{probe_cache_capability, CacheCapability};
use super::shape::{inspect_context_window, ContextWindow};
use super::stateful::StatefulCacheAdapter;
use super::tensor::{FeatureMap, ScoreVector, TokenTensor};

/// Incremental decoding adapter, one per generation session.
#[derive(Debug)]
pub enum DecodingAdapter {
    Padded(PaddedWindowAdapter),
    Stateful(StatefulCacheAdapter),
}

impl DecodingAdapter {
    /// Inspect `engine` and build the matching adapter.
    ///
    /// # Errors
    /// `Configuration` for malformed descriptors or an unusable window, and
    /// `UnimplementedCapability` when the engine exposes an IO-based cache.
    pub fn load(
        engine: Arc<dyn InferenceBackend>,
        settings: &AdapterSettings,
    ) -> Result<Self, DecodeError> {
        let descriptor = engine.descriptor();
        let window = inspect_context_window(descriptor, &settings.features.input_ids, &settings.context)?;
        let capability = probe_cache_capability(descriptor, &settings.features)?;
        tracing::info!(
            min_length = window.min_length(),
            max_length = window.max_length(),
            %capability,
            "engine inspected"
        );

        let adapter = match capability {
            CacheCapability::None => Self::Padded(PaddedWindowAdapter::new(
                engine,
                window,
                settings.features.clone(),
            )),
            CacheCapability::Stateful => Self::Stateful(StatefulCacheAdapter::new(
                engine,
                window,
                settings.features.clone(),
            )?),
            CacheCapability::UnsupportedIoBased => {
                return Err(DecodeError::UnimplementedCapability(
                    "key/value caches exposed as engine inputs and outputs are not supported"
                        .into(),
                ))
            }
        };
        tracing::info!(variant = adapter.variant(), "decoding adapter selected");
        Ok(adapter)
    }

    pub fn variant(&self) -> &'static str {
        match self {
            Self::Padded(_) => "padded",
            Self::Stateful(_) => "stateful",
        }
    }

    pub fn context_window(&self) -> ContextWindow {
        match self {
            Self::Padded(a) => a.context_window(),
            Self::Stateful(a) => a.context_window(),
        }
    }

    /// Start an independent sequence. No-op for the padded strategy.
    pub fn reset_state(&mut self) -> Result<(), DecodeError> {
        match self {
            Self::Padded(_) => Ok(()),
            Self::Stateful(a) => a.reset(),
        }
    }

    /// Score the token following `tokens`. The caller never passes more
    /// than `context_window().max_length()` tokens.
    pub async fn predict_next_token_scores(
        &mut self,
        tokens: &TokenTensor,
        options: &DecodeOptions,
    ) -> Result<ScoreVector, DecodeError> {
        match self {
            Self::Padded(a) => a.predict_next_token_scores(tokens, options).await,
            Self::Stateful(a) => a.predict_next_token_scores(tokens).await,
        }
    }
}

/// Read the score vector at `position` from the engine's logits output.
pub(crate) fn extract_scores(
    outputs: &FeatureMap,
    logits_name: &str,
    position: usize,
) -> Result<ScoreVector, DecodeError> {
    let logits = outputs
        .get(logits_name)
        .ok_or_else(|| EngineError::MissingOutput(logits_name.to_string()))?;
    Ok(ScoreVector::new(logits.logits_row(position)?))
}
