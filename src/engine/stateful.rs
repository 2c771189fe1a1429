//! Prefill-then-extend strategy over an engine-managed cache.
//!
//! The first call after `reset` submits the whole prompt; every later call
//! submits only the newest token and relies on the cache for the rest.

use std::sync::Arc;
use std::time::Instant;

use super::adapter::extract_scores;
use super::backend::InferenceBackend;
use super::descriptor::FeatureNames;
use super::error::DecodeError;
use super::mask::{build_mask, MaskKind};
use super::phase::{DecodePhase, DecodeState};
use super::shape::ContextWindow;
use super::tensor::{FeatureMap, MultiArray, ScoreVector, TokenTensor};
use crate::telemetry;

pub struct StatefulCacheAdapter {
    engine: Arc<dyn InferenceBackend>,
    window: ContextWindow,
    names: FeatureNames,
    needs_attention_mask: bool,
    needs_causal_mask: bool,
    state: DecodeState,
}

impl std::fmt::Debug for StatefulCacheAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatefulCacheAdapter")
            .field("window", &self.window)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl StatefulCacheAdapter {
    /// Build the adapter. The engine must accept a flexible input length,
    /// otherwise prefill and extend cannot be told apart.
    pub fn new(
        engine: Arc<dyn InferenceBackend>,
        window: ContextWindow,
        names: FeatureNames,
    ) -> Result<Self, DecodeError> {
        if !window.is_flexible() {
            return Err(DecodeError::Configuration(format!(
                "stateful cache needs a flexible '{}' length, engine accepts {}..={}",
                names.input_ids,
                window.min_length(),
                window.max_length()
            )));
        }
        let descriptor = engine.descriptor();
        let needs_attention_mask = descriptor.has_input(&names.attention_mask);
        let needs_causal_mask = descriptor.has_input(&names.causal_mask);
        Ok(Self {
            engine,
            window,
            names,
            needs_attention_mask,
            needs_causal_mask,
            state: DecodeState::new(),
        })
    }

    pub fn context_window(&self) -> ContextWindow {
        self.window
    }

    pub fn phase(&self) -> DecodePhase {
        self.state.phase()
    }

    /// Id of the cache handle owned by this session, if any.
    pub fn cache_id(&self) -> Option<u64> {
        self.state.cache_id()
    }

    /// Allocate a fresh cache and return to prefill.
    pub fn reset(&mut self) -> Result<(), DecodeError> {
        let handle = self.engine.make_state()?;
        tracing::debug!(cache_id = handle.id(), "stateful cache reset");
        self.state.reset(handle);
        telemetry::record_reset();
        Ok(())
    }

    /// Score the token following `tokens`.
    pub async fn predict_next_token_scores(
        &mut self,
        tokens: &TokenTensor,
    ) -> Result<ScoreVector, DecodeError> {
        if tokens.is_empty() {
            return Err(DecodeError::precondition("token sequence is empty"));
        }
        if tokens.len() > self.window.max_length() {
            return Err(DecodeError::precondition(format!(
                "token sequence of length {} exceeds context window {}",
                tokens.len(),
                self.window.max_length()
            )));
        }

        let input_ids = select_input(tokens, self.state.phase());
        let input_len = input_ids.shape()[1];
        let inputs = self.build_inputs(input_ids, input_len)?;
        let phase = self.state.begin()?;
        tracing::debug!(%phase, input_len, total = tokens.len(), "stateful prediction");

        let started = Instant::now();
        let handle = self.state.cache_mut()?;
        let result = self.engine.predict(inputs, Some(handle)).await;
        self.state.finish(result.is_ok());

        let outputs = result.map_err(|e| {
            telemetry::record_engine_failure("stateful");
            DecodeError::from(e)
        })?;
        telemetry::record_prediction("stateful", phase.as_str(), started.elapsed());

        extract_scores(&outputs, &self.names.logits, input_len - 1)
    }

    // Both masks are all zeros with trailing shape [1, 1, 1, input_len + 1].
    // They do not restrict attention causally.
    fn build_inputs(
        &self,
        input_ids: MultiArray,
        input_len: usize,
    ) -> Result<FeatureMap, DecodeError> {
        let mut inputs = FeatureMap::new();
        inputs.insert(self.names.input_ids.clone(), input_ids);
        let mask_shape = [1, 1, 1, input_len + 1];
        if self.needs_attention_mask {
            inputs.insert(
                self.names.attention_mask.clone(),
                build_mask(&mask_shape, MaskKind::Zeros)?,
            );
        }
        if self.needs_causal_mask {
            inputs.insert(
                self.names.causal_mask.clone(),
                build_mask(&mask_shape, MaskKind::Zeros)?,
            );
        }
        Ok(inputs)
    }
}

/// Whole prompt while prefilling, only the final token afterwards.
fn select_input(tokens: &TokenTensor, phase: DecodePhase) -> MultiArray {
    match phase {
        DecodePhase::Prefilling => tokens.to_multi_array(),
        DecodePhase::Extending => {
            let last: TokenTensor = tokens.last().into_iter().collect();
            last.to_multi_array()
        }
    }
}
