//! Padded fixed-window strategy.
//!
//! Every call resubmits the whole window: the sequence is right-padded to
//! `max_length` and scores are read at the last real position. No state
//! survives between calls.

use std::sync::Arc;
use std::time::Instant;

use super::adapter::extract_scores;
use super::backend::InferenceBackend;
use super::config::DecodeOptions;
use super::descriptor::FeatureNames;
use super::error::DecodeError;
use super::mask::{build_mask, MaskKind};
use super::shape::ContextWindow;
use super::tensor::{FeatureMap, ScoreVector, TokenTensor};
use crate::telemetry;

pub struct PaddedWindowAdapter {
    engine: Arc<dyn InferenceBackend>,
    window: ContextWindow,
    names: FeatureNames,
    needs_attention_mask: bool,
}

impl std::fmt::Debug for PaddedWindowAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaddedWindowAdapter")
            .field("window", &self.window)
            .field("needs_attention_mask", &self.needs_attention_mask)
            .finish_non_exhaustive()
    }
}

impl PaddedWindowAdapter {
    pub fn new(engine: Arc<dyn InferenceBackend>, window: ContextWindow, names: FeatureNames) -> Self {
        let needs_attention_mask = engine.descriptor().has_input(&names.attention_mask);
        Self { engine, window, names, needs_attention_mask }
    }

    pub fn context_window(&self) -> ContextWindow {
        self.window
    }

    pub fn needs_attention_mask(&self) -> bool {
        self.needs_attention_mask
    }

    /// Assemble the fixed-width engine inputs for `tokens`.
    pub fn build_inputs(
        &self,
        tokens: &TokenTensor,
        options: &DecodeOptions,
    ) -> Result<FeatureMap, DecodeError> {
        let max = self.window.max_length();
        if tokens.is_empty() {
            return Err(DecodeError::precondition("token sequence is empty"));
        }
        if tokens.len() > max {
            return Err(DecodeError::precondition(format!(
                "token sequence of length {} exceeds context window {}",
                tokens.len(),
                max
            )));
        }

        let mut inputs = FeatureMap::new();
        inputs.insert(
            self.names.input_ids.clone(),
            tokens.padded_to(max, options.pad_token_id),
        );
        if self.needs_attention_mask {
            let mask = build_mask(&[1, max], MaskKind::Padding { valid_len: tokens.len() })?;
            inputs.insert(self.names.attention_mask.clone(), mask);
        }
        Ok(inputs)
    }

    /// Score the token following `tokens`.
    pub async fn predict_next_token_scores(
        &self,
        tokens: &TokenTensor,
        options: &DecodeOptions,
    ) -> Result<ScoreVector, DecodeError> {
        let inputs = self.build_inputs(tokens, options)?;
        tracing::debug!(
            length = tokens.len(),
            window = self.window.max_length(),
            "padded window prediction"
        );

        let started = Instant::now();
        let outputs = self.engine.predict(inputs, None).await.map_err(|e| {
            telemetry::record_engine_failure("padded");
            DecodeError::from(e)
        })?;
        telemetry::record_prediction("padded", "window", started.elapsed());

        extract_scores(&outputs, &self.names.logits, tokens.len() - 1)
    }
}
