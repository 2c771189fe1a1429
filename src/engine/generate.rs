//! Generation loop driver.
//!
//! Repeatedly asks the adapter for next-token scores, lets a caller-supplied
//! sampler pick a token, and stops on EOS, on the token budget, or when the
//! sequence no longer fits the engine's context window.

use tracing::Instrument;

use super::adapter::DecodingAdapter;
use super::config::DecodeOptions;
use super::error::{DecodeError, EngineError};
use super::tensor::{ScoreVector, TokenTensor};
use crate::models::ModelConfig;
use crate::telemetry::{DecodeSpan, SpanExt};

/// Picks the next token from a score vector.
pub trait TokenSampler: Send {
    fn sample(&mut self, scores: &ScoreVector) -> Result<i32, DecodeError>;
}

/// Always picks the highest score.
#[derive(Debug, Clone, Copy, Default)]
pub struct GreedySampler;

impl TokenSampler for GreedySampler {
    fn sample(&mut self, scores: &ScoreVector) -> Result<i32, DecodeError> {
        let (index, _) = scores.argmax().ok_or_else(|| {
            EngineError::MalformedOutput("score vector has no finite entries".into())
        })?;
        i32::try_from(index).map_err(|_| {
            DecodeError::from(EngineError::MalformedOutput(format!(
                "token index {} does not fit an i32",
                index
            )))
        })
    }
}

/// Reason why generation finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishReason {
    /// Sampler produced the EOS token.
    Stop,
    /// Hit `max_new_tokens`.
    MaxTokens,
    /// Sequence outgrew the engine's context window.
    ContextFull,
}

/// Stop conditions and per-call options for one generation.
#[derive(Debug, Clone)]
pub struct GenerationConfig {
    pub max_new_tokens: usize,
    pub eos_token_id: Option<i32>,
    pub decode: DecodeOptions,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_new_tokens: 64,
            eos_token_id: None,
            decode: DecodeOptions::default(),
        }
    }
}

impl GenerationConfig {
    /// Pull EOS, pad and length limits from the model's generation config.
    pub fn from_model_config(config: &ModelConfig) -> Self {
        let defaults = Self::default();
        Self {
            max_new_tokens: config.max_new_tokens().unwrap_or(defaults.max_new_tokens),
            eos_token_id: config.eos_token_id(),
            decode: DecodeOptions::from_model_config(config),
        }
    }

    pub fn validate(&self) -> Result<(), DecodeError> {
        if self.max_new_tokens == 0 {
            return Err(DecodeError::precondition("max_new_tokens must be > 0"));
        }
        Ok(())
    }
}

/// Result of one generation run.
#[derive(Debug, Clone)]
pub struct GenerationOutput {
    /// Prompt followed by every generated token.
    pub tokens: TokenTensor,
    pub tokens_generated: usize,
    pub finish_reason: FinishReason,
}

/// Drives a `DecodingAdapter` through one sequence at a time.
#[derive(Debug, Clone, Default)]
pub struct GenerationLoop {
    config: GenerationConfig,
}

impl GenerationLoop {
    pub fn new(config: GenerationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    /// Generate from `prompt`, starting an independent sequence.
    pub async fn run<S: TokenSampler>(
        &self,
        adapter: &mut DecodingAdapter,
        prompt: TokenTensor,
        sampler: &mut S,
    ) -> Result<GenerationOutput, DecodeError> {
        let span = DecodeSpan::new(adapter.variant());
        let result = self
            .run_inner(adapter, prompt, sampler)
            .instrument(span.clone())
            .await;
        span.record_result(&result);
        if let Ok(output) = &result {
            span.record("tokens_generated", output.tokens_generated);
        }
        result
    }

    async fn run_inner<S: TokenSampler>(
        &self,
        adapter: &mut DecodingAdapter,
        prompt: TokenTensor,
        sampler: &mut S,
    ) -> Result<GenerationOutput, DecodeError> {
        self.config.validate()?;
        let max_length = adapter.context_window().max_length();
        if prompt.is_empty() || prompt.len() > max_length {
            return Err(DecodeError::precondition(format!(
                "prompt length {} outside context window 1..={}",
                prompt.len(),
                max_length
            )));
        }

        adapter.reset_state()?;
        let mut tokens = prompt;
        let mut generated = 0;

        let finish_reason = loop {
            if generated >= self.config.max_new_tokens {
                break FinishReason::MaxTokens;
            }
            if tokens.len() > max_length {
                break FinishReason::ContextFull;
            }

            let scores = adapter
                .predict_next_token_scores(&tokens, &self.config.decode)
                .await?;
            let token = sampler.sample(&scores)?;
            tokens.push(token);
            generated += 1;

            if Some(token) == self.config.eos_token_id {
                break FinishReason::Stop;
            }
        };

        tracing::debug!(generated, ?finish_reason, "generation finished");
        Ok(GenerationOutput {
            tokens,
            tokens_generated: generated,
            finish_reason,
        })
    }
}
