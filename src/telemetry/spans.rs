//! Span utilities for decode sessions.

use tracing::{info_span, Span};

/// Extension trait for recording outcomes into spans.
pub trait SpanExt {
    /// Record the result of an operation into the span.
    fn record_result<T, E>(&self, result: &Result<T, E>)
    where
        E: std::fmt::Display;
}

impl SpanExt for Span {
    fn record_result<T, E>(&self, result: &Result<T, E>)
    where
        E: std::fmt::Display,
    {
        match result {
            Ok(_) => {
                self.record("status", "ok");
            }
            Err(e) => {
                self.record("status", "error");
                self.record("error.message", e.to_string().as_str());
            }
        }
    }
}

/// Factory for generation session spans.
pub struct DecodeSpan;

impl DecodeSpan {
    /// Create a span for one generation run.
    ///
    /// `status`, `error.message` and `tokens_generated` are filled in when
    /// the run completes.
    pub fn new(variant: &str) -> Span {
        info_span!(
            "decode_session",
            variant = %variant,
            status = tracing::field::Empty,
            error.message = tracing::field::Empty,
            tokens_generated = tracing::field::Empty,
        )
    }
}
