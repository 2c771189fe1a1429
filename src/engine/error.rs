//! Decoding error types.
//!
//! All errors are fail-closed: a malformed engine package is rejected at load,
//! never degraded to a different strategy.

use thiserror::Error;

/// Failures reported by, or about, the opaque inference engine.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Engine invocation failed: {0}")]
    Invocation(String),

    #[error("Engine output missing: {0}")]
    MissingOutput(String),

    #[error("Engine output malformed: {0}")]
    MalformedOutput(String),

    #[error("State allocation failed: {0}")]
    StateAllocation(String),
}

/// Errors that can occur while selecting or driving a decoding adapter.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Engine descriptors are malformed, asymmetric or insufficient.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The caller broke the adapter's usage contract.
    #[error("Precondition violated: {0}")]
    PreconditionViolation(String),

    #[error(transparent)]
    Engine(#[from] EngineError),

    /// A cache strategy that is detected but deliberately not supported.
    #[error("Capability not implemented: {0}")]
    UnimplementedCapability(String),
}

impl DecodeError {
    /// Returns true if this error indicates a model-packaging defect.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::Configuration(_) | Self::UnimplementedCapability(_)
        )
    }

    /// Returns true if this error is a caller programming error.
    pub fn is_caller_bug(&self) -> bool {
        matches!(self, Self::PreconditionViolation(_))
    }

    /// Returns true if the generation loop may abort the current sequence
    /// and continue with a fresh one.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Engine(_))
    }

    pub(crate) fn precondition(msg: impl Into<String>) -> Self {
        let msg = msg.into();
        tracing::error!(reason = %msg, "decode precondition violated");
        Self::PreconditionViolation(msg)
    }
}
