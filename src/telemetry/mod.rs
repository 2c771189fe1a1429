//! Telemetry for decode sessions.
//!
//! Structured logging, session spans and prediction metrics. Output goes to
//! stderr, a file, or whatever `metrics` recorder the host installs.

mod logging;
mod metrics;
mod spans;

pub use logging::{init_logging, LogConfig, LogError, LogFormat};
pub use self::metrics::{record_engine_failure, record_prediction, record_reset};
pub use spans::{DecodeSpan, SpanExt};
