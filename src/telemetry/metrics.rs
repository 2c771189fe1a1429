//! Decode metrics via the `metrics` facade.
//!
//! Without an installed recorder every call is a no-op.

use std::time::Duration;

use ::metrics::{counter, histogram};

/// One completed engine prediction.
pub fn record_prediction(variant: &'static str, phase: &'static str, latency: Duration) {
    counter!("gg_decode_predictions_total", "variant" => variant, "phase" => phase).increment(1);
    histogram!("gg_decode_engine_latency_seconds", "variant" => variant)
        .record(latency.as_secs_f64());
}

/// One failed engine invocation.
pub fn record_engine_failure(variant: &'static str) {
    counter!("gg_decode_engine_failures_total", "variant" => variant).increment(1);
}

/// One stateful cache reset.
pub fn record_reset() {
    counter!("gg_decode_resets_total").increment(1);
}
