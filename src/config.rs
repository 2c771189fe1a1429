//! Runtime configuration loading from environment variables.
//!
//! All values are loaded from `GG_DECODE_*` environment variables with
//! sensible defaults. Invalid values fall back to defaults without crashing.
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |---|---|---|
//! | `GG_DECODE_FALLBACK_CONTEXT` | 128 | Context length used where the engine leaves it open |
//! | `GG_DECODE_PAD_TOKEN` | 0 | Pad token for padded windows |
//! | `GG_DECODE_LOG_LEVEL` | info | Log filter directive |
//! | `GG_DECODE_LOG_FORMAT` | json | `json` or `pretty` |
//! | `GG_DECODE_LOG_FILE` | (stderr) | Log file path |

use std::path::PathBuf;

use crate::engine::{AdapterSettings, DecodeOptions, DEFAULT_FALLBACK_CONTEXT};
use crate::telemetry::{LogConfig, LogFormat};

/// Upper clamp for the fallback context length.
const MAX_FALLBACK_CONTEXT: usize = 1_000_000;

/// All configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct EnvConfig {
    pub adapter: AdapterSettings,
    pub decode: DecodeOptions,
    pub log: LogConfig,
}

fn parse_usize(key: &str, default: usize) -> usize {
    match std::env::var(key) {
        Ok(val) => val.parse::<usize>().unwrap_or(default),
        Err(_) => default,
    }
}

fn parse_i32(key: &str, default: i32) -> i32 {
    match std::env::var(key) {
        Ok(val) => val.parse::<i32>().unwrap_or(default),
        Err(_) => default,
    }
}

fn load_log_config() -> LogConfig {
    let defaults = LogConfig::default();
    let level = std::env::var("GG_DECODE_LOG_LEVEL")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or(defaults.level);
    let format = std::env::var("GG_DECODE_LOG_FORMAT")
        .ok()
        .and_then(|v| v.parse::<LogFormat>().ok())
        .unwrap_or(defaults.format);
    let output_path = std::env::var("GG_DECODE_LOG_FILE")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map(PathBuf::from);
    LogConfig { format, level, output_path }
}

/// Load all configuration from environment variables.
///
/// Missing or invalid values fall back to safe defaults without panicking.
pub fn load() -> EnvConfig {
    let fallback = parse_usize("GG_DECODE_FALLBACK_CONTEXT", DEFAULT_FALLBACK_CONTEXT);
    let fallback = fallback.clamp(1, MAX_FALLBACK_CONTEXT);

    let mut adapter = AdapterSettings::default();
    adapter.context.fallback_length = fallback;

    EnvConfig {
        adapter,
        decode: DecodeOptions {
            pad_token_id: parse_i32("GG_DECODE_PAD_TOKEN", 0),
        },
        log: load_log_config(),
    }
}
