//! Adapter settings and per-call decode options.
//!
//! All fields have defaults. Settings are fixed once an adapter is built.

use serde::{Deserialize, Serialize};

use super::descriptor::FeatureNames;
use super::error::DecodeError;
use super::shape::ContextDefaults;
use crate::models::ModelConfig;

/// Load-time settings for adapter selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdapterSettings {
    /// Names of the well-known engine features.
    pub features: FeatureNames,
    /// Bounds used where the engine leaves the context window open.
    pub context: ContextDefaults,
}

impl AdapterSettings {
    /// Parse settings from TOML. Missing tables and keys keep their defaults.
    pub fn from_toml_str(content: &str) -> Result<Self, DecodeError> {
        toml::from_str(content)
            .map_err(|e| DecodeError::Configuration(format!("invalid adapter settings: {}", e)))
    }
}

/// Per-call options supplied by the generation loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Token used to fill the tail of a padded window.
    pub pad_token_id: i32,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self { pad_token_id: 0 }
    }
}

impl DecodeOptions {
    /// Take the pad token from the model's generation config when it has one.
    pub fn from_model_config(config: &ModelConfig) -> Self {
        Self {
            pad_token_id: config.pad_token_id().unwrap_or(0),
        }
    }
}
