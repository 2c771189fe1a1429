//! Model package loading.
//!
//! A package directory holds the engine descriptor and, optionally, the
//! generation config and adapter settings:
//!
//! ```text
//! model/
//!   descriptor.json   (required)
//!   config.json       (optional)
//!   adapter.toml      (optional)
//! ```

use std::path::{Path, PathBuf};
use thiserror::Error;

use super::config::ModelConfig;
use crate::engine::{AdapterSettings, DecodeError, EngineDescriptor, GenerationConfig};

pub const DESCRIPTOR_FILE: &str = "descriptor.json";
pub const CONFIG_FILE: &str = "config.json";
pub const SETTINGS_FILE: &str = "adapter.toml";

#[derive(Error, Debug)]
pub enum PackageError {
    #[error("Package directory not found: {0}")]
    NotFound(PathBuf),

    #[error("Engine descriptor missing: {0}")]
    MissingDescriptor(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Invalid(#[from] DecodeError),
}

/// Descriptor, config and settings of one model package.
#[derive(Debug, Clone)]
pub struct ModelPackage {
    root: PathBuf,
    pub descriptor: EngineDescriptor,
    pub config: ModelConfig,
    pub settings: AdapterSettings,
}

impl ModelPackage {
    /// Load a package from `dir`.
    pub fn load(dir: &Path) -> Result<Self, PackageError> {
        if !dir.is_dir() {
            return Err(PackageError::NotFound(dir.to_path_buf()));
        }

        let descriptor_path = dir.join(DESCRIPTOR_FILE);
        if !descriptor_path.is_file() {
            return Err(PackageError::MissingDescriptor(descriptor_path));
        }
        let descriptor = EngineDescriptor::from_file(&descriptor_path)?;

        let config_path = dir.join(CONFIG_FILE);
        let config = if config_path.is_file() {
            ModelConfig::from_file(&config_path)?
        } else {
            ModelConfig::default()
        };

        let settings_path = dir.join(SETTINGS_FILE);
        let settings = if settings_path.is_file() {
            AdapterSettings::from_toml_str(&std::fs::read_to_string(&settings_path)?)?
        } else {
            AdapterSettings::default()
        };

        tracing::info!(
            path = %dir.display(),
            inputs = descriptor.inputs.len(),
            states = descriptor.states.len(),
            "model package loaded"
        );
        Ok(Self { root: dir.to_path_buf(), descriptor, config, settings })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Generation stop conditions taken from the package config.
    pub fn generation_config(&self) -> GenerationConfig {
        GenerationConfig::from_model_config(&self.config)
    }
}
