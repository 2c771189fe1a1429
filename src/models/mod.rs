//! Model package handling.
//!
//! Loads engine descriptors, generation configs and adapter settings from a
//! model package directory.

pub mod config;
mod package;

pub use config::ModelConfig;
pub use package::{ModelPackage, PackageError, CONFIG_FILE, DESCRIPTOR_FILE, SETTINGS_FILE};
