//! Context window derivation from the engine's declared input shape.

use serde::{Deserialize, Serialize};

use super::descriptor::{EngineDescriptor, ShapeConstraint};
use super::error::DecodeError;

/// Fallback sequence length when the engine declares no usable upper bound.
pub const DEFAULT_FALLBACK_CONTEXT: usize = 128;

/// Range of input sequence lengths an engine accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextWindow {
    min_length: usize,
    max_length: usize,
}

impl ContextWindow {
    /// Build a window, enforcing `1 <= min_length <= max_length`.
    pub fn new(min_length: usize, max_length: usize) -> Result<Self, DecodeError> {
        if min_length == 0 || min_length > max_length {
            return Err(DecodeError::Configuration(format!(
                "invalid context window ({}, {})",
                min_length, max_length
            )));
        }
        Ok(Self { min_length, max_length })
    }

    pub fn min_length(&self) -> usize {
        self.min_length
    }

    pub fn max_length(&self) -> usize {
        self.max_length
    }

    /// True when the engine accepts more than two distinct lengths.
    pub fn is_flexible(&self) -> bool {
        self.max_length - self.min_length > 1
    }
}

/// Defaults used where the declared constraint leaves a bound open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextDefaults {
    pub fallback_length: usize,
}

impl Default for ContextDefaults {
    fn default() -> Self {
        Self { fallback_length: DEFAULT_FALLBACK_CONTEXT }
    }
}

/// Derive the context window of the token-id input named `input_name`.
///
/// The sequence axis is the last declared axis. An enumerated constraint with
/// several shapes only honours the first one.
pub fn inspect_context_window(
    descriptor: &EngineDescriptor,
    input_name: &str,
    defaults: &ContextDefaults,
) -> Result<ContextWindow, DecodeError> {
    let feature = descriptor.input(input_name).ok_or_else(|| {
        DecodeError::Configuration(format!("engine has no input named '{}'", input_name))
    })?;
    let fallback = defaults.fallback_length.max(1);

    let (min, max) = match &feature.shape {
        ShapeConstraint::Fixed { shape } => {
            let extent = sequence_extent(shape, input_name)?;
            (extent, extent)
        }
        ShapeConstraint::Enumerated { shapes } => {
            let first = shapes.first().ok_or_else(|| {
                DecodeError::Configuration(format!(
                    "input '{}' enumerates no shapes",
                    input_name
                ))
            })?;
            if shapes.len() > 1 {
                tracing::warn!(
                    input = input_name,
                    shapes = shapes.len(),
                    "multiple enumerated shapes, using the first"
                );
            }
            let extent = sequence_extent(first, input_name)?;
            (extent, extent)
        }
        ShapeConstraint::Range { dims } => {
            let dim = dims.last().ok_or_else(|| {
                DecodeError::Configuration(format!("input '{}' has an empty range", input_name))
            })?;
            (dim.lower.unwrap_or(1).max(1), dim.upper.unwrap_or(fallback))
        }
        ShapeConstraint::Unspecified => (fallback, fallback),
    };

    ContextWindow::new(min, max)
}

fn sequence_extent(shape: &[usize], input_name: &str) -> Result<usize, DecodeError> {
    match shape.last() {
        Some(&extent) if extent > 0 => Ok(extent),
        _ => Err(DecodeError::Configuration(format!(
            "input '{}' declares no sequence extent: {:?}",
            input_name, shape
        ))),
    }
}
