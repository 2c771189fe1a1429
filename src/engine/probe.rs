//! Cache capability classification from paired state/IO descriptors.

use std::fmt;

use super::descriptor::{EngineDescriptor, FeatureNames};
use super::error::DecodeError;

/// How an engine carries attention state across calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheCapability {
    /// No cache: every call resubmits the full window.
    None,
    /// Key/value caches are engine-managed mutable state.
    Stateful,
    /// Key/value caches travel as ordinary inputs and outputs.
    UnsupportedIoBased,
}

impl CacheCapability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Stateful => "stateful",
            Self::UnsupportedIoBased => "io_based",
        }
    }
}

impl fmt::Display for CacheCapability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify the cache support declared by `descriptor`.
///
/// Paired features must be declared symmetrically; a half-declared pair is a
/// packaging defect and fails immediately.
pub fn probe_cache_capability(
    descriptor: &EngineDescriptor,
    names: &FeatureNames,
) -> Result<CacheCapability, DecodeError> {
    let key_state = descriptor.has_state(&names.key_cache);
    let value_state = descriptor.has_state(&names.value_cache);
    if key_state != value_state {
        return Err(DecodeError::Configuration(format!(
            "state '{}' declared {}, state '{}' declared {}",
            names.key_cache,
            presence(key_state),
            names.value_cache,
            presence(value_state)
        )));
    }
    if key_state {
        return Ok(CacheCapability::Stateful);
    }

    let io = [
        (names.key_cache.as_str(), descriptor.has_input(&names.key_cache)),
        (names.value_cache.as_str(), descriptor.has_input(&names.value_cache)),
        (names.present_keys.as_str(), descriptor.has_output(&names.present_keys)),
        (names.present_values.as_str(), descriptor.has_output(&names.present_values)),
    ];
    let declared = io.iter().filter(|(_, present)| *present).count();
    match declared {
        0 => Ok(CacheCapability::None),
        n if n == io.len() => Ok(CacheCapability::UnsupportedIoBased),
        _ => {
            let missing: Vec<&str> = io
                .iter()
                .filter(|(_, present)| !*present)
                .map(|(name, _)| *name)
                .collect();
            Err(DecodeError::Configuration(format!(
                "IO cache features partially declared, missing: {}",
                missing.join(", ")
            )))
        }
    }
}

fn presence(present: bool) -> &'static str {
    if present {
        "present"
    } else {
        "absent"
    }
}
