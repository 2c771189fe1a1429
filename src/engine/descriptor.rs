//! Engine descriptor tables.
//!
//! A descriptor lists the named inputs, outputs and mutable state features an
//! engine accepts, each with an optional shape constraint. Descriptors are
//! read-only once loaded.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::error::DecodeError;
use super::tensor::DataType;

/// Declared bounds of a single axis. `None` means unbounded on that side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimRange {
    #[serde(default)]
    pub lower: Option<usize>,
    #[serde(default)]
    pub upper: Option<usize>,
}

/// Shape a feature accepts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ShapeConstraint {
    /// No constraint declared.
    #[default]
    Unspecified,
    /// Exactly one shape.
    Fixed { shape: Vec<usize> },
    /// One of a set of shapes, in declaration order.
    Enumerated { shapes: Vec<Vec<usize>> },
    /// Per-axis ranges.
    Range { dims: Vec<DimRange> },
}

/// One named feature of the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureDescription {
    pub name: String,
    pub data_type: DataType,
    #[serde(default)]
    pub shape: ShapeConstraint,
}

impl FeatureDescription {
    pub fn new(name: impl Into<String>, data_type: DataType, shape: ShapeConstraint) -> Self {
        Self { name: name.into(), data_type, shape }
    }
}

/// Inputs, outputs and mutable state declared by an engine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineDescriptor {
    #[serde(default)]
    pub inputs: Vec<FeatureDescription>,
    #[serde(default)]
    pub outputs: Vec<FeatureDescription>,
    /// Features the engine designates as mutable state.
    #[serde(default)]
    pub states: Vec<FeatureDescription>,
}

impl EngineDescriptor {
    /// Load a descriptor from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, DecodeError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            DecodeError::Configuration(format!(
                "failed to read descriptor {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_json(&content)
    }

    /// Parse a descriptor from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, DecodeError> {
        serde_json::from_str(json)
            .map_err(|e| DecodeError::Configuration(format!("invalid descriptor JSON: {}", e)))
    }

    pub fn input(&self, name: &str) -> Option<&FeatureDescription> {
        self.inputs.iter().find(|f| f.name == name)
    }

    pub fn output(&self, name: &str) -> Option<&FeatureDescription> {
        self.outputs.iter().find(|f| f.name == name)
    }

    pub fn state(&self, name: &str) -> Option<&FeatureDescription> {
        self.states.iter().find(|f| f.name == name)
    }

    pub fn has_input(&self, name: &str) -> bool {
        self.input(name).is_some()
    }

    pub fn has_output(&self, name: &str) -> bool {
        self.output(name).is_some()
    }

    pub fn has_state(&self, name: &str) -> bool {
        self.state(name).is_some()
    }
}

/// Well-known feature names the adapters depend on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureNames {
    pub input_ids: String,
    pub attention_mask: String,
    pub causal_mask: String,
    pub key_cache: String,
    pub value_cache: String,
    pub logits: String,
    pub present_keys: String,
    pub present_values: String,
}

impl Default for FeatureNames {
    fn default() -> Self {
        Self {
            input_ids: "input_ids".into(),
            attention_mask: "attention_mask".into(),
            causal_mask: "causal_mask".into(),
            key_cache: "keyCache".into(),
            value_cache: "valueCache".into(),
            logits: "logits".into(),
            present_keys: "present_keys".into(),
            present_values: "present_values".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "inputs": [
            {"name": "input_ids", "data_type": "int32",
             "shape": {"kind": "range", "dims": [{"lower": 1, "upper": 1}, {"lower": 1, "upper": 2048}]}},
            {"name": "causal_mask", "data_type": "float16"}
        ],
        "outputs": [{"name": "logits", "data_type": "float16"}],
        "states": [
            {"name": "keyCache", "data_type": "float16"},
            {"name": "valueCache", "data_type": "float16"}
        ]
    }"#;

    #[test]
    fn parses_json_descriptor() {
        let desc = EngineDescriptor::from_json(SAMPLE).unwrap();
        assert_eq!(desc.inputs.len(), 2);
        assert!(desc.has_state("keyCache"));
        assert!(desc.has_output("logits"));
        assert_eq!(desc.input("causal_mask").unwrap().shape, ShapeConstraint::Unspecified);
        match &desc.input("input_ids").unwrap().shape {
            ShapeConstraint::Range { dims } => assert_eq!(dims[1].upper, Some(2048)),
            other => panic!("unexpected shape: {:?}", other),
        }
    }

    #[test]
    fn invalid_json_is_configuration_error() {
        let err = EngineDescriptor::from_json("{\"inputs\": 3}").unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn missing_file_is_configuration_error() {
        let err = EngineDescriptor::from_file(Path::new("/nonexistent/descriptor.json"))
            .unwrap_err();
        assert!(matches!(err, DecodeError::Configuration(_)));
    }

    #[test]
    fn feature_names_partial_override() {
        let names: FeatureNames = serde_json::from_str(r#"{"key_cache": "k"}"#).unwrap();
        assert_eq!(names.key_cache, "k");
        assert_eq!(names.value_cache, "valueCache");
    }
}
