//! Model generation config.
//!
//! The config is plain JSON as shipped with the model. Keys are normalized to
//! snake_case once at load, so lookups never reconcile naming styles at call
//! time.

use std::path::Path;

use serde_json::{Map, Value};

use crate::engine::DecodeError;

/// Parsed, key-normalized generation config.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelConfig {
    root: Value,
}

impl ModelConfig {
    /// Load config from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, DecodeError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            DecodeError::Configuration(format!("failed to read config {}: {}", path.display(), e))
        })?;
        Self::from_json(&content)
    }

    /// Parse config from a JSON string. The top level must be an object.
    pub fn from_json(json: &str) -> Result<Self, DecodeError> {
        let value: Value = serde_json::from_str(json)
            .map_err(|e| DecodeError::Configuration(format!("invalid config JSON: {}", e)))?;
        if !value.is_object() {
            return Err(DecodeError::Configuration(
                "config root must be a JSON object".into(),
            ));
        }
        Ok(Self { root: normalize(value) })
    }

    /// Look up a dotted path such as `"text_config.eos_token_id"`. Segments
    /// may use either naming style; numeric segments index arrays.
    pub fn get(&self, path: &str) -> Option<&Value> {
        path.split('.').try_fold(&self.root, |node, segment| match node {
            Value::Object(map) => map.get(&to_snake_case(segment)),
            Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        })
    }

    pub fn pad_token_id(&self) -> Option<i32> {
        self.token_id("pad_token_id")
    }

    pub fn bos_token_id(&self) -> Option<i32> {
        self.token_id("bos_token_id")
    }

    /// First EOS token when the config lists several.
    pub fn eos_token_id(&self) -> Option<i32> {
        self.token_id("eos_token_id")
    }

    pub fn max_length(&self) -> Option<usize> {
        self.get("max_length").and_then(as_usize)
    }

    pub fn max_new_tokens(&self) -> Option<usize> {
        self.get("max_new_tokens").and_then(as_usize)
    }

    fn token_id(&self, key: &str) -> Option<i32> {
        let value = match self.get(key)? {
            Value::Array(items) => items.first()?,
            other => other,
        };
        value.as_i64().and_then(|v| i32::try_from(v).ok())
    }
}

fn as_usize(value: &Value) -> Option<usize> {
    value.as_u64().and_then(|v| usize::try_from(v).ok())
}

/// Recursively rewrite object keys to snake_case. A key already in
/// snake_case wins over a camelCase spelling of the same name.
fn normalize(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut out = Map::with_capacity(map.len());
            for (key, child) in map {
                let snake = to_snake_case(&key);
                let is_canonical = snake == key;
                if is_canonical || !out.contains_key(&snake) {
                    out.insert(snake, normalize(child));
                }
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(normalize).collect()),
        other => other,
    }
}

fn to_snake_case(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    let mut out = String::with_capacity(key.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if c.is_uppercase() {
            let prev = i.checked_sub(1).map(|p| chars[p]);
            let next = chars.get(i + 1).copied();
            let boundary = match prev {
                Some(p) if p == '_' => false,
                Some(p) if p.is_lowercase() || p.is_ascii_digit() => true,
                Some(p) if p.is_uppercase() => next.map_or(false, |n| n.is_lowercase()),
                _ => false,
            };
            if boundary {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snake_case_conversion() {
        assert_eq!(to_snake_case("eosTokenId"), "eos_token_id");
        assert_eq!(to_snake_case("pad_token_id"), "pad_token_id");
        assert_eq!(to_snake_case("HTTPServer"), "http_server");
        assert_eq!(to_snake_case("maxLength2D"), "max_length2_d");
    }

    #[test]
    fn camel_case_keys_resolve_by_either_name() {
        let config = ModelConfig::from_json(r#"{"eosTokenId": 2, "textConfig": {"vocabSize": 10}}"#)
            .unwrap();
        assert_eq!(config.eos_token_id(), Some(2));
        assert_eq!(config.get("textConfig.vocabSize"), Some(&Value::from(10)));
        assert_eq!(config.get("text_config.vocab_size"), Some(&Value::from(10)));
    }

    #[test]
    fn snake_case_key_wins_on_collision() {
        let config = ModelConfig::from_json(r#"{"padTokenId": 9, "pad_token_id": 1}"#).unwrap();
        assert_eq!(config.pad_token_id(), Some(1));
    }

    #[test]
    fn eos_list_takes_first() {
        let config = ModelConfig::from_json(r#"{"eos_token_id": [7, 8]}"#).unwrap();
        assert_eq!(config.eos_token_id(), Some(7));
        assert_eq!(config.get("eos_token_id.1"), Some(&Value::from(8)));
    }

    #[test]
    fn missing_paths_are_none() {
        let config = ModelConfig::from_json(r#"{"a": {"b": 1}}"#).unwrap();
        assert!(config.get("a.c").is_none());
        assert!(config.get("a.b.c").is_none());
        assert!(config.bos_token_id().is_none());
        assert!(config.max_length().is_none());
    }

    #[test]
    fn non_object_root_is_rejected() {
        assert!(ModelConfig::from_json("[1, 2]").unwrap_err().is_configuration());
        assert!(ModelConfig::from_json("not json").is_err());
    }
}
