//! Mock inference engine shared by the integration tests.
//!
//! Logits are one-hot: the row for position `p` peaks at
//! `(input_ids[p] + 1) % vocab`, so the selected row is visible in the
//! returned scores.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use gg_decode::engine::{
    CacheHandle, DataType, DimRange, EngineDescriptor, EngineError, FeatureDescription, FeatureMap,
    InferenceBackend, MultiArray, ShapeConstraint, TensorData,
};

pub const VOCAB: usize = 16;

/// One recorded engine call.
#[derive(Debug, Clone)]
pub struct Call {
    pub inputs: FeatureMap,
    /// Cache handle id and the number of tokens it had absorbed after the call.
    pub cache: Option<(u64, usize)>,
}

pub struct MockEngine {
    descriptor: EngineDescriptor,
    calls: Mutex<Vec<Call>>,
    fail_next: AtomicBool,
    hang_next: AtomicBool,
}

impl MockEngine {
    pub fn new(descriptor: EngineDescriptor) -> Self {
        Self {
            descriptor,
            calls: Mutex::new(Vec::new()),
            fail_next: AtomicBool::new(false),
            hang_next: AtomicBool::new(false),
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn fail_next(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    pub fn hang_next(&self) {
        self.hang_next.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl InferenceBackend for MockEngine {
    fn descriptor(&self) -> &EngineDescriptor {
        &self.descriptor
    }

    fn make_state(&self) -> Result<CacheHandle, EngineError> {
        Ok(CacheHandle::new(0usize))
    }

    async fn predict(
        &self,
        inputs: FeatureMap,
        state: Option<&mut CacheHandle>,
    ) -> Result<FeatureMap, EngineError> {
        if self.hang_next.swap(false, Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(EngineError::Invocation("mock failure".into()));
        }

        let ids = inputs
            .get("input_ids")
            .and_then(|t| t.as_i32())
            .ok_or_else(|| EngineError::Invocation("input_ids missing".into()))?
            .to_vec();

        let cache = state.map(|handle| {
            let id = handle.id();
            let seen = handle
                .downcast_mut::<usize>()
                .expect("mock engine state");
            *seen += ids.len();
            (id, *seen)
        });

        let mut logits = vec![0.0f32; ids.len() * VOCAB];
        for (pos, id) in ids.iter().enumerate() {
            let hot = (*id as usize + 1) % VOCAB;
            logits[pos * VOCAB + hot] = 1.0;
        }
        let logits = MultiArray::new(vec![1, ids.len(), VOCAB], TensorData::Float32(logits))?;

        self.calls.lock().unwrap().push(Call { inputs, cache });
        let mut outputs = FeatureMap::new();
        outputs.insert("logits".to_string(), logits);
        Ok(outputs)
    }
}

pub fn feature(name: &str, data_type: DataType) -> FeatureDescription {
    FeatureDescription::new(name, data_type, ShapeConstraint::Unspecified)
}

pub fn logits() -> FeatureDescription {
    feature("logits", DataType::Float32)
}

pub fn fixed_ids(length: usize) -> FeatureDescription {
    FeatureDescription::new(
        "input_ids",
        DataType::Int32,
        ShapeConstraint::Fixed { shape: vec![1, length] },
    )
}

pub fn ranged_ids(lower: usize, upper: usize) -> FeatureDescription {
    FeatureDescription::new(
        "input_ids",
        DataType::Int32,
        ShapeConstraint::Range {
            dims: vec![
                DimRange { lower: Some(1), upper: Some(1) },
                DimRange { lower: Some(lower), upper: Some(upper) },
            ],
        },
    )
}

/// Fixed window, no cache.
pub fn padded_descriptor(length: usize, attention_mask: bool) -> EngineDescriptor {
    let mut inputs = vec![fixed_ids(length)];
    if attention_mask {
        inputs.push(feature("attention_mask", DataType::Int32));
    }
    EngineDescriptor { inputs, outputs: vec![logits()], states: vec![] }
}

/// Flexible window with key/value state and a causal mask input.
pub fn stateful_descriptor(lower: usize, upper: usize) -> EngineDescriptor {
    EngineDescriptor {
        inputs: vec![ranged_ids(lower, upper), feature("causal_mask", DataType::Float16)],
        outputs: vec![logits()],
        states: vec![
            feature("keyCache", DataType::Float16),
            feature("valueCache", DataType::Float16),
        ],
    }
}

/// Token peaked by the mock for `last`.
pub fn expected_token(last: i32) -> usize {
    (last as usize + 1) % VOCAB
}
