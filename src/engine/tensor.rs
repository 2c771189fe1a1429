//! Dense tensors exchanged with the inference engine.
//!
//! `MultiArray` is the engine boundary type. `TokenTensor` and `ScoreVector`
//! are the shapes the generation loop sees: `[1, length]` token ids in, and
//! `[1, 1, vocab_size]` scores out.

use std::collections::HashMap;

use half::f16;
use serde::{Deserialize, Serialize};

use super::error::EngineError;

/// Named tensors passed to or returned from one engine call.
pub type FeatureMap = HashMap<String, MultiArray>;

/// Element type of an engine feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    Int32,
    Float16,
    Float32,
}

/// Backing storage of a `MultiArray`.
#[derive(Debug, Clone, PartialEq)]
pub enum TensorData {
    Int32(Vec<i32>),
    Float16(Vec<f16>),
    Float32(Vec<f32>),
}

impl TensorData {
    pub fn len(&self) -> usize {
        match self {
            Self::Int32(v) => v.len(),
            Self::Float16(v) => v.len(),
            Self::Float32(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn data_type(&self) -> DataType {
        match self {
            Self::Int32(_) => DataType::Int32,
            Self::Float16(_) => DataType::Float16,
            Self::Float32(_) => DataType::Float32,
        }
    }
}

/// Number of elements in `shape`, or `None` on overflow.
pub(crate) fn element_count(shape: &[usize]) -> Option<usize> {
    shape.iter().try_fold(1usize, |acc, &d| acc.checked_mul(d))
}

/// A shaped, row-major dense tensor.
#[derive(Debug, Clone, PartialEq)]
pub struct MultiArray {
    shape: Vec<usize>,
    data: TensorData,
}

impl MultiArray {
    /// Build a tensor, rejecting data whose length does not match the shape.
    pub fn new(shape: Vec<usize>, data: TensorData) -> Result<Self, EngineError> {
        let expected = element_count(&shape).ok_or_else(|| {
            EngineError::MalformedOutput(format!("shape {:?} overflows the element count", shape))
        })?;
        if expected != data.len() {
            return Err(EngineError::MalformedOutput(format!(
                "shape {:?} needs {} elements, got {}",
                shape,
                expected,
                data.len()
            )));
        }
        Ok(Self { shape, data })
    }

    /// Int32 tensor from parts the caller has already sized correctly.
    pub(crate) fn int32(shape: Vec<usize>, values: Vec<i32>) -> Self {
        debug_assert_eq!(shape.iter().product::<usize>(), values.len());
        Self { shape, data: TensorData::Int32(values) }
    }

    /// Float16 tensor of zeros. `None` if the shape overflows.
    pub fn zeros_f16(shape: Vec<usize>) -> Option<Self> {
        let n = element_count(&shape)?;
        Some(Self { shape, data: TensorData::Float16(vec![f16::ZERO; n]) })
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn rank(&self) -> usize {
        self.shape.len()
    }

    pub fn data(&self) -> &TensorData {
        &self.data
    }

    pub fn data_type(&self) -> DataType {
        self.data.data_type()
    }

    /// Int32 view, if that is the element type.
    pub fn as_i32(&self) -> Option<&[i32]> {
        match &self.data {
            TensorData::Int32(v) => Some(v),
            _ => None,
        }
    }

    /// Extract the vocabulary row at `position` of a `[1, seq, vocab]` logits
    /// tensor, widened to f32.
    pub fn logits_row(&self, position: usize) -> Result<Vec<f32>, EngineError> {
        let (seq, vocab) = match self.shape.as_slice() {
            [1, seq, vocab] => (*seq, *vocab),
            other => {
                return Err(EngineError::MalformedOutput(format!(
                    "logits must have shape [1, seq, vocab], got {:?}",
                    other
                )))
            }
        };
        if position >= seq {
            return Err(EngineError::MalformedOutput(format!(
                "logits position {} out of range for sequence length {}",
                position, seq
            )));
        }
        let range = position * vocab..(position + 1) * vocab;
        match &self.data {
            TensorData::Float32(v) => Ok(v[range].to_vec()),
            TensorData::Float16(v) => Ok(v[range].iter().map(|x| x.to_f32()).collect()),
            TensorData::Int32(_) => Err(EngineError::MalformedOutput(
                "logits must be floating point".into(),
            )),
        }
    }
}

/// Token identifiers of a single sequence, logical shape `[1, length]`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenTensor {
    ids: Vec<i32>,
}

impl TokenTensor {
    pub fn new(ids: Vec<i32>) -> Self {
        Self { ids }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn ids(&self) -> &[i32] {
        &self.ids
    }

    pub fn last(&self) -> Option<i32> {
        self.ids.last().copied()
    }

    /// Append a newly generated token.
    pub fn push(&mut self, token: i32) {
        self.ids.push(token);
    }

    /// The whole sequence as a `[1, length]` Int32 tensor.
    pub fn to_multi_array(&self) -> MultiArray {
        MultiArray::int32(vec![1, self.ids.len()], self.ids.clone())
    }

    /// Right-pad with `pad_token_id` to exactly `width` positions.
    /// Callers guarantee `len() <= width`.
    pub(crate) fn padded_to(&self, width: usize, pad_token_id: i32) -> MultiArray {
        let mut values = Vec::with_capacity(width);
        values.extend_from_slice(&self.ids);
        values.resize(width, pad_token_id);
        MultiArray::int32(vec![1, width], values)
    }
}

impl From<Vec<i32>> for TokenTensor {
    fn from(ids: Vec<i32>) -> Self {
        Self::new(ids)
    }
}

impl FromIterator<i32> for TokenTensor {
    fn from_iter<I: IntoIterator<Item = i32>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Next-token scores, logical shape `[1, 1, vocab_size]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreVector {
    scores: Vec<f32>,
}

impl ScoreVector {
    pub fn new(scores: Vec<f32>) -> Self {
        Self { scores }
    }

    pub fn vocab_size(&self) -> usize {
        self.scores.len()
    }

    pub fn shape(&self) -> [usize; 3] {
        [1, 1, self.scores.len()]
    }

    pub fn scores(&self) -> &[f32] {
        &self.scores
    }

    /// Index and value of the highest score. NaN scores never win.
    pub fn argmax(&self) -> Option<(usize, f32)> {
        self.scores
            .iter()
            .copied()
            .enumerate()
            .filter(|(_, s)| !s.is_nan())
            .fold(None, |best, (i, s)| match best {
                Some((_, b)) if b >= s => best,
                _ => Some((i, s)),
            })
    }

    /// Reshape into a `[1, 1, vocab_size]` Float32 tensor.
    pub fn into_multi_array(self) -> MultiArray {
        let shape = vec![1, 1, self.scores.len()];
        MultiArray { shape, data: TensorData::Float32(self.scores) }
    }
}
