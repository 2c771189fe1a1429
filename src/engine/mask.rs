//! Auxiliary mask tensors.
//!
//! The padded strategy needs a full-window Int32 mask marking real positions;
//! the stateful strategy feeds a small trailing Float16 mask. Both come from
//! the same pure builder.

use super::error::DecodeError;
use super::tensor::{element_count, MultiArray};

/// Which mask to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaskKind {
    /// Int32 mask, 1 for the first `valid_len` positions of the last axis
    /// and 0 after.
    Padding { valid_len: usize },
    /// Float16 mask of zeros.
    Zeros,
}

/// Build a mask of `shape`.
///
/// # Errors
/// `PreconditionViolation` if the shape's element count overflows.
pub fn build_mask(shape: &[usize], kind: MaskKind) -> Result<MultiArray, DecodeError> {
    if element_count(shape).is_none() {
        return Err(DecodeError::precondition(format!(
            "mask shape {:?} overflows the element count",
            shape
        )));
    }
    let mask = match kind {
        MaskKind::Padding { valid_len } => {
            let width = shape.last().copied().unwrap_or(0);
            let rows: usize = shape.iter().rev().skip(1).product();
            let valid = valid_len.min(width);
            let mut values = Vec::with_capacity(rows * width);
            for _ in 0..rows {
                values.extend(std::iter::repeat(1).take(valid));
                values.extend(std::iter::repeat(0).take(width - valid));
            }
            MultiArray::int32(shape.to_vec(), values)
        }
        MaskKind::Zeros => MultiArray::zeros_f16(shape.to_vec())
            .ok_or_else(|| DecodeError::precondition("mask shape overflows"))?,
    };
    Ok(mask)
}
