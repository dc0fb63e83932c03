// src/ops/arithmetic/mod.rs

pub mod add;
pub mod divide;

pub use add::Add;
pub use divide::Divide;

use crate::error::TensorGraphError;

/// Shape of a binary op whose right operand is either the same shape as the left
/// or a single row broadcast over it.
pub(crate) fn broadcast_row_shape(
    operation: &str,
    left: &[usize],
    right: &[usize],
) -> Result<Vec<usize>, TensorGraphError> {
    if left == right {
        return Ok(left.to_vec());
    }
    match (left, right) {
        ([_, cols], [1, rcols]) if cols == rcols => Ok(left.to_vec()),
        _ => Err(TensorGraphError::ShapeMismatch {
            expected: left.to_vec(),
            actual: right.to_vec(),
            operation: operation.to_string(),
        }),
    }
}
