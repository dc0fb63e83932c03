use crate::error::TensorGraphError;

/// Calculates the strides for a given shape.
/// Strides represent the number of elements to skip in the flattened data array
/// to move one step along each dimension.
///
/// Example:
/// shape = [2, 3] -> strides = [3, 1]
/// shape = [2, 2, 2] -> strides = [4, 2, 1]
pub fn calculate_strides(shape: &[usize]) -> Vec<usize> {
    if shape.is_empty() {
        return vec![];
    }
    let rank = shape.len();
    let mut strides = vec![1; rank];
    for i in (0..rank - 1).rev() {
        strides[i] = strides[i + 1] * shape[i + 1];
    }
    strides
}

/// Number of elements described by a shape. The empty shape holds no elements.
pub fn numel(shape: &[usize]) -> usize {
    if shape.is_empty() {
        0
    } else {
        shape.iter().product()
    }
}

pub(crate) fn check_same_shape(
    expected: &[usize],
    actual: &[usize],
    operation: &str,
) -> Result<(), TensorGraphError> {
    if expected != actual {
        return Err(TensorGraphError::ShapeMismatch {
            expected: expected.to_vec(),
            actual: actual.to_vec(),
            operation: operation.to_string(),
        });
    }
    Ok(())
}

/// Returns `(rows, cols)` of a rank-2 shape.
pub(crate) fn as_matrix(shape: &[usize], operation: &str) -> Result<(usize, usize), TensorGraphError> {
    match shape {
        [rows, cols] => Ok((*rows, *cols)),
        _ => Err(TensorGraphError::ShapeMismatch {
            expected: vec![0, 0],
            actual: shape.to_vec(),
            operation: format!("{} (rank-2 tensor required)", operation),
        }),
    }
}

#[cfg(test)]
#[path = "utils_test.rs"]
mod tests;
