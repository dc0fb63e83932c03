use crate::tensor::Tensor;

/// Checks if two tensors are approximately equal (shape and data within tolerance).
/// Panics if shapes differ or data differs significantly.
pub fn check_tensor_near(
    actual: &Tensor,
    expected_shape: &[usize],
    expected_data: &[f32],
    tolerance: f32,
) {
    assert_eq!(actual.shape(), expected_shape, "Shape mismatch");
    assert_eq!(
        actual.data().len(),
        expected_data.len(),
        "Data length mismatch"
    );

    for (i, (a, e)) in actual.data().iter().zip(expected_data.iter()).enumerate() {
        let diff = (*a - *e).abs();
        if diff > tolerance || diff.is_nan() {
            panic!(
                "Data mismatch at index {}: actual={:?}, expected={:?}, diff={:?}, tolerance={:?}",
                i, a, e, diff, tolerance
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_tensor_near_accepts_within_tolerance() {
        let t = Tensor::new(vec![1.0, 2.0], vec![1, 2]).unwrap();
        check_tensor_near(&t, &[1, 2], &[1.0005, 1.9995], 1e-3);
    }

    #[test]
    #[should_panic(expected = "Data mismatch at index 1")]
    fn test_check_tensor_near_rejects_outside_tolerance() {
        let t = Tensor::new(vec![1.0, 2.0], vec![1, 2]).unwrap();
        check_tensor_near(&t, &[1, 2], &[1.0, 2.1], 1e-3);
    }

    #[test]
    #[should_panic(expected = "Shape mismatch")]
    fn test_check_tensor_near_rejects_shape() {
        let t = Tensor::new(vec![1.0, 2.0], vec![2, 1]).unwrap();
        check_tensor_near(&t, &[1, 2], &[1.0, 2.0], 1e-3);
    }
}
