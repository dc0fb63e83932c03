// src/tensor/tests.rs

use super::*;
use approx::assert_relative_eq;

#[test]
fn test_tensor_creation() -> Result<(), TensorGraphError> {
    let t = Tensor::new(vec![1.0, 2.0, 3.0, 4.0], vec![2, 2])?;
    assert_eq!(t.shape(), &[2, 2]);
    assert_eq!(t.numel(), 4);
    assert_eq!(t.strides(), vec![2, 1]);
    assert_relative_eq!(t.get(&[0, 0])?, 1.0);
    assert_relative_eq!(t.get(&[1, 1])?, 4.0);
    Ok(())
}

#[test]
fn test_tensor_creation_error() {
    let result = Tensor::new(vec![1.0, 2.0, 3.0], vec![2, 2]);
    match result {
        Err(TensorGraphError::TensorCreationError { data_len, shape }) => {
            assert_eq!(data_len, 3);
            assert_eq!(shape, vec![2, 2]);
        }
        other => panic!("Expected TensorCreationError, got {:?}", other),
    }
}

#[test]
fn test_from_rows_ragged_rejected() {
    let result = Tensor::from_rows(&[vec![1.0, 2.0], vec![3.0]]);
    assert!(matches!(result, Err(TensorGraphError::ShapeMismatch { .. })));
}

#[test]
fn test_get_out_of_bounds() -> Result<(), TensorGraphError> {
    let t = Tensor::from_rows(&[vec![1.0, 2.0], vec![3.0, 4.0]])?;
    assert_eq!(
        t.get(&[2, 0]),
        Err(TensorGraphError::IndexOutOfBounds { index: 2, size: 2 })
    );
    Ok(())
}

#[test]
fn test_rows_access() -> Result<(), TensorGraphError> {
    let mut t = Tensor::from_rows(&[vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]])?;
    assert_eq!(t.rows(), 2);
    assert_eq!(t.row(1)?, &[4.0, 5.0, 6.0]);
    t.row_mut(0)?.iter_mut().for_each(|x| *x = 0.0);
    assert_eq!(t.data(), &[0.0, 0.0, 0.0, 4.0, 5.0, 6.0]);
    Ok(())
}

#[test]
fn test_empty_tensor_is_unset() {
    let t = Tensor::default();
    assert!(t.is_empty());
    assert_eq!(t.numel(), 0);
}

#[test]
fn test_matmul() -> Result<(), TensorGraphError> {
    let a = Tensor::from_rows(&[vec![1.0, 2.0, 3.0]])?;
    let b = Tensor::from_rows(&[vec![1.0, 0.0], vec![0.0, 1.0], vec![1.0, 1.0]])?;
    let c = a.matmul(&b)?;
    assert_eq!(c.shape(), &[1, 2]);
    assert_eq!(c.data(), &[4.0, 5.0]);
    Ok(())
}

#[test]
fn test_matmul_inner_dimension_mismatch() -> Result<(), TensorGraphError> {
    let a = Tensor::from_rows(&[vec![1.0, 2.0]])?;
    let b = Tensor::from_rows(&[vec![1.0, 2.0]])?;
    assert!(matches!(a.matmul(&b), Err(TensorGraphError::ShapeMismatch { .. })));
    Ok(())
}

#[test]
fn test_transpose() -> Result<(), TensorGraphError> {
    let a = Tensor::from_rows(&[vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]])?;
    let t = a.transpose()?;
    assert_eq!(t.shape(), &[3, 2]);
    assert_eq!(t.data(), &[1.0, 4.0, 2.0, 5.0, 3.0, 6.0]);
    Ok(())
}

#[test]
fn test_row_broadcast_and_sum_rows() -> Result<(), TensorGraphError> {
    let a = Tensor::from_rows(&[vec![1.0, 2.0], vec![3.0, 4.0]])?;
    let bias = Tensor::from_rows(&[vec![10.0, 20.0]])?;
    let out = a.add_row_broadcast(&bias)?;
    assert_eq!(out.data(), &[11.0, 22.0, 13.0, 24.0]);
    let sums = out.sum_rows()?;
    assert_eq!(sums.shape(), &[1, 2]);
    assert_eq!(sums.data(), &[24.0, 46.0]);
    Ok(())
}

#[test]
fn test_elementwise_ops() -> Result<(), TensorGraphError> {
    let a = Tensor::new(vec![1.0, 2.0], vec![2])?;
    let b = Tensor::new(vec![3.0, 5.0], vec![2])?;
    assert_eq!(a.add(&b)?.data(), &[4.0, 7.0]);
    assert_eq!(b.sub(&a)?.data(), &[2.0, 3.0]);
    assert_eq!(a.mul(&b)?.data(), &[3.0, 10.0]);
    assert_eq!(a.scale(2.0).data(), &[2.0, 4.0]);

    let mut c = a.clone();
    c.add_assign(&b)?;
    c.sub_assign(&a)?;
    assert_eq!(c, b);
    Ok(())
}

#[test]
fn test_non_finite_detection() -> Result<(), TensorGraphError> {
    let finite = Tensor::new(vec![1.0, -2.0], vec![2])?;
    assert_eq!(finite.non_finite(), None);
    let inf = Tensor::new(vec![f32::INFINITY, 1.0], vec![2])?;
    assert_eq!(inf.non_finite(), Some(NumericIssue::Infinity));
    let nan = Tensor::new(vec![f32::INFINITY, f32::NAN], vec![2])?;
    assert_eq!(nan.non_finite(), Some(NumericIssue::NaN));
    Ok(())
}

#[test]
fn test_all_close_requires_equal_shapes() -> Result<(), TensorGraphError> {
    let a = Tensor::new(vec![1.0, 2.0], vec![2])?;
    let b = Tensor::new(vec![1.0, 2.0], vec![1, 2])?;
    assert!(!a.all_close(&b, 1e-5, 1e-8));
    assert!(a.all_close(&a.add(&Tensor::new(vec![1e-7, 0.0], vec![2])?)?, 1e-5, 1e-6));
    Ok(())
}
