use super::*;
use crate::tensor::zeros;
use approx::assert_relative_eq;

#[test]
fn test_mse_forward() -> Result<(), TensorGraphError> {
    let op = MeanSquareErrorLoss::new();
    let p = Tensor::new(vec![1.0, 2.0, 3.0, 4.0], vec![2, 2])?;
    let t = Tensor::new(vec![1.0, 0.0, 3.0, 0.0], vec![2, 2])?;
    assert_eq!(op.compute_output_shape(&[vec![2, 2], vec![2, 2]])?, vec![1, 1]);
    let mut out = zeros(&[1, 1]);
    op.forward(&[&p, &t], &mut out, false)?;
    // (0 + 4 + 0 + 16) / 4
    assert_relative_eq!(out.data()[0], 5.0);
    Ok(())
}

#[test]
fn test_mse_backward() -> Result<(), TensorGraphError> {
    let mut op = MeanSquareErrorLoss::new();
    let p = Tensor::new(vec![1.0, 2.0], vec![1, 2])?;
    let t = Tensor::new(vec![0.0, 0.0], vec![1, 2])?;
    let grads = op.backward(&[&p, &t], &Tensor::scalar(1.0))?;
    assert_eq!(grads[0].data(), &[1.0, 2.0]);
    assert_eq!(grads[1].data(), &[-1.0, -2.0]);
    Ok(())
}

#[test]
fn test_mse_shape_mismatch() {
    let op = MeanSquareErrorLoss::new();
    assert!(matches!(
        op.compute_output_shape(&[vec![1, 2], vec![2, 1]]),
        Err(TensorGraphError::ShapeMismatch { .. })
    ));
}
