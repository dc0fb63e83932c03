use crate::error::TensorGraphError;
use crate::ops::{expect_inputs, Op};
use crate::tensor::Tensor;

/// `mean((prediction - target)^2)` over all elements. Inputs are `[prediction, target]`.
#[derive(Debug, Clone, Default)]
pub struct MeanSquareErrorLoss;

impl MeanSquareErrorLoss {
    pub fn new() -> Self {
        MeanSquareErrorLoss
    }
}

impl Op for MeanSquareErrorLoss {
    fn descriptor(&self) -> &'static str {
        "MeanSquareErrorLoss"
    }

    fn compute_output_shape(&self, input_shapes: &[Vec<usize>]) -> Result<Vec<usize>, TensorGraphError> {
        expect_inputs(self.descriptor(), 2, input_shapes.len())?;
        if input_shapes[0] != input_shapes[1] {
            return Err(TensorGraphError::ShapeMismatch {
                expected: input_shapes[0].clone(),
                actual: input_shapes[1].clone(),
                operation: self.descriptor().to_string(),
            });
        }
        Ok(vec![1, 1])
    }

    fn forward(&self, inputs: &[&Tensor], output: &mut Tensor, _is_training: bool) -> Result<(), TensorGraphError> {
        expect_inputs(self.descriptor(), 2, inputs.len())?;
        let diff = inputs[0].sub(inputs[1])?;
        let n = diff.numel().max(1) as f32;
        let loss = diff.mul(&diff)?.sum() / n;
        output.assign(&Tensor::scalar(loss))
    }

    fn backward(&mut self, inputs: &[&Tensor], error_signal: &Tensor) -> Result<Vec<Tensor>, TensorGraphError> {
        expect_inputs(self.descriptor(), 2, inputs.len())?;
        let upstream = error_signal.data().first().copied().unwrap_or(0.0);
        let diff = inputs[0].sub(inputs[1])?;
        let n = diff.numel().max(1) as f32;
        let grad_prediction = diff.scale(2.0 * upstream / n);
        let grad_target = grad_prediction.scale(-1.0);
        Ok(vec![grad_prediction, grad_target])
    }
}

#[cfg(test)]
#[path = "mse_test.rs"]
mod tests;
