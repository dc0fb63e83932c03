use crate::error::TensorGraphError;
use crate::ops::{expect_inputs, Op};
use crate::tensor::Tensor;

/// `a @ b` for `[m, k]` and `[k, n]` inputs.
#[derive(Debug, Clone, Default)]
pub struct MatrixMultiply;

impl MatrixMultiply {
    pub fn new() -> Self {
        MatrixMultiply
    }
}

impl Op for MatrixMultiply {
    fn descriptor(&self) -> &'static str {
        "MatrixMultiply"
    }

    fn compute_output_shape(&self, input_shapes: &[Vec<usize>]) -> Result<Vec<usize>, TensorGraphError> {
        expect_inputs(self.descriptor(), 2, input_shapes.len())?;
        match (input_shapes[0].as_slice(), input_shapes[1].as_slice()) {
            ([m, k], [k2, n]) if k == k2 => Ok(vec![*m, *n]),
            _ => Err(TensorGraphError::ShapeMismatch {
                expected: input_shapes[0].clone(),
                actual: input_shapes[1].clone(),
                operation: "MatrixMultiply".to_string(),
            }),
        }
    }

    fn forward(&self, inputs: &[&Tensor], output: &mut Tensor, _is_training: bool) -> Result<(), TensorGraphError> {
        expect_inputs(self.descriptor(), 2, inputs.len())?;
        output.assign(&inputs[0].matmul(inputs[1])?)
    }

    fn backward(&mut self, inputs: &[&Tensor], error_signal: &Tensor) -> Result<Vec<Tensor>, TensorGraphError> {
        expect_inputs(self.descriptor(), 2, inputs.len())?;
        let (a, b) = (inputs[0], inputs[1]);
        // dL/da = e @ b^T, dL/db = a^T @ e
        let grad_a = error_signal.matmul(&b.transpose()?)?;
        let grad_b = a.transpose()?.matmul(error_signal)?;
        Ok(vec![grad_a, grad_b])
    }
}

#[cfg(test)]
#[path = "matmul_test.rs"]
mod tests;
