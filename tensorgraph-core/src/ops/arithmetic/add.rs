use crate::error::TensorGraphError;
use crate::ops::arithmetic::broadcast_row_shape;
use crate::ops::{expect_inputs, Op};
use crate::tensor::Tensor;

/// Element-wise `a + b`. `b` may also be a `[1, n]` row added to every row of `a`.
#[derive(Debug, Clone, Default)]
pub struct Add;

impl Add {
    pub fn new() -> Self {
        Add
    }
}

impl Op for Add {
    fn descriptor(&self) -> &'static str {
        "Add"
    }

    fn compute_output_shape(&self, input_shapes: &[Vec<usize>]) -> Result<Vec<usize>, TensorGraphError> {
        expect_inputs(self.descriptor(), 2, input_shapes.len())?;
        broadcast_row_shape(self.descriptor(), &input_shapes[0], &input_shapes[1])
    }

    fn forward(&self, inputs: &[&Tensor], output: &mut Tensor, _is_training: bool) -> Result<(), TensorGraphError> {
        expect_inputs(self.descriptor(), 2, inputs.len())?;
        let (a, b) = (inputs[0], inputs[1]);
        let sum = if a.shape() == b.shape() {
            a.add(b)?
        } else {
            a.add_row_broadcast(b)?
        };
        output.assign(&sum)
    }

    fn backward(&mut self, inputs: &[&Tensor], error_signal: &Tensor) -> Result<Vec<Tensor>, TensorGraphError> {
        expect_inputs(self.descriptor(), 2, inputs.len())?;
        let grad_b = if inputs[1].shape() == error_signal.shape() {
            error_signal.clone()
        } else {
            error_signal.sum_rows()?
        };
        Ok(vec![error_signal.clone(), grad_b])
    }
}

#[cfg(test)]
#[path = "add_test.rs"]
mod tests;
