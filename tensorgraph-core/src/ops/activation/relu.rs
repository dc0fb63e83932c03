use crate::error::TensorGraphError;
use crate::ops::activation::unary_shape;
use crate::ops::{expect_inputs, Op};
use crate::tensor::Tensor;

/// Rectified Linear Unit: `max(0, x)`.
#[derive(Debug, Clone, Default)]
pub struct Relu;

impl Relu {
    pub fn new() -> Self {
        Relu
    }
}

impl Op for Relu {
    fn descriptor(&self) -> &'static str {
        "Relu"
    }

    fn compute_output_shape(&self, input_shapes: &[Vec<usize>]) -> Result<Vec<usize>, TensorGraphError> {
        unary_shape(self.descriptor(), input_shapes)
    }

    fn forward(&self, inputs: &[&Tensor], output: &mut Tensor, _is_training: bool) -> Result<(), TensorGraphError> {
        expect_inputs(self.descriptor(), 1, inputs.len())?;
        output.assign(&inputs[0].map(|x| if x > 0.0 { x } else { 0.0 }))
    }

    fn backward(&mut self, inputs: &[&Tensor], error_signal: &Tensor) -> Result<Vec<Tensor>, TensorGraphError> {
        expect_inputs(self.descriptor(), 1, inputs.len())?;
        // grad = e * (x > 0)
        let mask = inputs[0].map(|x| if x > 0.0 { 1.0 } else { 0.0 });
        Ok(vec![error_signal.mul(&mask)?])
    }
}

#[cfg(test)]
#[path = "relu_test.rs"]
mod tests;
