use crate::error::TensorGraphError;
use crate::ops::activation::unary_shape;
use crate::ops::{expect_inputs, Op};
use crate::tensor::Tensor;

/// Logistic function `1 / (1 + e^-x)`.
#[derive(Debug, Clone, Default)]
pub struct Sigmoid;

impl Sigmoid {
    pub fn new() -> Self {
        Sigmoid
    }
}

fn sigmoid(x: f32) -> f32 {
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let e = x.exp();
        e / (1.0 + e)
    }
}

impl Op for Sigmoid {
    fn descriptor(&self) -> &'static str {
        "Sigmoid"
    }

    fn compute_output_shape(&self, input_shapes: &[Vec<usize>]) -> Result<Vec<usize>, TensorGraphError> {
        unary_shape(self.descriptor(), input_shapes)
    }

    fn forward(&self, inputs: &[&Tensor], output: &mut Tensor, _is_training: bool) -> Result<(), TensorGraphError> {
        expect_inputs(self.descriptor(), 1, inputs.len())?;
        output.assign(&inputs[0].map(sigmoid))
    }

    fn backward(&mut self, inputs: &[&Tensor], error_signal: &Tensor) -> Result<Vec<Tensor>, TensorGraphError> {
        expect_inputs(self.descriptor(), 1, inputs.len())?;
        let local = inputs[0].map(|x| {
            let y = sigmoid(x);
            y * (1.0 - y)
        });
        Ok(vec![error_signal.mul(&local)?])
    }
}

#[cfg(test)]
#[path = "sigmoid_test.rs"]
mod tests;
