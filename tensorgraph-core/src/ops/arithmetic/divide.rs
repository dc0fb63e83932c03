use crate::error::TensorGraphError;
use crate::ops::{expect_inputs, Op};
use crate::tensor::Tensor;

/// Element-wise `a / b`. `b` is either the same shape as `a` or a single `[1, 1]` value.
///
/// A zero anywhere in `b` fails the forward pass with
/// [`TensorGraphError::DivisionByZero`].
#[derive(Debug, Clone, Default)]
pub struct Divide;

impl Divide {
    pub fn new() -> Self {
        Divide
    }
}

fn is_scalar(t: &Tensor) -> bool {
    t.numel() == 1
}

impl Op for Divide {
    fn descriptor(&self) -> &'static str {
        "Divide"
    }

    fn compute_output_shape(&self, input_shapes: &[Vec<usize>]) -> Result<Vec<usize>, TensorGraphError> {
        expect_inputs(self.descriptor(), 2, input_shapes.len())?;
        let (a, b) = (&input_shapes[0], &input_shapes[1]);
        if a == b || b.iter().product::<usize>() == 1 {
            Ok(a.clone())
        } else {
            Err(TensorGraphError::ShapeMismatch {
                expected: a.clone(),
                actual: b.clone(),
                operation: self.descriptor().to_string(),
            })
        }
    }

    fn forward(&self, inputs: &[&Tensor], output: &mut Tensor, _is_training: bool) -> Result<(), TensorGraphError> {
        expect_inputs(self.descriptor(), 2, inputs.len())?;
        let (a, b) = (inputs[0], inputs[1]);
        if b.data().iter().any(|&x| x == 0.0) {
            return Err(TensorGraphError::DivisionByZero);
        }
        let quotient = if is_scalar(b) && a.shape() != b.shape() {
            let divisor = b.data()[0];
            a.map(|x| x / divisor)
        } else {
            a.div(b)?
        };
        output.assign(&quotient)
    }

    fn backward(&mut self, inputs: &[&Tensor], error_signal: &Tensor) -> Result<Vec<Tensor>, TensorGraphError> {
        expect_inputs(self.descriptor(), 2, inputs.len())?;
        let (a, b) = (inputs[0], inputs[1]);
        if is_scalar(b) && a.shape() != b.shape() {
            let d = b.data()[0];
            let grad_a = error_signal.scale(1.0 / d);
            // dL/db = sum(-e * a / d^2)
            let grad_b: f32 = error_signal.mul(a)?.sum() * (-1.0 / (d * d));
            let grad_b = Tensor::new(vec![grad_b], b.shape().to_vec())?;
            return Ok(vec![grad_a, grad_b]);
        }
        let grad_a = error_signal.div(b)?;
        let b_squared = b.mul(b)?;
        let grad_b = error_signal.mul(a)?.div(&b_squared)?.scale(-1.0);
        Ok(vec![grad_a, grad_b])
    }
}

#[cfg(test)]
#[path = "divide_test.rs"]
mod tests;
