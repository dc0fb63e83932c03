use crate::error::TensorGraphError;
use crate::ops::activation::unary_shape;
use crate::ops::{expect_inputs, Op};
use crate::tensor::Tensor;

/// Softmax over the last dimension; every row of the output sums to one.
#[derive(Debug, Clone, Default)]
pub struct Softmax;

impl Softmax {
    pub fn new() -> Self {
        Softmax
    }
}

fn last_dim(t: &Tensor) -> usize {
    t.shape().last().copied().unwrap_or(0)
}

fn softmax_rows(x: &Tensor) -> Tensor {
    let mut y = x.clone();
    let width = last_dim(x);
    if width == 0 {
        return y;
    }
    for row in y.data_mut().chunks_mut(width) {
        let max = row.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        let mut total = 0.0;
        for v in row.iter_mut() {
            *v = (*v - max).exp();
            total += *v;
        }
        row.iter_mut().for_each(|v| *v /= total);
    }
    y
}

impl Op for Softmax {
    fn descriptor(&self) -> &'static str {
        "Softmax"
    }

    fn compute_output_shape(&self, input_shapes: &[Vec<usize>]) -> Result<Vec<usize>, TensorGraphError> {
        unary_shape(self.descriptor(), input_shapes)
    }

    fn forward(&self, inputs: &[&Tensor], output: &mut Tensor, _is_training: bool) -> Result<(), TensorGraphError> {
        expect_inputs(self.descriptor(), 1, inputs.len())?;
        output.assign(&softmax_rows(inputs[0]))
    }

    fn backward(&mut self, inputs: &[&Tensor], error_signal: &Tensor) -> Result<Vec<Tensor>, TensorGraphError> {
        expect_inputs(self.descriptor(), 1, inputs.len())?;
        let y = softmax_rows(inputs[0]);
        let mut grad = error_signal.mul(&y)?;
        let width = last_dim(&y);
        if width > 0 {
            // dx = y * (e - sum(e * y)) per row
            for (g, y_row) in grad.data_mut().chunks_mut(width).zip(y.data().chunks(width)) {
                let dot: f32 = g.iter().sum();
                for (gi, yi) in g.iter_mut().zip(y_row) {
                    *gi -= yi * dot;
                }
            }
        }
        Ok(vec![grad])
    }
}

#[cfg(test)]
#[path = "softmax_test.rs"]
mod tests;
