use crate::error::TensorGraphError;
use crate::nn::init::{initialise, WeightsInit};
use crate::nn::Parameter;
use crate::ops::{expect_inputs, DataHolder, Op};
use crate::tensor::{zeros_like, Tensor};

/// Lookup table op: each element of the input is a row index into a `[vocab, dim]`
/// parameter, and the output stacks the selected rows into `[numel(input), dim]`.
///
/// Gradients are accumulated sparsely, only into the rows that were looked up.
#[derive(Debug, Clone)]
pub struct Embeddings {
    parameter: Parameter,
}

impl Embeddings {
    pub fn new(weights: Tensor) -> Self {
        Embeddings {
            parameter: Parameter::new(weights),
        }
    }

    pub fn with_init(
        vocabulary_size: usize,
        dimensions: usize,
        init: WeightsInit,
        seed: u64,
    ) -> Result<Self, TensorGraphError> {
        Ok(Embeddings::new(initialise(&[vocabulary_size, dimensions], init, seed)?))
    }

    fn dimensions(&self) -> usize {
        self.parameter.weights().row_len()
    }

    fn row_index(&self, value: f32) -> Result<usize, TensorGraphError> {
        let vocab = self.parameter.weights().rows();
        if value < 0.0 || value.fract() != 0.0 || !value.is_finite() {
            return Err(TensorGraphError::InvalidMode(format!(
                "embedding index {} is not a non-negative integer",
                value
            )));
        }
        let index = value as usize;
        if index >= vocab {
            return Err(TensorGraphError::IndexOutOfBounds { index, size: vocab });
        }
        Ok(index)
    }
}

impl Op for Embeddings {
    fn descriptor(&self) -> &'static str {
        "Embeddings"
    }

    fn compute_output_shape(&self, input_shapes: &[Vec<usize>]) -> Result<Vec<usize>, TensorGraphError> {
        expect_inputs(self.descriptor(), 1, input_shapes.len())?;
        let count: usize = input_shapes[0].iter().product();
        Ok(vec![count, self.dimensions()])
    }

    fn forward(&self, inputs: &[&Tensor], output: &mut Tensor, _is_training: bool) -> Result<(), TensorGraphError> {
        expect_inputs(self.descriptor(), 1, inputs.len())?;
        let dims = self.dimensions();
        let mut data = Vec::with_capacity(inputs[0].numel() * dims);
        for &value in inputs[0].data() {
            let row = self.row_index(value)?;
            data.extend_from_slice(self.parameter.weights().row(row)?);
        }
        output.assign(&Tensor::new(data, vec![inputs[0].numel(), dims])?)
    }

    fn backward(&mut self, inputs: &[&Tensor], error_signal: &Tensor) -> Result<Vec<Tensor>, TensorGraphError> {
        expect_inputs(self.descriptor(), 1, inputs.len())?;
        let indices = inputs[0];
        if error_signal.rows() != indices.numel() {
            return Err(TensorGraphError::ShapeMismatch {
                expected: vec![indices.numel(), self.dimensions()],
                actual: error_signal.shape().to_vec(),
                operation: "Embeddings::backward".to_string(),
            });
        }
        for (i, &value) in indices.data().iter().enumerate() {
            let row = self.row_index(value)?;
            self.parameter.accumulate_sparse_gradient(row, error_signal.row(i)?)?;
        }
        // Indices are not differentiable.
        Ok(vec![zeros_like(indices)])
    }

    fn is_shareable(&self) -> bool {
        true
    }

    fn parameter(&self) -> Option<&Parameter> {
        Some(&self.parameter)
    }

    fn parameter_mut(&mut self) -> Option<&mut Parameter> {
        Some(&mut self.parameter)
    }

    fn as_data_holder_mut(&mut self) -> Option<&mut dyn DataHolder> {
        Some(self)
    }
}

impl DataHolder for Embeddings {
    fn set_data(&mut self, data: Tensor) -> Result<bool, TensorGraphError> {
        self.parameter.set_weights(data)
    }

    fn data(&self) -> &Tensor {
        self.parameter.weights()
    }
}

#[cfg(test)]
#[path = "embeddings_test.rs"]
mod tests;
