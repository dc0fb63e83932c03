use crate::error::TensorGraphError;
use crate::nn::init::{initialise, WeightsInit};
use crate::nn::Parameter;
use crate::ops::{expect_inputs, DataHolder, Op};
use crate::tensor::Tensor;

/// Trainable leaf op. Its output is the parameter tensor itself and the error signal
/// arriving at it is accumulated as the parameter's gradient.
///
/// A `Weights` instance may back several nodes at once (weight tying).
#[derive(Debug, Clone, Default)]
pub struct Weights {
    parameter: Parameter,
}

impl Weights {
    pub fn new(weights: Tensor) -> Self {
        Weights {
            parameter: Parameter::new(weights),
        }
    }

    /// Weights of `shape` drawn from `init`.
    pub fn with_init(shape: &[usize], init: WeightsInit, seed: u64) -> Result<Self, TensorGraphError> {
        Ok(Weights::new(initialise(shape, init, seed)?))
    }

    /// Weights to be set later through `Graph::set_input` or a state dict.
    pub fn empty() -> Self {
        Weights::default()
    }
}

impl Op for Weights {
    fn descriptor(&self) -> &'static str {
        "Weights"
    }

    fn compute_output_shape(&self, input_shapes: &[Vec<usize>]) -> Result<Vec<usize>, TensorGraphError> {
        expect_inputs(self.descriptor(), 0, input_shapes.len())?;
        Ok(self.parameter.weights().shape().to_vec())
    }

    fn forward(&self, _inputs: &[&Tensor], output: &mut Tensor, _is_training: bool) -> Result<(), TensorGraphError> {
        if !self.parameter.is_initialised() {
            return Err(TensorGraphError::InvalidMode(
                "Weights evaluated before initialisation".to_string(),
            ));
        }
        output.assign(self.parameter.weights())
    }

    fn backward(&mut self, _inputs: &[&Tensor], error_signal: &Tensor) -> Result<Vec<Tensor>, TensorGraphError> {
        self.parameter.accumulate_gradient(error_signal)?;
        Ok(Vec::new())
    }

    fn known_output_shape(&self) -> Option<Vec<usize>> {
        self.parameter
            .is_initialised()
            .then(|| self.parameter.weights().shape().to_vec())
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

impl DataHolder for Weights {
    fn set_data(&mut self, data: Tensor) -> Result<bool, TensorGraphError> {
        self.parameter.set_weights(data)
    }

    fn data(&self) -> &Tensor {
        self.parameter.weights()
    }
}

#[cfg(test)]
#[path = "weights_test.rs"]
mod tests;
