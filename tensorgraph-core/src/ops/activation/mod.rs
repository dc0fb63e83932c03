// src/ops/activation/mod.rs

//! # Activation Functions
//!
//! Element-wise and row-wise non-linearities. All of them take exactly one input and
//! produce an output of the same shape.

pub mod relu;
pub mod sigmoid;
pub mod softmax;

pub use relu::Relu;
pub use sigmoid::Sigmoid;
pub use softmax::Softmax;

use crate::error::TensorGraphError;
use crate::ops::expect_inputs;

/// Shape rule shared by the activations: one input, same shape out.
pub(crate) fn unary_shape(operation: &str, input_shapes: &[Vec<usize>]) -> Result<Vec<usize>, TensorGraphError> {
    expect_inputs(operation, 1, input_shapes.len())?;
    Ok(input_shapes[0].clone())
}
