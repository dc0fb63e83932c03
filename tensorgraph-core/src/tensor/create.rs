// src/tensor/create.rs

use crate::tensor::utils::numel;
use crate::tensor::Tensor;

/// Creates a new tensor filled with zeros with the specified shape.
pub fn zeros(shape: &[usize]) -> Tensor {
    full(shape, 0.0)
}

/// Creates a new tensor filled with ones with the specified shape.
pub fn ones(shape: &[usize]) -> Tensor {
    full(shape, 1.0)
}

/// Creates a new tensor filled with a specific value with the specified shape.
pub fn full(shape: &[usize], value: f32) -> Tensor {
    Tensor {
        shape: shape.to_vec(),
        data: vec![value; numel(shape)],
    }
}

/// Creates a tensor of zeros with the same shape as `tensor`.
pub fn zeros_like(tensor: &Tensor) -> Tensor {
    zeros(tensor.shape())
}

/// Creates a tensor of ones with the same shape as `tensor`.
pub fn ones_like(tensor: &Tensor) -> Tensor {
    ones(tensor.shape())
}

#[cfg(test)]
#[path = "create_test.rs"]
mod tests;
