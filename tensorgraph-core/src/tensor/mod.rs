// src/tensor/mod.rs

use crate::error::{NumericIssue, TensorGraphError};

mod arithmetic;
pub mod create;
pub mod utils;

pub use create::{full, ones, ones_like, zeros, zeros_like};

/// A dense, row-major `f32` tensor.
///
/// This is the value type flowing along graph edges: node caches, error signals,
/// parameters and gradient accumulators are all `Tensor`s. Cloning copies the data.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Tensor {
    pub(crate) shape: Vec<usize>,
    pub(crate) data: Vec<f32>,
}

impl Tensor {
    /// Creates a new Tensor from row-major data and a shape.
    ///
    /// # Errors
    /// Returns `TensorGraphError::TensorCreationError` if `data.len()` does not match
    /// the number of elements described by `shape`.
    pub fn new(data: Vec<f32>, shape: Vec<usize>) -> Result<Self, TensorGraphError> {
        let numel = utils::numel(&shape);
        if data.len() != numel {
            return Err(TensorGraphError::TensorCreationError {
                data_len: data.len(),
                shape,
            });
        }
        Ok(Tensor { shape, data })
    }

    /// Creates a `[1, 1]` tensor holding a single value.
    pub fn scalar(value: f32) -> Self {
        Tensor {
            shape: vec![1, 1],
            data: vec![value],
        }
    }

    /// Builds a rank-2 tensor from equally sized rows.
    pub fn from_rows(rows: &[Vec<f32>]) -> Result<Self, TensorGraphError> {
        let cols = rows.first().map_or(0, |r| r.len());
        let mut data = Vec::with_capacity(rows.len() * cols);
        for row in rows {
            if row.len() != cols {
                return Err(TensorGraphError::ShapeMismatch {
                    expected: vec![cols],
                    actual: vec![row.len()],
                    operation: "from_rows".to_string(),
                });
            }
            data.extend_from_slice(row);
        }
        Tensor::new(data, vec![rows.len(), cols])
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [f32] {
        &mut self.data
    }

    /// Consumes the tensor and returns its flat data.
    pub fn into_data(self) -> Vec<f32> {
        self.data
    }

    pub fn numel(&self) -> usize {
        self.data.len()
    }

    pub fn rank(&self) -> usize {
        self.shape.len()
    }

    /// True for a tensor that carries no shape at all (the "unset" tensor).
    pub fn is_empty(&self) -> bool {
        self.shape.is_empty()
    }

    /// Returns the strides of the (always contiguous) layout.
    pub fn strides(&self) -> Vec<usize> {
        utils::calculate_strides(&self.shape)
    }

    fn flat_index(&self, index: &[usize]) -> Result<usize, TensorGraphError> {
        if index.len() != self.shape.len() {
            return Err(TensorGraphError::ShapeMismatch {
                expected: vec![self.shape.len()],
                actual: vec![index.len()],
                operation: "index".to_string(),
            });
        }
        let strides = self.strides();
        let mut offset = 0;
        for ((&i, &dim), stride) in index.iter().zip(self.shape.iter()).zip(strides) {
            if i >= dim {
                return Err(TensorGraphError::IndexOutOfBounds { index: i, size: dim });
            }
            offset += i * stride;
        }
        Ok(offset)
    }

    /// Reads the element at a multi-dimensional index.
    pub fn get(&self, index: &[usize]) -> Result<f32, TensorGraphError> {
        let offset = self.flat_index(index)?;
        Ok(self.data[offset])
    }

    /// Writes the element at a multi-dimensional index.
    pub fn set(&mut self, index: &[usize], value: f32) -> Result<(), TensorGraphError> {
        let offset = self.flat_index(index)?;
        self.data[offset] = value;
        Ok(())
    }

    /// Number of elements in one slice along the first dimension.
    pub fn row_len(&self) -> usize {
        match self.shape.split_first() {
            Some((_, rest)) => utils::numel(rest),
            None => 0,
        }
    }

    /// Number of slices along the first dimension.
    pub fn rows(&self) -> usize {
        self.shape.first().copied().unwrap_or(0)
    }

    /// Returns the `index`-th slice along the first dimension.
    pub fn row(&self, index: usize) -> Result<&[f32], TensorGraphError> {
        let rows = self.rows();
        if index >= rows {
            return Err(TensorGraphError::IndexOutOfBounds { index, size: rows });
        }
        let len = self.row_len();
        Ok(&self.data[index * len..(index + 1) * len])
    }

    pub fn row_mut(&mut self, index: usize) -> Result<&mut [f32], TensorGraphError> {
        let rows = self.rows();
        if index >= rows {
            return Err(TensorGraphError::IndexOutOfBounds { index, size: rows });
        }
        let len = self.row_len();
        Ok(&mut self.data[index * len..(index + 1) * len])
    }

    /// Returns a copy with a new shape holding the same number of elements.
    pub fn reshape(&self, shape: Vec<usize>) -> Result<Tensor, TensorGraphError> {
        if utils::numel(&shape) != self.numel() {
            return Err(TensorGraphError::ShapeMismatch {
                expected: self.shape.clone(),
                actual: shape,
                operation: "reshape".to_string(),
            });
        }
        Ok(Tensor {
            shape,
            data: self.data.clone(),
        })
    }

    /// Sets every element to `value`.
    pub fn fill(&mut self, value: f32) {
        self.data.iter_mut().for_each(|x| *x = value);
    }

    /// Copies the values of `other` into `self`; shapes must match.
    pub fn assign(&mut self, other: &Tensor) -> Result<(), TensorGraphError> {
        utils::check_same_shape(&self.shape, &other.shape, "assign")?;
        self.data.copy_from_slice(&other.data);
        Ok(())
    }

    /// Element-wise closeness: `|a - b| <= atol + rtol * |b|`, shapes must be equal.
    pub fn all_close(&self, other: &Tensor, rtol: f32, atol: f32) -> bool {
        self.shape == other.shape
            && self
                .data
                .iter()
                .zip(other.data.iter())
                .all(|(a, b)| (a - b).abs() <= atol + rtol * b.abs())
    }

    /// Reports the first non-finite value, if any. NaN takes precedence over infinity.
    pub fn non_finite(&self) -> Option<NumericIssue> {
        let mut found = None;
        for x in &self.data {
            if x.is_nan() {
                return Some(NumericIssue::NaN);
            }
            if x.is_infinite() {
                found = Some(NumericIssue::Infinity);
            }
        }
        found
    }
}

#[cfg(test)]
mod tests;
