// src/tensor/arithmetic.rs
//
// Element-wise and matrix arithmetic used by the shipped op kernels and by
// parameter updates.

use crate::error::TensorGraphError;
use crate::tensor::utils::{as_matrix, check_same_shape};
use crate::tensor::Tensor;

impl Tensor {
    fn zip_with<F>(&self, other: &Tensor, operation: &str, f: F) -> Result<Tensor, TensorGraphError>
    where
        F: Fn(f32, f32) -> f32,
    {
        check_same_shape(&self.shape, &other.shape, operation)?;
        let data = self
            .data
            .iter()
            .zip(other.data.iter())
            .map(|(&a, &b)| f(a, b))
            .collect();
        Ok(Tensor {
            shape: self.shape.clone(),
            data,
        })
    }

    /// Element-wise sum of two tensors of equal shape.
    pub fn add(&self, other: &Tensor) -> Result<Tensor, TensorGraphError> {
        self.zip_with(other, "add", |a, b| a + b)
    }

    /// Element-wise difference of two tensors of equal shape.
    pub fn sub(&self, other: &Tensor) -> Result<Tensor, TensorGraphError> {
        self.zip_with(other, "sub", |a, b| a - b)
    }

    /// Element-wise (Hadamard) product of two tensors of equal shape.
    pub fn mul(&self, other: &Tensor) -> Result<Tensor, TensorGraphError> {
        self.zip_with(other, "mul", |a, b| a * b)
    }

    /// Element-wise quotient of two tensors of equal shape. Zero divisors are not checked.
    pub fn div(&self, other: &Tensor) -> Result<Tensor, TensorGraphError> {
        self.zip_with(other, "div", |a, b| a / b)
    }

    /// In-place element-wise addition.
    pub fn add_assign(&mut self, other: &Tensor) -> Result<(), TensorGraphError> {
        check_same_shape(&self.shape, &other.shape, "add_assign")?;
        for (a, b) in self.data.iter_mut().zip(other.data.iter()) {
            *a += *b;
        }
        Ok(())
    }

    /// In-place element-wise subtraction.
    pub fn sub_assign(&mut self, other: &Tensor) -> Result<(), TensorGraphError> {
        check_same_shape(&self.shape, &other.shape, "sub_assign")?;
        for (a, b) in self.data.iter_mut().zip(other.data.iter()) {
            *a -= *b;
        }
        Ok(())
    }

    /// Multiplies every element by `factor`.
    pub fn scale(&self, factor: f32) -> Tensor {
        self.map(|x| x * factor)
    }

    /// Applies `f` to every element.
    pub fn map<F>(&self, f: F) -> Tensor
    where
        F: Fn(f32) -> f32,
    {
        Tensor {
            shape: self.shape.clone(),
            data: self.data.iter().map(|&x| f(x)).collect(),
        }
    }

    /// Sum of all elements.
    pub fn sum(&self) -> f32 {
        self.data.iter().sum()
    }

    /// Adds a `[1, n]` (or `[n]`) row to every row of a `[m, n]` tensor.
    pub fn add_row_broadcast(&self, row: &Tensor) -> Result<Tensor, TensorGraphError> {
        let (rows, cols) = as_matrix(&self.shape, "add_row_broadcast")?;
        if row.numel() != cols {
            return Err(TensorGraphError::ShapeMismatch {
                expected: vec![1, cols],
                actual: row.shape.clone(),
                operation: "add_row_broadcast".to_string(),
            });
        }
        let mut data = self.data.clone();
        for r in 0..rows {
            for (x, b) in data[r * cols..(r + 1) * cols].iter_mut().zip(row.data.iter()) {
                *x += *b;
            }
        }
        Ok(Tensor {
            shape: self.shape.clone(),
            data,
        })
    }

    /// Column sums of a `[m, n]` tensor, returned as `[1, n]`.
    pub fn sum_rows(&self) -> Result<Tensor, TensorGraphError> {
        let (rows, cols) = as_matrix(&self.shape, "sum_rows")?;
        let mut data = vec![0.0; cols];
        for r in 0..rows {
            for (acc, x) in data.iter_mut().zip(self.data[r * cols..(r + 1) * cols].iter()) {
                *acc += *x;
            }
        }
        Ok(Tensor {
            shape: vec![1, cols],
            data,
        })
    }

    /// Matrix product of `[m, k]` and `[k, n]` tensors.
    pub fn matmul(&self, other: &Tensor) -> Result<Tensor, TensorGraphError> {
        let (m, k) = as_matrix(&self.shape, "matmul")?;
        let (k2, n) = as_matrix(&other.shape, "matmul")?;
        if k != k2 {
            return Err(TensorGraphError::ShapeMismatch {
                expected: vec![k, n],
                actual: other.shape.clone(),
                operation: "matmul".to_string(),
            });
        }
        let mut data = vec![0.0; m * n];
        for i in 0..m {
            for p in 0..k {
                let a = self.data[i * k + p];
                if a == 0.0 {
                    continue;
                }
                let b_row = &other.data[p * n..(p + 1) * n];
                for (out, b) in data[i * n..(i + 1) * n].iter_mut().zip(b_row.iter()) {
                    *out += a * b;
                }
            }
        }
        Ok(Tensor {
            shape: vec![m, n],
            data,
        })
    }

    /// Transpose of a rank-2 tensor.
    pub fn transpose(&self) -> Result<Tensor, TensorGraphError> {
        let (rows, cols) = as_matrix(&self.shape, "transpose")?;
        let mut data = vec![0.0; rows * cols];
        for r in 0..rows {
            for c in 0..cols {
                data[c * rows + r] = self.data[r * cols + c];
            }
        }
        Ok(Tensor {
            shape: vec![cols, rows],
            data,
        })
    }
}
