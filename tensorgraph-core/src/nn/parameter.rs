use crate::error::TensorGraphError;
use crate::graph::StateDict;
use crate::nn::regulariser::Regulariser;
use crate::tensor::{zeros_like, Tensor};
use log::debug;
use std::collections::BTreeSet;

/// Learnable state owned by a trainable op: the parameter tensor, its gradient
/// accumulator and the bookkeeping for sparse (row-indexed) updates.
///
/// The gradient accumulator always has the same shape as the weights. When
/// `updated_rows` is non-empty only those rows of the accumulator are populated and
/// every other row is zero. Once a dense gradient has been accumulated the
/// accumulator stays dense until it is reset, and later sparse contributions are not
/// tracked by row.
#[derive(Debug, Clone, Default)]
pub struct Parameter {
    weights: Tensor,
    gradients: Tensor,
    updated_rows: BTreeSet<usize>,
    dense: bool,
    frozen: bool,
    regulariser: Option<Regulariser>,
    regularisation_rate: f32,
}

impl Parameter {
    /// Creates a new Parameter from a weight tensor, with a zeroed gradient accumulator.
    pub fn new(weights: Tensor) -> Self {
        let gradients = zeros_like(&weights);
        Parameter {
            weights,
            gradients,
            ..Default::default()
        }
    }

    /// A parameter with no weights yet; filled later through `set_weights`.
    pub fn uninitialised() -> Self {
        Parameter::default()
    }

    pub fn is_initialised(&self) -> bool {
        !self.weights.is_empty()
    }

    pub fn weights(&self) -> &Tensor {
        &self.weights
    }

    pub fn gradients(&self) -> &Tensor {
        &self.gradients
    }

    pub fn updated_rows(&self) -> &BTreeSet<usize> {
        &self.updated_rows
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    pub fn set_frozen(&mut self, frozen: bool) {
        self.frozen = frozen;
    }

    pub fn regulariser(&self) -> Option<(Regulariser, f32)> {
        self.regulariser.map(|r| (r, self.regularisation_rate))
    }

    pub fn set_regularisation(&mut self, regulariser: Option<Regulariser>, rate: f32) {
        self.regulariser = regulariser;
        self.regularisation_rate = rate;
    }

    /// Replaces the weights. Returns `true` when the shape changed, in which case the
    /// gradient accumulator is reallocated.
    pub fn set_weights(&mut self, weights: Tensor) -> Result<bool, TensorGraphError> {
        if weights.is_empty() {
            return Err(TensorGraphError::InvalidMode(
                "cannot set weights to an empty tensor".to_string(),
            ));
        }
        let shape_changed = weights.shape() != self.weights.shape();
        self.weights = weights;
        if shape_changed {
            self.gradients = zeros_like(&self.weights);
            self.updated_rows.clear();
            self.dense = false;
        }
        Ok(shape_changed)
    }

    /// Adds a dense gradient to the accumulator. Frozen parameters ignore it.
    pub fn accumulate_gradient(&mut self, gradient: &Tensor) -> Result<(), TensorGraphError> {
        if self.frozen {
            return Ok(());
        }
        self.gradients.add_assign(gradient)?;
        // A dense contribution touches every row.
        self.updated_rows.clear();
        self.dense = true;
        Ok(())
    }

    /// Adds `values` to a single row of the accumulator and records the row.
    pub fn accumulate_sparse_gradient(
        &mut self,
        row: usize,
        values: &[f32],
    ) -> Result<(), TensorGraphError> {
        if self.frozen {
            return Ok(());
        }
        let target = self.gradients.row_mut(row)?;
        if target.len() != values.len() {
            return Err(TensorGraphError::ShapeMismatch {
                expected: vec![target.len()],
                actual: vec![values.len()],
                operation: "accumulate_sparse_gradient".to_string(),
            });
        }
        for (acc, v) in target.iter_mut().zip(values) {
            *acc += *v;
        }
        if !self.dense {
            self.updated_rows.insert(row);
        }
        Ok(())
    }

    /// `weights -= gradient`, then clears the accumulator.
    pub fn apply_gradient(&mut self, gradient: &Tensor) -> Result<(), TensorGraphError> {
        if !self.frozen {
            self.weights.sub_assign(gradient)?;
        }
        self.reset_gradients();
        Ok(())
    }

    /// Like [`Parameter::apply_gradient`] but only for `rows`; an empty set means dense.
    pub fn apply_sparse_gradient(
        &mut self,
        gradient: &Tensor,
        rows: &BTreeSet<usize>,
    ) -> Result<(), TensorGraphError> {
        if rows.is_empty() {
            return self.apply_gradient(gradient);
        }
        if gradient.shape() != self.weights.shape() {
            return Err(TensorGraphError::ShapeMismatch {
                expected: self.weights.shape().to_vec(),
                actual: gradient.shape().to_vec(),
                operation: "apply_sparse_gradient".to_string(),
            });
        }
        if !self.frozen {
            for &row in rows {
                let update = gradient.row(row)?;
                for (w, g) in self.weights.row_mut(row)?.iter_mut().zip(update) {
                    *w -= *g;
                }
            }
        }
        self.reset_gradients();
        Ok(())
    }

    /// `weights -= learning_rate * accumulated_gradient`, honouring sparse rows.
    pub fn step(&mut self, learning_rate: f32) -> Result<(), TensorGraphError> {
        let update = self.gradients.scale(learning_rate);
        let rows = self.updated_rows.clone();
        self.apply_sparse_gradient(&update, &rows)
    }

    /// Zeros the accumulator. Only the recorded rows are touched after a sparse pass.
    pub fn reset_gradients(&mut self) {
        self.dense = false;
        if self.updated_rows.is_empty() {
            self.gradients.fill(0.0);
        } else {
            let rows = std::mem::take(&mut self.updated_rows);
            for row in rows {
                if let Ok(r) = self.gradients.row_mut(row) {
                    r.iter_mut().for_each(|x| *x = 0.0);
                }
            }
        }
    }

    /// Adds the regulariser's gradient to the accumulator.
    pub fn apply_regularisation(&mut self) -> Result<(), TensorGraphError> {
        let Some(regulariser) = self.regulariser else {
            return Ok(());
        };
        if self.frozen || !self.is_initialised() {
            return Ok(());
        }
        let rate = self.regularisation_rate;
        if self.updated_rows.is_empty() {
            let penalty = self.weights.map(|w| regulariser.gradient(w, rate));
            self.gradients.add_assign(&penalty)?;
        } else {
            for &row in &self.updated_rows {
                let weights = self.weights.row(row)?;
                for (g, w) in self.gradients.row_mut(row)?.iter_mut().zip(weights) {
                    *g += regulariser.gradient(*w, rate);
                }
            }
        }
        Ok(())
    }

    pub fn state_dict(&self) -> StateDict {
        StateDict::leaf(self.weights.clone())
    }

    pub fn load_state_dict(&mut self, dict: &StateDict) -> Result<(), TensorGraphError> {
        let weights = dict.weights.as_ref().ok_or_else(|| {
            TensorGraphError::StateDictMismatch("entry holds no weights".to_string())
        })?;
        if self.is_initialised() && weights.shape() != self.weights.shape() {
            return Err(TensorGraphError::ShapeMismatch {
                expected: self.weights.shape().to_vec(),
                actual: weights.shape().to_vec(),
                operation: "load_state_dict".to_string(),
            });
        }
        debug!("Loading parameter of shape {:?}", weights.shape());
        self.set_weights(weights.clone())?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "parameter_test.rs"]
mod tests;
