use crate::error::TensorGraphError;
use crate::tensor::Tensor;
use std::collections::BTreeMap;

/// Nested map from parameter name to tensor value.
///
/// A graph's dict holds one child per trainable, each child holding that
/// trainable's weights.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StateDict {
    pub weights: Option<Tensor>,
    pub dict: BTreeMap<String, StateDict>,
}

impl StateDict {
    pub fn new() -> Self {
        StateDict::default()
    }

    pub fn leaf(weights: Tensor) -> Self {
        StateDict {
            weights: Some(weights),
            dict: BTreeMap::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_none() && self.dict.is_empty()
    }

    pub fn insert(&mut self, name: impl Into<String>, entry: StateDict) {
        self.dict.insert(name.into(), entry);
    }

    pub fn get(&self, name: &str) -> Option<&StateDict> {
        self.dict.get(name)
    }

    /// Moves this dict towards `other`: `self = self * (1 - ratio) + other * ratio`.
    ///
    /// Both dicts must have the same structure and shapes.
    pub fn merge(&mut self, other: &StateDict, ratio: f32) -> Result<(), TensorGraphError> {
        match (&mut self.weights, &other.weights) {
            (Some(mine), Some(theirs)) => {
                let merged = mine.scale(1.0 - ratio).add(&theirs.scale(ratio))?;
                *mine = merged;
            }
            (None, None) => {}
            _ => {
                return Err(TensorGraphError::StateDictMismatch(
                    "cannot merge an entry with weights into one without".to_string(),
                ))
            }
        }
        if self.dict.len() != other.dict.len() {
            return Err(TensorGraphError::StateDictMismatch(format!(
                "cannot merge dicts with {} and {} entries",
                self.dict.len(),
                other.dict.len()
            )));
        }
        for (name, entry) in self.dict.iter_mut() {
            let theirs = other
                .dict
                .get(name)
                .ok_or_else(|| TensorGraphError::StateDictMismatch(format!("missing entry [{}]", name)))?;
            entry.merge(theirs, ratio)?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "state_dict_test.rs"]
mod tests;
