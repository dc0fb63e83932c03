use crate::error::TensorGraphError;
use crate::graph::node::NodeArena;
use crate::nn::Parameter;
use crate::ops::{read_op, same_op, write_op, OpHandle};

/// The trainable ops of a graph, in insertion order.
///
/// Every op instance appears once: nodes tied to the same instance share one entry,
/// registered under the name of the first node that introduced it.
#[derive(Debug, Default)]
pub struct TrainableRegistry {
    entries: Vec<(String, OpHandle)>,
}

impl TrainableRegistry {
    pub fn new() -> Self {
        TrainableRegistry::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Adds `handle` under `name`. Returns `false` if the instance is already registered.
    pub fn register(&mut self, name: &str, handle: &OpHandle) -> bool {
        if self.entries.iter().any(|(_, h)| same_op(h, handle)) {
            return false;
        }
        self.entries.push((name.to_string(), handle.clone()));
        true
    }

    /// Rebuilds the registry from the arena, keeping node insertion order.
    pub fn rebuild(&mut self, arena: &NodeArena) -> Result<(), TensorGraphError> {
        self.entries.clear();
        for (_, node) in arena.iter() {
            if read_op(node.op(), node.name())?.is_trainable() {
                self.register(node.name(), node.op());
            }
        }
        Ok(())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(n, _)| n == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &OpHandle)> {
        self.entries.iter().map(|(n, h)| (n.as_str(), h))
    }

    /// Runs `f` on every parameter in order, collecting the results.
    pub fn map_parameters<T, F>(&self, mut f: F) -> Result<Vec<T>, TensorGraphError>
    where
        F: FnMut(&str, &Parameter) -> Result<T, TensorGraphError>,
    {
        let mut out = Vec::with_capacity(self.entries.len());
        for (name, handle) in &self.entries {
            let op = read_op(handle, name)?;
            let parameter = op
                .parameter()
                .ok_or_else(|| TensorGraphError::NotTrainable(name.clone()))?;
            out.push(f(name, parameter)?);
        }
        Ok(out)
    }

    /// Runs `f` on every parameter in order with write access.
    pub fn for_each_parameter_mut<F>(&self, mut f: F) -> Result<(), TensorGraphError>
    where
        F: FnMut(usize, &str, &mut Parameter) -> Result<(), TensorGraphError>,
    {
        for (i, (name, handle)) in self.entries.iter().enumerate() {
            let mut op = write_op(handle, name)?;
            let parameter = op
                .parameter_mut()
                .ok_or_else(|| TensorGraphError::NotTrainable(name.clone()))?;
            f(i, name, parameter)?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "trainable_test.rs"]
mod tests;
