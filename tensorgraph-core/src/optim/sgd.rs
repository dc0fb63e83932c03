use crate::error::TensorGraphError;
use crate::graph::Graph;
use crate::optim::optimizer_trait::Optimizer;
use crate::tensor::{zeros_like, Tensor};
use log::debug;

/// Stochastic Gradient Descent with optional momentum.
///
/// With momentum `m`, each trainable keeps a velocity `v = m * v + g` and the update is
/// `lr * v`; without it the update is `lr * g`.
#[derive(Debug, Clone)]
pub struct SgdOptimizer {
    learning_rate: f32,
    momentum: f32,
    velocities: Vec<Tensor>,
}

impl SgdOptimizer {
    pub fn new(learning_rate: f32, momentum: f32) -> Self {
        SgdOptimizer {
            learning_rate,
            momentum,
            velocities: Vec::new(),
        }
    }

    pub fn momentum(&self) -> f32 {
        self.momentum
    }

    fn momentum_updates(&mut self, gradients: &[Tensor]) -> Result<Vec<Tensor>, TensorGraphError> {
        let stale = self.velocities.len() != gradients.len()
            || self
                .velocities
                .iter()
                .zip(gradients)
                .any(|(v, g)| v.shape() != g.shape());
        if stale {
            debug!("Resetting SGD velocities for {} trainables", gradients.len());
            self.velocities = gradients.iter().map(zeros_like).collect();
        }
        let mut updates = Vec::with_capacity(gradients.len());
        for (velocity, gradient) in self.velocities.iter_mut().zip(gradients) {
            *velocity = velocity.scale(self.momentum).add(gradient)?;
            updates.push(velocity.scale(self.learning_rate));
        }
        Ok(updates)
    }
}

impl Optimizer for SgdOptimizer {
    fn step(&mut self, graph: &mut Graph) -> Result<(), TensorGraphError> {
        let gradients = graph.get_gradients()?;
        let updates = if self.momentum != 0.0 {
            self.momentum_updates(&gradients)?
        } else {
            gradients.iter().map(|g| g.scale(self.learning_rate)).collect()
        };
        graph.apply_gradients(&updates)
    }

    fn zero_grad(&mut self, graph: &mut Graph) -> Result<(), TensorGraphError> {
        graph.reset_gradients()
    }

    fn learning_rate(&self) -> f32 {
        self.learning_rate
    }

    fn set_learning_rate(&mut self, learning_rate: f32) {
        self.learning_rate = learning_rate;
    }
}

#[cfg(test)]
#[path = "sgd_test.rs"]
mod tests;
