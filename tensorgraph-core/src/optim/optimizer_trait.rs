use crate::error::TensorGraphError;
use crate::graph::Graph;

/// Common interface of the optimizers.
pub trait Optimizer {
    /// Performs a single optimization step on the trainables of `graph`.
    ///
    /// The graph must have completed a backward pass since its last update.
    fn step(&mut self, graph: &mut Graph) -> Result<(), TensorGraphError>;

    /// Clears the gradients accumulated in `graph`.
    fn zero_grad(&mut self, graph: &mut Graph) -> Result<(), TensorGraphError>;

    fn learning_rate(&self) -> f32;

    fn set_learning_rate(&mut self, learning_rate: f32);
}
