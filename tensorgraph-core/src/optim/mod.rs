// tensorgraph-core/src/optim/mod.rs

//! Optimizers that train a [`Graph`](crate::graph::Graph).
//!
//! An optimizer only talks to the graph through its gradient boundary: it reads the
//! accumulated gradients with `get_gradients`, turns them into updates and hands them
//! back with `apply_gradients`.

pub mod optimizer_trait;
pub mod sgd;

pub use optimizer_trait::Optimizer;
pub use sgd::SgdOptimizer;
