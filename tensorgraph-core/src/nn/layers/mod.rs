// src/nn/layers/mod.rs

pub mod fully_connected;

pub use fully_connected::FullyConnected;

use crate::error::TensorGraphError;
use crate::graph::Graph;
use crate::ops::{Relu, Sigmoid, Softmax};

/// A reusable group of nodes added to a graph in one call.
pub trait Layer {
    /// Adds the layer's nodes to `graph`, reading from the node `input`, and returns the
    /// name of the layer's output node.
    fn build(&self, graph: &mut Graph, name: &str, input: &str) -> Result<String, TensorGraphError>;
}

/// Non-linearity applied at the end of a layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    Relu,
    Sigmoid,
    Softmax,
}

impl Activation {
    pub(crate) fn add_to(&self, graph: &mut Graph, name: &str, input: &str) -> Result<String, TensorGraphError> {
        match self {
            Activation::Relu => graph.add_node(name, &[input], Relu::new()),
            Activation::Sigmoid => graph.add_node(name, &[input], Sigmoid::new()),
            Activation::Softmax => graph.add_node(name, &[input], Softmax::new()),
        }
    }
}
