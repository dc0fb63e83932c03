use crate::error::TensorGraphError;
use crate::graph::Graph;
use crate::nn::init::WeightsInit;
use crate::nn::layers::{Activation, Layer};
use crate::ops::{Add, MatrixMultiply, Weights};
use crate::tensor::zeros;
use log::debug;

/// Dense layer `activation(x @ W + b)` for `x` of shape `[batch, in_size]`.
///
/// Building it adds the nodes `{name}_Weights` `[in_size, out_size]`, `{name}_Bias`
/// `[1, out_size]`, `{name}_MatrixMultiply`, `{name}_Add` and, with an activation,
/// `{name}_Activation`.
///
/// Building a second layer under the same name ties its weights and bias to the
/// first one; its other nodes get a `{name}_Copy_{n}` prefix.
#[derive(Debug, Clone, PartialEq)]
pub struct FullyConnected {
    pub in_size: usize,
    pub out_size: usize,
    pub activation: Option<Activation>,
    pub init: WeightsInit,
    pub seed: u64,
}

impl FullyConnected {
    pub fn new(in_size: usize, out_size: usize) -> Self {
        FullyConnected {
            in_size,
            out_size,
            activation: None,
            init: WeightsInit::default(),
            seed: 0,
        }
    }

    pub fn with_activation(mut self, activation: Activation) -> Self {
        self.activation = Some(activation);
        self
    }

    pub fn with_init(mut self, init: WeightsInit, seed: u64) -> Self {
        self.init = init;
        self.seed = seed;
        self
    }

    fn node_prefix(graph: &Graph, name: &str) -> String {
        let taken = |prefix: &str| graph.contains(&format!("{}_MatrixMultiply", prefix));
        if !taken(name) {
            return name.to_string();
        }
        (1..)
            .map(|i| format!("{}_Copy_{}", name, i))
            .find(|prefix| !taken(prefix))
            .unwrap_or_else(|| name.to_string())
    }
}

impl Layer for FullyConnected {
    fn build(&self, graph: &mut Graph, name: &str, input: &str) -> Result<String, TensorGraphError> {
        let name = if name.is_empty() {
            (0..)
                .map(|i| format!("FullyConnected_{}", i))
                .find(|n| !graph.contains(&format!("{}_Weights", n)))
                .unwrap_or_else(|| "FullyConnected".to_string())
        } else {
            name.to_string()
        };
        let prefix = Self::node_prefix(graph, &name);

        let weights = graph.add_node(
            &format!("{}_Weights", name),
            &[],
            Weights::with_init(&[self.in_size, self.out_size], self.init, self.seed)?,
        )?;
        let bias = graph.add_node(
            &format!("{}_Bias", name),
            &[],
            Weights::new(zeros(&[1, self.out_size])),
        )?;
        let product = graph.add_node(
            &format!("{}_MatrixMultiply", prefix),
            &[input, weights.as_str()],
            MatrixMultiply::new(),
        )?;
        let mut output = graph.add_node(
            &format!("{}_Add", prefix),
            &[product.as_str(), bias.as_str()],
            Add::new(),
        )?;
        if let Some(activation) = self.activation {
            output = activation.add_to(graph, &format!("{}_Activation", prefix), &output)?;
        }
        debug!(
            "Built FullyConnected [{}] ({} -> {}) with output [{}]",
            prefix, self.in_size, self.out_size, output
        );
        Ok(output)
    }
}

#[cfg(test)]
#[path = "fully_connected_test.rs"]
mod tests;
