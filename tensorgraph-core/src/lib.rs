//! # tensorgraph-core
//!
//! An interpreted computational-graph engine. Callers assemble a DAG of named tensor
//! operations, compile it, then evaluate any node (with memoised forward results) and
//! backpropagate error signals from any node into the graph's trainable parameters.
//!
//! ```no_run
//! use tensorgraph_core::nn::{Activation, FullyConnected};
//! use tensorgraph_core::ops::PlaceHolder;
//! use tensorgraph_core::{Graph, Tensor, TensorGraphError};
//!
//! # fn main() -> Result<(), TensorGraphError> {
//! let mut graph = Graph::new();
//! graph.add_node("x", &[], PlaceHolder::new())?;
//! let out = graph.add_layer("fc", "x", &FullyConnected::new(3, 2).with_activation(Activation::Softmax))?;
//! graph.set_input("x", Tensor::new(vec![1.0, 2.0, 3.0], vec![1, 3])?)?;
//! let probabilities = graph.evaluate(&out, false)?;
//! graph.back_propagate(&out, &Tensor::new(vec![0.0, 1.0], vec![1, 2])?)?;
//! # let _ = probabilities;
//! # Ok(())
//! # }
//! ```

pub mod autograd;
pub mod error;
pub mod graph;
pub mod nn;
pub mod ops;
pub mod optim;
pub mod tensor;
pub mod utils;

pub use error::{NumericIssue, PassStage, TensorGraphError};
pub use graph::{Graph, GraphConfig, GraphState, StateDict};
pub use tensor::Tensor;
