//! # Computational Graph (`graph`)
//!
//! A [`Graph`] owns a DAG of named nodes, each wrapping one [`Op`]. Nodes and their
//! declared inputs are recorded by [`Graph::add_node`] and only linked by
//! [`Graph::compile`], so nodes can be added in any order.
//!
//! ## Key Components:
//!
//! - **[`node`]:** the node arena, output caches and the recursive forward, backward
//!   and shape-deduction passes.
//! - **[`state`]:** the lifecycle state machine that gates which calls are legal.
//! - **[`trainable`]:** the registry of trainable ops, in insertion order.
//! - **[`state_dict`]:** the nested name to tensor map used to save and restore weights.
//!
//! ## Weight tying
//!
//! Adding a node under an existing name whose op is shareable creates a
//! `{name}_Copy_{n}` node backed by the *same* op instance. [`Graph::share_weights`]
//! does the same for two existing nodes.

pub mod config;
pub mod node;
pub mod state;
pub mod state_dict;
pub mod trainable;

pub use config::GraphConfig;
pub use node::{BackwardSignals, CacheState, Node, NodeArena, NodeId};
pub use state::{GraphEvent, GraphState};
pub use state_dict::StateDict;
pub use trainable::TrainableRegistry;

use crate::error::TensorGraphError;
use crate::nn::layers::Layer;
use crate::nn::{Parameter, Regulariser};
use crate::ops::{into_handle, read_op, same_op, write_op, Op, OpHandle};
use crate::tensor::{ones, Tensor};
use log::{debug, info, warn};
use std::collections::{BTreeMap, BTreeSet};

/// A computational graph with memoised forward evaluation and gradient accumulation.
///
/// A `Graph` is `Send`: it can be moved to a worker thread, or shared behind a
/// `Mutex`. It is not meant for concurrent use without such a lock.
#[derive(Debug, Default)]
pub struct Graph {
    arena: NodeArena,
    names: BTreeMap<String, NodeId>,
    connections: Vec<(String, Vec<String>)>,
    trainables: TrainableRegistry,
    state: GraphState,
    config: GraphConfig,
}

impl Graph {
    pub fn new() -> Self {
        Graph::default()
    }

    pub fn with_config(config: GraphConfig) -> Self {
        Graph {
            config,
            ..Default::default()
        }
    }

    pub fn config(&self) -> &GraphConfig {
        &self.config
    }

    pub fn state(&self) -> GraphState {
        self.state
    }

    fn transition(&mut self, event: GraphEvent) -> Result<(), TensorGraphError> {
        let next = self.state.transition(event)?;
        if next != self.state {
            debug!("Graph state {} -> {} on {:?}", self.state, next, event);
        }
        self.state = next;
        Ok(())
    }

    fn node_id(&self, name: &str) -> Result<NodeId, TensorGraphError> {
        self.names
            .get(name)
            .copied()
            .ok_or_else(|| TensorGraphError::NodeNotFound(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains_key(name)
    }

    pub fn node(&self, name: &str) -> Result<&Node, TensorGraphError> {
        Ok(self.arena.get(self.node_id(name)?))
    }

    /// Node names in insertion order.
    pub fn node_names(&self) -> Vec<String> {
        self.arena.iter().map(|(_, n)| n.name().to_string()).collect()
    }

    /// Names of the trainable nodes, one per distinct op instance, in insertion order.
    pub fn trainable_names(&self) -> Vec<String> {
        self.trainables.names().map(str::to_string).collect()
    }

    fn unique_default_name(&self, descriptor: &str) -> String {
        (0..)
            .map(|i| format!("{}_{}", descriptor, i))
            .find(|candidate| !self.names.contains_key(candidate))
            .unwrap_or_else(|| descriptor.to_string())
    }

    fn unique_copy_name(&self, name: &str) -> String {
        (1..)
            .map(|i| format!("{}_Copy_{}", name, i))
            .find(|candidate| !self.names.contains_key(candidate))
            .unwrap_or_else(|| name.to_string())
    }

    /// Adds a node running `op` on the outputs of `inputs` and returns its resolved name.
    ///
    /// - An empty `name` is replaced by `{descriptor}_{n}`.
    /// - An existing `name` creates a tied `{name}_Copy_{n}` node if `op` is shareable
    ///   and of the same kind as the existing op; the new `op` value itself is dropped
    ///   and the existing instance is shared. Otherwise it fails with `DuplicateNode`.
    ///
    /// Inputs are only resolved by [`Graph::compile`].
    pub fn add_node<O: Op + 'static>(
        &mut self,
        name: &str,
        inputs: &[&str],
        op: O,
    ) -> Result<String, TensorGraphError> {
        self.add_node_handle(name, inputs, into_handle(op))
    }

    /// Like [`Graph::add_node`], for an op that is already behind a handle.
    pub fn add_node_handle(
        &mut self,
        name: &str,
        inputs: &[&str],
        handle: OpHandle,
    ) -> Result<String, TensorGraphError> {
        let (descriptor, shareable) = {
            let op = read_op(&handle, name)?;
            (op.descriptor(), op.is_shareable())
        };

        let (resolved, handle) = if name.is_empty() {
            (self.unique_default_name(descriptor), handle)
        } else if let Some(&existing) = self.names.get(name) {
            if !shareable {
                return Err(TensorGraphError::DuplicateNode(name.to_string()));
            }
            let existing = self.arena.get(existing);
            if existing.descriptor() != descriptor {
                return Err(TensorGraphError::InvalidMode(format!(
                    "cannot tie a {} node to [{}] which is a {}",
                    descriptor,
                    name,
                    existing.descriptor()
                )));
            }
            (self.unique_copy_name(name), existing.op().clone())
        } else {
            (name.to_string(), handle)
        };

        let node = Node::new(resolved.clone(), handle)?;
        let trainable = read_op(node.op(), &resolved)?.is_trainable();
        if trainable {
            self.trainables.register(&resolved, node.op());
        }
        let id = self.arena.push(node);
        self.names.insert(resolved.clone(), id);
        self.connections
            .push((resolved.clone(), inputs.iter().map(|s| s.to_string()).collect()));
        debug!("Added {} node [{}] with inputs {:?}", descriptor, resolved, inputs);
        self.transition(GraphEvent::NodeAdded)?;
        Ok(resolved)
    }

    /// Expands `layer` into nodes reading from `input` and returns the output node name.
    pub fn add_layer<L: Layer>(&mut self, name: &str, input: &str, layer: &L) -> Result<String, TensorGraphError> {
        layer.build(self, name, input)
    }

    /// Ties `target` to the op instance of `source`. Both must be nodes of the same
    /// shareable kind; `target`'s previous op is dropped.
    pub fn share_weights(&mut self, source: &str, target: &str) -> Result<(), TensorGraphError> {
        let source_id = self.node_id(source)?;
        let target_id = self.node_id(target)?;
        let source_handle = self.arena.get(source_id).op().clone();
        {
            let op = read_op(&source_handle, source)?;
            if !op.is_shareable() {
                return Err(TensorGraphError::InvalidMode(format!(
                    "op of node [{}] is not shareable",
                    source
                )));
            }
            if op.descriptor() != self.arena.get(target_id).descriptor() {
                return Err(TensorGraphError::InvalidMode(format!(
                    "cannot share weights between a {} and a {}",
                    op.descriptor(),
                    self.arena.get(target_id).descriptor()
                )));
            }
        }
        if same_op(&source_handle, self.arena.get(target_id).op()) {
            return Ok(());
        }
        self.arena.get_mut(target_id).set_op(source_handle);
        self.arena.invalidate_downstream(&[target_id], true);
        self.trainables.rebuild(&self.arena)?;
        debug!("Node [{}] now shares weights with [{}]", target, source);
        self.transition(GraphEvent::NodeAdded)
    }

    /// Links every node to its declared inputs and deduces all output shapes.
    ///
    /// A no-op for an already compiled graph. On failure the graph is left `Invalid`.
    pub fn compile(&mut self) -> Result<(), TensorGraphError> {
        if self.state.is_compiled() {
            return Ok(());
        }
        match self.link_and_check() {
            Ok(()) => {
                info!(
                    "Compiled graph with {} nodes and {} trainables",
                    self.arena.len(),
                    self.trainables.len()
                );
                self.transition(GraphEvent::CompileSucceeded)
            }
            Err(e) => {
                warn!("Graph compilation failed: {}", e);
                self.transition(GraphEvent::CompileFailed)?;
                Err(e)
            }
        }
    }

    fn link_and_check(&mut self) -> Result<(), TensorGraphError> {
        self.arena.reset_links();
        for (node_name, inputs) in &self.connections {
            let node = self.node_id(node_name)?;
            for input in inputs {
                let input_id = self.names.get(input).copied().ok_or_else(|| {
                    TensorGraphError::UnresolvedInput {
                        node: node_name.clone(),
                        input: input.clone(),
                    }
                })?;
                self.arena.link(node, input_id);
            }
        }
        if let Some(id) = self.arena.find_cycle() {
            return Err(TensorGraphError::CycleDetected(self.arena.get(id).name().to_string()));
        }
        self.arena.reset_all_caches(true);

        let ids: Vec<NodeId> = self.arena.ids().collect();
        for id in ids {
            let shape = self.arena.batch_output_shape(id)?;
            if shape.is_empty() {
                warn!(
                    "Batch output shape computing failed for node [{}]",
                    self.arena.get(id).name()
                );
            }
        }
        Ok(())
    }

    fn ensure_compiled(&mut self) -> Result<(), TensorGraphError> {
        if !self.state.is_compiled() {
            self.compile()?;
        }
        Ok(())
    }

    /// Writes `data` into a data-holder node (placeholder, constant, weights) and
    /// invalidates every node downstream of it, and of any node tied to it.
    pub fn set_input(&mut self, name: &str, data: Tensor) -> Result<(), TensorGraphError> {
        let id = self.node_id(name)?;
        let handle = self.arena.get(id).op().clone();
        let size_changed = {
            let mut op = write_op(&handle, name)?;
            let holder = op
                .as_data_holder_mut()
                .ok_or_else(|| TensorGraphError::NotADataHolder(name.to_string()))?;
            holder.set_data(data)?
        };
        let tied: Vec<NodeId> = self
            .arena
            .iter()
            .filter(|(_, n)| same_op(n.op(), &handle))
            .map(|(i, _)| i)
            .collect();
        self.arena.invalidate_downstream(&tied, size_changed);
        Ok(())
    }

    /// Replaces the weights of a trainable node.
    pub fn set_weight(&mut self, name: &str, weights: Tensor) -> Result<(), TensorGraphError> {
        if !read_op(self.node(name)?.op(), name)?.is_trainable() {
            return Err(TensorGraphError::NotTrainable(name.to_string()));
        }
        self.set_input(name, weights)
    }

    /// Marks every cache stale.
    pub fn reset_graph_cache(&mut self, input_size_changed: bool) {
        self.arena.reset_all_caches(input_size_changed);
    }

    /// Evaluates `name`, compiling first if needed, and returns a copy of its output.
    pub fn evaluate(&mut self, name: &str, is_training: bool) -> Result<Tensor, TensorGraphError> {
        let id = self.node_id(name)?;
        self.ensure_compiled()?;
        let next = self.state.transition(GraphEvent::Evaluate)?;
        self.arena.evaluate(id, is_training, &self.config)?;
        self.state = next;
        Ok(self.arena.get(id).cache().clone())
    }

    /// Backpropagates `error_signal` from `name`, accumulating into the trainables.
    pub fn back_propagate(&mut self, name: &str, error_signal: &Tensor) -> Result<(), TensorGraphError> {
        self.run_backward(name, error_signal, false).map(|_| ())
    }

    /// Backpropagates from a loss node, seeding the pass with ones.
    ///
    /// This is the per-step training entry point: regularisation gradients are added to
    /// the trainables after the pass, once per call.
    pub fn back_propagate_error(&mut self, name: &str) -> Result<(), TensorGraphError> {
        let shape = self.node(name)?.cache().shape().to_vec();
        if shape.is_empty() {
            return Err(TensorGraphError::InvalidMode(format!(
                "cannot backpropagate from [{}]: node has not been evaluated",
                name
            )));
        }
        self.run_backward(name, &ones(&shape), true).map(|_| ())
    }

    /// Like [`Graph::back_propagate`], returning the error signals that reached each
    /// leaf and trainable node, keyed by node name.
    ///
    /// Regularisers are not applied here, so several outputs can be backpropagated in
    /// one step without adding the penalty more than once.
    pub fn back_propagate_signals(
        &mut self,
        name: &str,
        error_signal: &Tensor,
    ) -> Result<BTreeMap<String, Vec<Tensor>>, TensorGraphError> {
        self.run_backward(name, error_signal, false)
    }

    fn run_backward(
        &mut self,
        name: &str,
        error_signal: &Tensor,
        regularise: bool,
    ) -> Result<BTreeMap<String, Vec<Tensor>>, TensorGraphError> {
        let id = self.node_id(name)?;
        self.ensure_compiled()?;
        let next = self.state.transition(GraphEvent::BackPropagate)?;
        let signals = self.arena.back_propagate(id, error_signal, &self.config)?;
        if regularise {
            self.trainables
                .for_each_parameter_mut(|_, _, p| p.apply_regularisation())?;
        }
        self.state = next;
        Ok(signals
            .into_iter()
            .map(|(id, values)| (self.arena.get(id).name().to_string(), values))
            .collect())
    }

    /// Output shape of `name` as deduced from the current inputs, without evaluating.
    pub fn batch_output_shape(&mut self, name: &str) -> Result<Vec<usize>, TensorGraphError> {
        let id = self.node_id(name)?;
        self.ensure_compiled()?;
        self.arena.batch_output_shape(id)
    }

    /// Copies of the accumulated gradients, in trainable order.
    pub fn get_gradients(&self) -> Result<Vec<Tensor>, TensorGraphError> {
        self.trainables.map_parameters(|_, p| Ok(p.gradients().clone()))
    }

    /// Rows touched by sparse gradients, in trainable order. Empty means dense.
    pub fn get_updated_rows(&self) -> Result<Vec<BTreeSet<usize>>, TensorGraphError> {
        self.trainables.map_parameters(|_, p| Ok(p.updated_rows().clone()))
    }

    /// Copies of the trainable weights, in trainable order.
    pub fn get_weights(&self) -> Result<Vec<Tensor>, TensorGraphError> {
        self.trainables.map_parameters(|_, p| Ok(p.weights().clone()))
    }

    fn check_gradient_list(&self, gradients: &[Tensor]) -> Result<(), TensorGraphError> {
        if gradients.len() != self.trainables.len() {
            return Err(TensorGraphError::GradientListMismatch {
                expected: self.trainables.len(),
                actual: gradients.len(),
            });
        }
        let shapes = self.trainables.map_parameters(|_, p| Ok(p.weights().shape().to_vec()))?;
        for ((shape, gradient), name) in shapes.iter().zip(gradients).zip(self.trainables.names()) {
            if shape.as_slice() != gradient.shape() {
                return Err(TensorGraphError::ShapeMismatch {
                    expected: shape.clone(),
                    actual: gradient.shape().to_vec(),
                    operation: format!("apply gradients to [{}]", name),
                });
            }
        }
        Ok(())
    }

    /// Subtracts `gradients` (one per trainable, already scaled) from the weights
    /// and clears the accumulators.
    pub fn apply_gradients(&mut self, gradients: &[Tensor]) -> Result<(), TensorGraphError> {
        let next = self.state.transition(GraphEvent::ApplyGradients)?;
        self.check_gradient_list(gradients)?;
        self.trainables
            .for_each_parameter_mut(|i, _, p| p.apply_gradient(&gradients[i]))?;
        self.finish_update(next);
        Ok(())
    }

    /// Like [`Graph::apply_gradients`], restricted to `rows` per trainable. An empty row
    /// set applies the whole gradient.
    pub fn apply_sparse_gradients(
        &mut self,
        gradients: &[Tensor],
        rows: &[BTreeSet<usize>],
    ) -> Result<(), TensorGraphError> {
        let next = self.state.transition(GraphEvent::ApplyGradients)?;
        self.check_gradient_list(gradients)?;
        if rows.len() != gradients.len() {
            return Err(TensorGraphError::GradientListMismatch {
                expected: gradients.len(),
                actual: rows.len(),
            });
        }
        self.trainables
            .for_each_parameter_mut(|i, _, p| p.apply_sparse_gradient(&gradients[i], &rows[i]))?;
        self.finish_update(next);
        Ok(())
    }

    /// `weights -= learning_rate * accumulated_gradients` on every trainable.
    pub fn step(&mut self, learning_rate: f32) -> Result<(), TensorGraphError> {
        let next = self.state.transition(GraphEvent::ApplyGradients)?;
        self.trainables
            .for_each_parameter_mut(|_, _, p| p.step(learning_rate))?;
        self.finish_update(next);
        Ok(())
    }

    fn finish_update(&mut self, next: GraphState) {
        // Weights changed, so every cached output may be stale.
        self.arena.reset_all_caches(false);
        debug!("Applied gradients to {} trainables", self.trainables.len());
        self.state = next;
    }

    pub fn reset_gradients(&mut self) -> Result<(), TensorGraphError> {
        self.trainables.for_each_parameter_mut(|_, _, p| {
            p.reset_gradients();
            Ok(())
        })
    }

    fn with_trainable<F>(&mut self, name: &str, f: F) -> Result<(), TensorGraphError>
    where
        F: FnOnce(&mut Parameter),
    {
        let handle = self.node(name)?.op().clone();
        let mut op = write_op(&handle, name)?;
        let parameter = op
            .parameter_mut()
            .ok_or_else(|| TensorGraphError::NotTrainable(name.to_string()))?;
        f(parameter);
        Ok(())
    }

    /// Sets (or with `None` clears) the regulariser of every trainable.
    pub fn set_regularisation(&mut self, regulariser: Option<Regulariser>, rate: f32) -> Result<(), TensorGraphError> {
        self.trainables.for_each_parameter_mut(|_, _, p| {
            p.set_regularisation(regulariser, rate);
            Ok(())
        })
    }

    pub fn set_regularisation_for(
        &mut self,
        name: &str,
        regulariser: Option<Regulariser>,
        rate: f32,
    ) -> Result<(), TensorGraphError> {
        self.with_trainable(name, |p| p.set_regularisation(regulariser, rate))
    }

    /// Freezes (or unfreezes) every trainable.
    pub fn set_frozen_state(&mut self, frozen: bool) -> Result<(), TensorGraphError> {
        self.trainables.for_each_parameter_mut(|_, _, p| {
            p.set_frozen(frozen);
            Ok(())
        })
    }

    pub fn set_frozen_state_for(&mut self, name: &str, frozen: bool) -> Result<(), TensorGraphError> {
        self.with_trainable(name, |p| p.set_frozen(frozen))
    }

    /// Snapshot of every trainable's weights, keyed by trainable name.
    pub fn state_dict(&self) -> Result<StateDict, TensorGraphError> {
        let mut dict = StateDict::new();
        let entries = self
            .trainables
            .map_parameters(|name, p| Ok((name.to_string(), p.state_dict())))?;
        for (name, entry) in entries {
            dict.insert(name, entry);
        }
        Ok(dict)
    }

    /// Restores weights saved by [`Graph::state_dict`]. The dict must name exactly the
    /// trainables of this graph, with matching shapes; nothing is written otherwise.
    pub fn load_state_dict(&mut self, dict: &StateDict) -> Result<(), TensorGraphError> {
        if let Some(unknown) = dict.dict.keys().find(|k| !self.trainables.contains(k)) {
            return Err(TensorGraphError::StateDictMismatch(format!(
                "no trainable named [{}] in graph",
                unknown
            )));
        }
        self.trainables.map_parameters(|name, p| {
            let entry = dict
                .get(name)
                .ok_or_else(|| TensorGraphError::StateDictMismatch(format!("missing entry [{}]", name)))?;
            match &entry.weights {
                Some(w) if p.is_initialised() && w.shape() != p.weights().shape() => {
                    Err(TensorGraphError::ShapeMismatch {
                        expected: p.weights().shape().to_vec(),
                        actual: w.shape().to_vec(),
                        operation: format!("load state dict into [{}]", name),
                    })
                }
                Some(_) => Ok(()),
                None => Err(TensorGraphError::StateDictMismatch(format!(
                    "entry [{}] holds no weights",
                    name
                ))),
            }
        })?;
        self.trainables.for_each_parameter_mut(|_, name, p| match dict.get(name) {
            Some(entry) => p.load_state_dict(entry),
            None => Ok(()),
        })?;
        self.arena.reset_all_caches(true);
        debug!("Loaded state dict with {} entries", dict.dict.len());
        Ok(())
    }
}

#[cfg(test)]
#[path = "graph_test.rs"]
mod tests;
