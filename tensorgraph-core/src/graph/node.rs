use crate::error::{PassStage, TensorGraphError};
use crate::graph::config::GraphConfig;
use crate::ops::{read_op, write_op, Op, OpHandle};
use crate::tensor::{zeros, Tensor};
use log::{trace, warn};
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::sync::Arc;

/// Stable index of a node inside its graph's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Validity of a node's cached output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
    /// The output shape may have changed: recompute the shape, reallocate and recompute.
    ChangedSize,
    /// Same shape, stale values: recompute into the existing buffer.
    ChangedContent,
    ValidCache,
}

/// Error signals collected at the leaves and trainables of a backward pass.
pub type BackwardSignals = BTreeMap<NodeId, Vec<Tensor>>;

/// A graph vertex: one op plus its output cache.
///
/// Input and output links are plain [`NodeId`]s resolved by the owning arena.
#[derive(Debug)]
pub struct Node {
    name: String,
    descriptor: &'static str,
    op: OpHandle,
    inputs: Vec<NodeId>,
    outputs: Vec<NodeId>,
    cache: Tensor,
    cache_state: CacheState,
    batch_output_shape: Option<Vec<usize>>,
}

impl Node {
    pub fn new(name: String, op: OpHandle) -> Result<Self, TensorGraphError> {
        let descriptor = read_op(&op, &name)?.descriptor();
        Ok(Node {
            name,
            descriptor,
            op,
            inputs: Vec::new(),
            outputs: Vec::new(),
            cache: Tensor::default(),
            cache_state: CacheState::ChangedSize,
            batch_output_shape: None,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn descriptor(&self) -> &'static str {
        self.descriptor
    }

    pub fn op(&self) -> &OpHandle {
        &self.op
    }

    pub fn inputs(&self) -> &[NodeId] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[NodeId] {
        &self.outputs
    }

    pub fn cache(&self) -> &Tensor {
        &self.cache
    }

    pub fn cache_state(&self) -> CacheState {
        self.cache_state
    }

    pub(crate) fn set_op(&mut self, op: OpHandle) {
        self.op = op;
        self.batch_output_shape = None;
        self.cache_state = CacheState::ChangedSize;
    }

    /// Marks the cache stale. A pending size change is never downgraded to a content change.
    pub fn reset_cache(&mut self, input_size_changed: bool) {
        if input_size_changed {
            self.cache_state = CacheState::ChangedSize;
            self.batch_output_shape = None;
        } else if self.cache_state == CacheState::ValidCache {
            self.cache_state = CacheState::ChangedContent;
        }
    }

    fn reset_links(&mut self) {
        self.inputs.clear();
        self.outputs.clear();
        self.batch_output_shape = None;
    }
}

fn check_health(
    tensor: &Tensor,
    node: &str,
    stage: PassStage,
    config: &GraphConfig,
) -> Result<(), TensorGraphError> {
    if !config.check_numeric_health {
        return Ok(());
    }
    match tensor.non_finite() {
        Some(kind) => Err(TensorGraphError::NumericHealth {
            node: node.to_string(),
            stage,
            kind,
        }),
        None => Ok(()),
    }
}

fn run_forward(
    op: &dyn Op,
    inputs: &[&Tensor],
    cache: &mut Tensor,
    reallocate: bool,
    is_training: bool,
) -> Result<(), TensorGraphError> {
    if reallocate {
        let shapes: Vec<Vec<usize>> = inputs.iter().map(|t| t.shape().to_vec()).collect();
        *cache = zeros(&op.compute_output_shape(&shapes)?);
    }
    op.forward(inputs, cache, is_training)
}

/// Owner of every node of a graph, indexed by [`NodeId`].
#[derive(Debug, Default)]
pub struct NodeArena {
    nodes: Vec<Node>,
}

impl NodeArena {
    pub fn new() -> Self {
        NodeArena::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn push(&mut self, node: Node) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    pub fn get(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn get_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    pub fn ids(&self) -> impl Iterator<Item = NodeId> {
        (0..self.nodes.len()).map(NodeId)
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
    }

    /// Drops every link so the graph can be relinked from its connection list.
    pub fn reset_links(&mut self) {
        self.nodes.iter_mut().for_each(Node::reset_links);
    }

    /// Records `input -> node` in both directions.
    pub fn link(&mut self, node: NodeId, input: NodeId) {
        self.nodes[node.0].inputs.push(input);
        self.nodes[input.0].outputs.push(node);
    }

    /// Returns the first node found on a cycle, if the links contain one.
    pub fn find_cycle(&self) -> Option<NodeId> {
        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            Unvisited,
            InProgress,
            Done,
        }
        let mut marks = vec![Mark::Unvisited; self.nodes.len()];
        for start in self.ids() {
            if marks[start.0] != Mark::Unvisited {
                continue;
            }
            // Iterative DFS over input links: (node, next input to visit).
            let mut stack = vec![(start, 0usize)];
            marks[start.0] = Mark::InProgress;
            while let Some((id, next)) = stack.pop() {
                let inputs = &self.nodes[id.0].inputs;
                if next < inputs.len() {
                    stack.push((id, next + 1));
                    let child = inputs[next];
                    match marks[child.0] {
                        Mark::InProgress => return Some(child),
                        Mark::Unvisited => {
                            marks[child.0] = Mark::InProgress;
                            stack.push((child, 0));
                        }
                        Mark::Done => {}
                    }
                } else {
                    marks[id.0] = Mark::Done;
                }
            }
        }
        None
    }

    /// Marks `start` and everything downstream of it stale.
    pub fn invalidate_downstream(&mut self, start: &[NodeId], input_size_changed: bool) {
        let mut visited = BTreeSet::new();
        let mut queue: VecDeque<NodeId> = start.iter().copied().collect();
        while let Some(id) = queue.pop_front() {
            if !visited.insert(id) {
                continue;
            }
            let node = &mut self.nodes[id.0];
            node.reset_cache(input_size_changed);
            queue.extend(node.outputs.iter().copied());
        }
    }

    pub fn reset_all_caches(&mut self, input_size_changed: bool) {
        for node in &mut self.nodes {
            node.reset_cache(input_size_changed);
        }
    }

    /// Brings the cache of `id` up to date, recursing into its inputs first.
    pub fn evaluate(
        &mut self,
        id: NodeId,
        is_training: bool,
        config: &GraphConfig,
    ) -> Result<(), TensorGraphError> {
        if self.nodes[id.0].cache_state == CacheState::ValidCache {
            trace!("Cache hit for node [{}]", self.nodes[id.0].name);
            return Ok(());
        }
        let input_ids = self.nodes[id.0].inputs.clone();
        for &input in &input_ids {
            self.evaluate(input, is_training, config)?;
        }

        let op = Arc::clone(&self.nodes[id.0].op);
        let name = self.nodes[id.0].name.clone();
        let reallocate =
            self.nodes[id.0].cache_state == CacheState::ChangedSize || self.nodes[id.0].cache.is_empty();
        let mut cache = std::mem::take(&mut self.nodes[id.0].cache);
        let result = {
            let inputs: Vec<&Tensor> = input_ids.iter().map(|i| &self.nodes[i.0].cache).collect();
            read_op(&op, &name).and_then(|guard| run_forward(&*guard, &inputs, &mut cache, reallocate, is_training))
        };
        let node = &mut self.nodes[id.0];
        node.cache = cache;
        result?;
        check_health(&node.cache, &name, PassStage::Forward, config)?;
        trace!("Computed node [{}] with shape {:?}", name, node.cache.shape());
        node.cache_state = CacheState::ValidCache;
        Ok(())
    }

    /// Pushes `error_signal` backward from `id`, returning the signals that reached
    /// leaves and trainable nodes.
    pub fn back_propagate(
        &mut self,
        id: NodeId,
        error_signal: &Tensor,
        config: &GraphConfig,
    ) -> Result<BackwardSignals, TensorGraphError> {
        let input_ids = self.nodes[id.0].inputs.clone();
        for &input in &input_ids {
            self.evaluate(input, true, config)?;
        }
        let op = Arc::clone(&self.nodes[id.0].op);
        let name = self.nodes[id.0].name.clone();
        // Trainables consume the signal inside `backward` and return nothing for it.
        check_health(error_signal, &name, PassStage::Backward, config)?;

        let (gradients, trainable) = {
            let inputs: Vec<&Tensor> = input_ids.iter().map(|i| &self.nodes[i.0].cache).collect();
            let mut guard = write_op(&op, &name)?;
            (guard.backward(&inputs, error_signal)?, guard.is_trainable())
        };
        for gradient in &gradients {
            check_health(gradient, &name, PassStage::Backward, config)?;
        }

        let mut signals = BackwardSignals::new();
        if input_ids.is_empty() || trainable {
            signals.entry(id).or_default().push(error_signal.clone());
        }
        if input_ids.is_empty() {
            return Ok(signals);
        }
        if gradients.len() != input_ids.len() {
            return Err(TensorGraphError::GradientCountMismatch {
                node: name,
                expected: input_ids.len(),
                actual: gradients.len(),
            });
        }
        for (input, gradient) in input_ids.iter().zip(gradients.iter()) {
            for (key, mut values) in self.back_propagate(*input, gradient, config)? {
                signals.entry(key).or_default().append(&mut values);
            }
        }
        Ok(signals)
    }

    /// Memoised shape deduction. Returns an empty shape when the output cannot be
    /// determined yet (e.g. an upstream placeholder has no data).
    pub fn batch_output_shape(&mut self, id: NodeId) -> Result<Vec<usize>, TensorGraphError> {
        if let Some(shape) = &self.nodes[id.0].batch_output_shape {
            return Ok(shape.clone());
        }
        let op = Arc::clone(&self.nodes[id.0].op);
        let name = self.nodes[id.0].name.clone();
        if let Some(shape) = read_op(&op, &name)?.known_output_shape() {
            return Ok(shape);
        }

        let input_ids = self.nodes[id.0].inputs.clone();
        if input_ids.is_empty() {
            let guard = read_op(&op, &name)?;
            return guard.compute_output_shape(&[]);
        }
        let mut shapes = Vec::with_capacity(input_ids.len());
        let mut skipped = false;
        for input in input_ids {
            let shape = self.batch_output_shape(input)?;
            if shape.is_empty() {
                skipped = true;
            } else {
                shapes.push(shape);
            }
        }
        if shapes.is_empty() {
            return Ok(Vec::new());
        }
        let computed = read_op(&op, &name)?.compute_output_shape(&shapes);
        match computed {
            Ok(shape) => {
                self.nodes[id.0].batch_output_shape = Some(shape.clone());
                Ok(shape)
            }
            Err(e) if skipped => {
                warn!("Shape of node [{}] is indeterminate until all inputs are set: {}", name, e);
                Ok(Vec::new())
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
#[path = "node_test.rs"]
mod tests;
