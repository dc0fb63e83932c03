use std::fmt;
use thiserror::Error;

/// Which pass detected a numeric-health problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassStage {
    Forward,
    Backward,
}

impl fmt::Display for PassStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PassStage::Forward => write!(f, "forward"),
            PassStage::Backward => write!(f, "backward"),
        }
    }
}

/// Kind of non-finite value found in a tensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericIssue {
    NaN,
    Infinity,
}

impl fmt::Display for NumericIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumericIssue::NaN => write!(f, "NaN"),
            NumericIssue::Infinity => write!(f, "infinity"),
        }
    }
}

/// Custom error type for the graph engine.
#[derive(Error, Debug, PartialEq, Clone)]
pub enum TensorGraphError {
    // --- Construction errors ---
    /// A name reused for a non-shareable op. Reusing a name with a shareable op of a
    /// different kind is an `InvalidMode` error instead.
    #[error("Node [{0}] already exists in graph and its op is not shareable")]
    DuplicateNode(String),

    #[error("Node [{0}] not in graph")]
    NodeNotFound(String),

    #[error("Node [{node}] declares input [{input}] which is not in graph")]
    UnresolvedInput { node: String, input: String },

    #[error("Invalid mode: {0}")]
    InvalidMode(String),

    #[error("No data holder node with name [{0}] found in graph")]
    NotADataHolder(String),

    #[error("Node [{0}] is not trainable")]
    NotTrainable(String),

    #[error("Cycle detected in the computation graph at node [{0}]")]
    CycleDetected(String),

    // --- Numeric health ---
    #[error("Division by zero error")]
    DivisionByZero,

    #[error("Numeric health check failed: {kind} in {stage} pass of node [{node}]")]
    NumericHealth {
        node: String,
        stage: PassStage,
        kind: NumericIssue,
    },

    // --- Contract violations ---
    #[error("Shape mismatch: expected {expected:?}, got {actual:?} during operation {operation}")]
    ShapeMismatch {
        expected: Vec<usize>,
        actual: Vec<usize>,
        operation: String,
    },

    #[error("Operation {operation} expects {expected} inputs, got {actual}")]
    InputCountMismatch {
        operation: String,
        expected: usize,
        actual: usize,
    },

    #[error("Tensor creation error: data length {data_len} does not match shape {shape:?}")]
    TensorCreationError { data_len: usize, shape: Vec<usize> },

    #[error("Node [{node}] produced {actual} gradients for {expected} inputs")]
    GradientCountMismatch {
        node: String,
        expected: usize,
        actual: usize,
    },

    #[error("Index out of bounds: index {index} for dimension of size {size}")]
    IndexOutOfBounds { index: usize, size: usize },

    #[error("Expected {expected} gradient tensors, got {actual}")]
    GradientListMismatch { expected: usize, actual: usize },

    // --- State dict ---
    #[error("State dict mismatch: {0}")]
    StateDictMismatch(String),

    #[error("Lock poisoned while accessing op of node [{0}]")]
    LockError(String),
}
