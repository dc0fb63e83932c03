//! # Operation Kernels (`ops`)
//!
//! Every graph node wraps exactly one [`Op`]. The engine never looks inside an op; it
//! only asks it for an output shape, a forward value and per-input gradients.
//!
//! ## Structure:
//!
//! - **[`Op`]:** the contract between the engine and a kernel.
//! - **[`DataHolder`]:** ops whose output is data set from outside the graph
//!   (placeholders, constants, weights). `Graph::set_input` writes through it.
//! - **Trainable ops** expose a [`Parameter`](crate::nn::Parameter) through
//!   [`Op::parameter`]; having one is what makes an op trainable.
//! - **[`OpHandle`]:** ops are stored behind `Arc<RwLock<dyn Op>>` so that tied nodes
//!   can hold the very same instance.
//!
//! ## Key Submodules:
//!
//! - [`placeholder`], [`weights`], [`embeddings`]: leaf ops.
//! - [`arithmetic`]: add, divide.
//! - [`linalg`]: matrix multiply.
//! - [`activation`]: relu, sigmoid, softmax.
//! - [`loss`]: mean square error.

use crate::error::TensorGraphError;
use crate::nn::Parameter;
use crate::tensor::Tensor;
use std::fmt::Debug;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

pub mod activation;
pub mod arithmetic;
pub mod embeddings;
pub mod linalg;
pub mod loss;
pub mod placeholder;
pub mod weights;

pub use activation::{Relu, Sigmoid, Softmax};
pub use arithmetic::{Add, Divide};
pub use embeddings::Embeddings;
pub use linalg::MatrixMultiply;
pub use loss::MeanSquareErrorLoss;
pub use placeholder::{Constant, PlaceHolder};
pub use weights::Weights;

/// Defines the interface between the graph engine and a tensor operation.
///
/// The `Debug + Send + Sync` bounds let a whole `Graph` move to a worker thread.
pub trait Op: Debug + Send + Sync {
    /// Short type name, used to generate default node names (`"MatrixMultiply_0"`).
    fn descriptor(&self) -> &'static str;

    /// Computes the output shape from the shapes of the inputs, in input order.
    ///
    /// Leaf ops receive an empty slice.
    fn compute_output_shape(&self, input_shapes: &[Vec<usize>])
        -> Result<Vec<usize>, TensorGraphError>;

    /// Writes the op's value into `output`, which the engine has already sized
    /// with [`Op::compute_output_shape`].
    fn forward(
        &self,
        inputs: &[&Tensor],
        output: &mut Tensor,
        is_training: bool,
    ) -> Result<(), TensorGraphError>;

    /// Given the gradient flowing into this op's output, returns one gradient per input.
    ///
    /// The order of the returned tensors must match the order of `inputs`. Trainable ops
    /// accumulate into their own parameter here and return an empty `Vec`.
    fn backward(
        &mut self,
        inputs: &[&Tensor],
        error_signal: &Tensor,
    ) -> Result<Vec<Tensor>, TensorGraphError>;

    /// A shape known without looking at any input (data holders with data set).
    fn known_output_shape(&self) -> Option<Vec<usize>> {
        None
    }

    /// Whether a second node may be created on top of this same instance (weight tying).
    fn is_shareable(&self) -> bool {
        false
    }

    fn parameter(&self) -> Option<&Parameter> {
        None
    }

    fn parameter_mut(&mut self) -> Option<&mut Parameter> {
        None
    }

    fn is_trainable(&self) -> bool {
        self.parameter().is_some()
    }

    fn as_data_holder_mut(&mut self) -> Option<&mut dyn DataHolder> {
        None
    }
}

/// Ops whose output is externally supplied data.
pub trait DataHolder {
    /// Replaces the held data. Returns `true` when the shape changed.
    fn set_data(&mut self, data: Tensor) -> Result<bool, TensorGraphError>;

    fn data(&self) -> &Tensor;
}

/// Shared, lockable handle to an op instance.
pub type OpHandle = Arc<RwLock<dyn Op>>;

/// Boxes an op into a fresh handle.
pub fn into_handle<O: Op + 'static>(op: O) -> OpHandle {
    Arc::new(RwLock::new(op))
}

/// True when both handles point at the same op instance.
pub fn same_op(a: &OpHandle, b: &OpHandle) -> bool {
    std::ptr::eq(
        Arc::as_ptr(a) as *const (),
        Arc::as_ptr(b) as *const (),
    )
}

pub(crate) fn read_op<'a>(
    handle: &'a OpHandle,
    node: &str,
) -> Result<RwLockReadGuard<'a, dyn Op + 'static>, TensorGraphError> {
    handle
        .read()
        .map_err(|_| TensorGraphError::LockError(node.to_string()))
}

pub(crate) fn write_op<'a>(
    handle: &'a OpHandle,
    node: &str,
) -> Result<RwLockWriteGuard<'a, dyn Op + 'static>, TensorGraphError> {
    handle
        .write()
        .map_err(|_| TensorGraphError::LockError(node.to_string()))
}

pub(crate) fn expect_inputs(
    operation: &str,
    expected: usize,
    actual: usize,
) -> Result<(), TensorGraphError> {
    if expected != actual {
        return Err(TensorGraphError::InputCountMismatch {
            operation: operation.to_string(),
            expected,
            actual,
        });
    }
    Ok(())
}
