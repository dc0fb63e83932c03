//! # Gradient verification (`autograd`)
//!
//! The graph computes gradients analytically, each op supplying its own backward.
//! [`grad_check`] compares those against central finite differences taken through
//! the same graph, which is how new op kernels are validated.

pub mod grad_check;

pub use grad_check::{check_node_gradient, GradCheckConfig, GradCheckError};
