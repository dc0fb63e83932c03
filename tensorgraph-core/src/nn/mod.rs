// src/nn/mod.rs

//! # Neural network building blocks (`nn`)
//!
//! - [`Parameter`]: the learnable state of trainable ops.
//! - [`init`]: seeded weight initialisation schemes.
//! - [`Regulariser`]: L1/L2 penalties folded into the gradients.
//! - [`layers`]: multi-node building blocks such as [`FullyConnected`].

pub mod init;
pub mod layers;
pub mod parameter;
pub mod regulariser;

pub use init::WeightsInit;
pub use layers::{Activation, FullyConnected, Layer};
pub use parameter::Parameter;
pub use regulariser::Regulariser;
