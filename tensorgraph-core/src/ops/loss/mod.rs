// src/ops/loss/mod.rs

//! # Loss Functions
//!
//! Ops that reduce a prediction and a target to a single `[1, 1]` value.

pub mod mse;

pub use mse::MeanSquareErrorLoss;
