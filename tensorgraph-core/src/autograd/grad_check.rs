use crate::error::TensorGraphError;
use crate::graph::Graph;
use crate::ops::read_op;
use crate::tensor::{zeros_like, Tensor};
use log::debug;
use thiserror::Error;

/// Error type specifically for gradient checking failures.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GradCheckError {
    #[error("Gradient check failed for [{node}] at element {element_index}: analytical {analytical} != numerical {numerical} (difference {difference})")]
    GradientMismatch {
        node: String,
        element_index: usize,
        analytical: f64,
        numerical: f64,
        difference: f64,
    },

    #[error("No error signal reached [{0}] during the backward pass")]
    MissingAnalyticalGrad(String),

    #[error("Numerical gradient is NaN or infinite for [{node}], element {element_index} (loss+ {loss_plus}, loss- {loss_minus})")]
    NumericalGradNaNOrInfinite {
        node: String,
        element_index: usize,
        loss_plus: f64,
        loss_minus: f64,
    },

    #[error("Graph error during gradient check: {0}")]
    GraphError(TensorGraphError),
}

impl From<TensorGraphError> for GradCheckError {
    fn from(err: TensorGraphError) -> Self {
        GradCheckError::GraphError(err)
    }
}

/// Finite-difference settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradCheckConfig {
    /// Perturbation applied to each element, in both directions.
    pub epsilon: f64,
    /// Allowed `|analytical - numerical|`, scaled by `1 + |numerical|`.
    pub tolerance: f64,
}

impl Default for GradCheckConfig {
    fn default() -> Self {
        GradCheckConfig {
            epsilon: 1e-2,
            tolerance: 1e-2,
        }
    }
}

/// Scalar loss whose gradient with respect to `output` is `output_grad`.
fn weighted_sum(output: &Tensor, output_grad: &Tensor) -> Result<f64, TensorGraphError> {
    Ok(output
        .mul(output_grad)?
        .data()
        .iter()
        .map(|&x| x as f64)
        .sum())
}

/// Gradient the last backward pass produced for `node`: the parameter accumulator for
/// trainables, the summed error signals for other data holders.
fn analytical_gradient(
    graph: &Graph,
    node: &str,
    signals: &std::collections::BTreeMap<String, Vec<Tensor>>,
    like: &Tensor,
) -> Result<Tensor, GradCheckError> {
    let handle = graph.node(node)?.op().clone();
    if let Some(parameter) = read_op(&handle, node)?.parameter() {
        return Ok(parameter.gradients().clone());
    }
    let received = signals
        .get(node)
        .ok_or_else(|| GradCheckError::MissingAnalyticalGrad(node.to_string()))?;
    let mut total = zeros_like(like);
    for signal in received {
        total.add_assign(signal)?;
    }
    Ok(total)
}

/// Checks the gradient of `output` with respect to the data-holder node `node`.
///
/// `node` is set to `value`, then perturbed one element at a time. `output_grad` seeds
/// the backward pass and weights the output when forming the scalar loss. The pass goes
/// through [`Graph::back_propagate_signals`], so regularisers do not contribute.
///
/// Trainable gradients are reset before returning; `node` keeps `value`.
pub fn check_node_gradient(
    graph: &mut Graph,
    output: &str,
    node: &str,
    value: &Tensor,
    output_grad: &Tensor,
    config: GradCheckConfig,
) -> Result<(), GradCheckError> {
    graph.reset_gradients()?;
    graph.set_input(node, value.clone())?;
    graph.evaluate(output, true)?;
    let signals = graph.back_propagate_signals(output, output_grad)?;
    let analytical = analytical_gradient(graph, node, &signals, value)?;
    graph.reset_gradients()?;

    let mut loss_at = |perturbed: Tensor| -> Result<f64, GradCheckError> {
        graph.set_input(node, perturbed)?;
        let out = graph.evaluate(output, true)?;
        Ok(weighted_sum(&out, output_grad)?)
    };

    for element_index in 0..value.numel() {
        let mut plus = value.clone();
        plus.data_mut()[element_index] += config.epsilon as f32;
        let mut minus = value.clone();
        minus.data_mut()[element_index] -= config.epsilon as f32;

        let loss_plus = loss_at(plus)?;
        let loss_minus = loss_at(minus)?;
        let numerical = (loss_plus - loss_minus) / (2.0 * config.epsilon);
        if !numerical.is_finite() {
            return Err(GradCheckError::NumericalGradNaNOrInfinite {
                node: node.to_string(),
                element_index,
                loss_plus,
                loss_minus,
            });
        }

        let analytical = analytical.data()[element_index] as f64;
        let difference = (analytical - numerical).abs();
        if difference > config.tolerance * (1.0 + numerical.abs()) {
            return Err(GradCheckError::GradientMismatch {
                node: node.to_string(),
                element_index,
                analytical,
                numerical,
                difference,
            });
        }
    }

    graph.set_input(node, value.clone())?;
    debug!("Gradient check passed for [{}] ({} elements)", node, value.numel());
    Ok(())
}

#[cfg(test)]
#[path = "grad_check_test.rs"]
mod tests;
