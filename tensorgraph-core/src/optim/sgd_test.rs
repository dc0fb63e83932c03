use super::*;
use crate::ops::{MeanSquareErrorLoss, PlaceHolder, Weights};
use approx::assert_relative_eq;

/// `loss = mean((w - t)^2)` with `w = [1, 2]`, `t = [0, 0]`, so `dloss/dw = w`.
fn regression_graph() -> Result<Graph, TensorGraphError> {
    let mut g = Graph::new();
    g.add_node("w", &[], Weights::new(Tensor::new(vec![1.0, 2.0], vec![1, 2])?))?;
    g.add_node("t", &[], PlaceHolder::new())?;
    g.add_node("loss", &["w", "t"], MeanSquareErrorLoss::new())?;
    g.set_input("t", Tensor::new(vec![0.0, 0.0], vec![1, 2])?)?;
    Ok(g)
}

fn forward_backward(g: &mut Graph) -> Result<(), TensorGraphError> {
    g.evaluate("loss", true)?;
    g.back_propagate_error("loss")
}

#[test]
fn test_sgd_basic_step() -> Result<(), TensorGraphError> {
    let mut g = regression_graph()?;
    let mut optimizer = SgdOptimizer::new(0.1, 0.0);
    forward_backward(&mut g)?;
    optimizer.step(&mut g)?;

    let w = &g.get_weights()?[0];
    assert_relative_eq!(w.data()[0], 0.9, epsilon = 1e-6);
    assert_relative_eq!(w.data()[1], 1.8, epsilon = 1e-6);
    assert!(g.get_gradients()?[0].data().iter().all(|&x| x == 0.0));
    Ok(())
}

#[test]
fn test_sgd_momentum() -> Result<(), TensorGraphError> {
    let mut g = regression_graph()?;
    let mut optimizer = SgdOptimizer::new(0.1, 0.9);
    forward_backward(&mut g)?;
    optimizer.step(&mut g)?;
    forward_backward(&mut g)?;
    optimizer.step(&mut g)?;

    // v1 = [1, 2]; v2 = 0.9 * v1 + [0.9, 1.8] = [1.8, 3.6]
    let w = &g.get_weights()?[0];
    assert_relative_eq!(w.data()[0], 0.72, epsilon = 1e-5);
    assert_relative_eq!(w.data()[1], 1.44, epsilon = 1e-5);
    Ok(())
}

#[test]
fn test_step_requires_backward() -> Result<(), TensorGraphError> {
    let mut g = regression_graph()?;
    let mut optimizer = SgdOptimizer::new(0.1, 0.0);
    g.evaluate("loss", true)?;
    assert!(matches!(optimizer.step(&mut g), Err(TensorGraphError::InvalidMode(_))));
    Ok(())
}

#[test]
fn test_zero_grad_and_learning_rate() -> Result<(), TensorGraphError> {
    let mut g = regression_graph()?;
    let mut optimizer = SgdOptimizer::new(0.1, 0.0);
    forward_backward(&mut g)?;
    optimizer.zero_grad(&mut g)?;
    assert!(g.get_gradients()?[0].data().iter().all(|&x| x == 0.0));

    optimizer.set_learning_rate(0.5);
    assert_relative_eq!(optimizer.learning_rate(), 0.5);
    Ok(())
}
