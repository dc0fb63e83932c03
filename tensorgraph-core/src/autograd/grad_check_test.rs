use super::*;
use crate::ops::{
    expect_inputs, Divide, MatrixMultiply, MeanSquareErrorLoss, Op, PlaceHolder, Sigmoid, Softmax,
    Weights,
};

fn config() -> GradCheckConfig {
    GradCheckConfig::default()
}

#[test]
fn test_sigmoid_gradient() -> Result<(), GradCheckError> {
    let mut g = Graph::new();
    g.add_node("x", &[], PlaceHolder::new())?;
    g.add_node("y", &["x"], Sigmoid::new())?;
    let x = Tensor::new(vec![-1.0, 0.0, 0.5, 2.0, -0.3, 1.2], vec![2, 3])?;
    let seed = Tensor::new(vec![1.0, -0.5, 2.0, 0.3, 1.0, -1.0], vec![2, 3])?;
    check_node_gradient(&mut g, "y", "x", &x, &seed, config())
}

#[test]
fn test_softmax_gradient() -> Result<(), GradCheckError> {
    let mut g = Graph::new();
    g.add_node("x", &[], PlaceHolder::new())?;
    g.add_node("y", &["x"], Softmax::new())?;
    let x = Tensor::new(vec![0.2, -0.4, 1.0, 0.0, 0.3, -0.2], vec![2, 3])?;
    let seed = Tensor::new(vec![0.0, 1.0, 0.5, 1.0, 0.0, -1.0], vec![2, 3])?;
    check_node_gradient(&mut g, "y", "x", &x, &seed, config())
}

#[test]
fn test_divide_gradients() -> Result<(), GradCheckError> {
    let mut g = Graph::new();
    g.add_node("a", &[], PlaceHolder::new())?;
    g.add_node("b", &[], PlaceHolder::new())?;
    g.add_node("q", &["a", "b"], Divide::new())?;
    let a = Tensor::new(vec![1.0, -2.0, 3.0, 0.5], vec![2, 2])?;
    let b = Tensor::new(vec![2.0, 1.5, -3.0, 4.0], vec![2, 2])?;
    let seed = Tensor::new(vec![1.0, 1.0, 1.0, 1.0], vec![2, 2])?;
    g.set_input("b", b.clone())?;
    check_node_gradient(&mut g, "q", "a", &a, &seed, config())?;
    check_node_gradient(&mut g, "q", "b", &b, &seed, config())
}

#[test]
fn test_trainable_weights_gradient() -> Result<(), GradCheckError> {
    let mut g = Graph::new();
    g.add_node("x", &[], PlaceHolder::new())?;
    g.add_node("w", &[], Weights::new(Tensor::new(vec![0.1, -0.2, 0.3, 0.4, 0.0, -0.1], vec![3, 2])?))?;
    g.add_node("xw", &["x", "w"], MatrixMultiply::new())?;
    g.add_node("t", &[], PlaceHolder::new())?;
    g.add_node("loss", &["xw", "t"], MeanSquareErrorLoss::new())?;
    g.set_input("x", Tensor::new(vec![1.0, 2.0, -1.0, 0.5, 0.0, 1.5], vec![2, 3])?)?;
    g.set_input("t", Tensor::new(vec![0.0, 1.0, 1.0, 0.0], vec![2, 2])?)?;

    let w = g.get_weights()?[0].clone();
    let seed = Tensor::new(vec![1.0], vec![1, 1])?;
    check_node_gradient(&mut g, "loss", "w", &w, &seed, config())
}

/// Scales its input by 2 but reports a gradient of 1.
#[derive(Debug)]
struct WrongDouble;

impl Op for WrongDouble {
    fn descriptor(&self) -> &'static str {
        "WrongDouble"
    }

    fn compute_output_shape(&self, input_shapes: &[Vec<usize>]) -> Result<Vec<usize>, TensorGraphError> {
        expect_inputs("WrongDouble", 1, input_shapes.len())?;
        Ok(input_shapes[0].clone())
    }

    fn forward(&self, inputs: &[&Tensor], output: &mut Tensor, _is_training: bool) -> Result<(), TensorGraphError> {
        output.assign(&inputs[0].scale(2.0))
    }

    fn backward(&mut self, _inputs: &[&Tensor], error_signal: &Tensor) -> Result<Vec<Tensor>, TensorGraphError> {
        Ok(vec![error_signal.clone()])
    }
}

#[test]
fn test_detects_wrong_backward() -> Result<(), TensorGraphError> {
    let mut g = Graph::new();
    g.add_node("x", &[], PlaceHolder::new())?;
    g.add_node("y", &["x"], WrongDouble)?;
    let x = Tensor::new(vec![1.0, 2.0], vec![1, 2])?;
    let seed = Tensor::new(vec![1.0, 1.0], vec![1, 2])?;
    match check_node_gradient(&mut g, "y", "x", &x, &seed, config()) {
        Err(GradCheckError::GradientMismatch { element_index, analytical, numerical, .. }) => {
            assert_eq!(element_index, 0);
            approx::assert_relative_eq!(analytical, 1.0);
            approx::assert_relative_eq!(numerical, 2.0, epsilon = 1e-3);
        }
        other => panic!("expected a gradient mismatch, got {:?}", other),
    }
    Ok(())
}

#[test]
fn test_missing_signal() -> Result<(), TensorGraphError> {
    let mut g = Graph::new();
    g.add_node("x", &[], PlaceHolder::new())?;
    g.add_node("unused", &[], PlaceHolder::new())?;
    g.add_node("y", &["x"], Sigmoid::new())?;
    g.set_input("x", Tensor::new(vec![0.0], vec![1, 1])?)?;
    let value = Tensor::new(vec![1.0], vec![1, 1])?;
    let result = check_node_gradient(&mut g, "y", "unused", &value, &value, config());
    assert_eq!(result, Err(GradCheckError::MissingAnalyticalGrad("unused".to_string())));
    Ok(())
}
