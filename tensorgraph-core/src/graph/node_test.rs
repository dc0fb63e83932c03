use super::*;
use crate::ops::{into_handle, Add, PlaceHolder, Relu, Weights};
use crate::tensor::full;

fn placeholder_with(data: Tensor) -> OpHandle {
    let mut ph = PlaceHolder::new();
    crate::ops::DataHolder::set_data(&mut ph, data).unwrap();
    into_handle(ph)
}

/// x -> relu
fn chain() -> (NodeArena, NodeId, NodeId) {
    let mut arena = NodeArena::new();
    let x = arena.push(
        Node::new("x".to_string(), placeholder_with(Tensor::new(vec![-1.0, 2.0], vec![1, 2]).unwrap()))
            .unwrap(),
    );
    let r = arena.push(Node::new("r".to_string(), into_handle(Relu::new())).unwrap());
    arena.link(r, x);
    (arena, x, r)
}

#[test]
fn test_evaluate_populates_cache() -> Result<(), TensorGraphError> {
    let (mut arena, x, r) = chain();
    let config = GraphConfig::default();
    assert_eq!(arena.get(r).cache_state(), CacheState::ChangedSize);
    arena.evaluate(r, false, &config)?;
    assert_eq!(arena.get(r).cache().data(), &[0.0, 2.0]);
    assert_eq!(arena.get(r).cache_state(), CacheState::ValidCache);
    assert_eq!(arena.get(x).cache_state(), CacheState::ValidCache);
    assert_eq!(arena.get(r).descriptor(), "Relu");
    Ok(())
}

#[test]
fn test_reset_cache_never_downgrades_size_change() {
    let (mut arena, _, r) = chain();
    arena.get_mut(r).reset_cache(false);
    assert_eq!(arena.get(r).cache_state(), CacheState::ChangedSize);
}

#[test]
fn test_invalidate_downstream() -> Result<(), TensorGraphError> {
    let (mut arena, x, r) = chain();
    let config = GraphConfig::default();
    arena.evaluate(r, false, &config)?;
    arena.invalidate_downstream(&[x], false);
    assert_eq!(arena.get(x).cache_state(), CacheState::ChangedContent);
    assert_eq!(arena.get(r).cache_state(), CacheState::ChangedContent);
    arena.invalidate_downstream(&[x], true);
    assert_eq!(arena.get(r).cache_state(), CacheState::ChangedSize);
    Ok(())
}

#[test]
fn test_back_propagate_collects_leaf_signals() -> Result<(), TensorGraphError> {
    // w + x -> relu
    let mut arena = NodeArena::new();
    let config = GraphConfig::default();
    let x = arena.push(Node::new("x".to_string(), placeholder_with(full(&[1, 2], 1.0)))?);
    let w = arena.push(Node::new("w".to_string(), into_handle(Weights::new(full(&[1, 2], -2.0))))?);
    let add = arena.push(Node::new("add".to_string(), into_handle(Add::new()))?);
    let relu = arena.push(Node::new("relu".to_string(), into_handle(Relu::new()))?);
    arena.link(add, x);
    arena.link(add, w);
    arena.link(relu, add);

    arena.evaluate(relu, true, &config)?;
    let signals = arena.back_propagate(add, &full(&[1, 2], 1.0), &config)?;
    let keys: Vec<NodeId> = signals.keys().copied().collect();
    assert_eq!(keys, vec![x, w]);
    assert_eq!(signals[&w][0].data(), &[1.0, 1.0]);

    let op = read_op(arena.get(w).op(), "w")?;
    assert_eq!(op.parameter().unwrap().gradients().data(), &[1.0, 1.0]);
    Ok(())
}

#[test]
fn test_numeric_health_on_forward() -> Result<(), TensorGraphError> {
    let mut arena = NodeArena::new();
    let x = arena.push(Node::new("x".to_string(), placeholder_with(full(&[1, 1], f32::NAN)))?);
    let r = arena.push(Node::new("r".to_string(), into_handle(Relu::new()))?);
    arena.link(r, x);
    let result = arena.evaluate(x, false, &GraphConfig::default());
    assert!(matches!(
        result,
        Err(TensorGraphError::NumericHealth { stage: PassStage::Forward, .. })
    ));

    let lenient = GraphConfig {
        check_numeric_health: false,
    };
    arena.evaluate(x, false, &lenient)?;
    assert!(arena.get(x).cache().data()[0].is_nan());
    Ok(())
}

#[test]
fn test_batch_output_shape() -> Result<(), TensorGraphError> {
    let (mut arena, _, r) = chain();
    assert_eq!(arena.batch_output_shape(r)?, vec![1, 2]);

    // Unset placeholder: shape is indeterminate, not an error.
    let mut arena = NodeArena::new();
    let x = arena.push(Node::new("x".to_string(), into_handle(PlaceHolder::new()))?);
    let r = arena.push(Node::new("r".to_string(), into_handle(Relu::new()))?);
    arena.link(r, x);
    assert!(arena.batch_output_shape(r)?.is_empty());
    Ok(())
}

#[test]
fn test_find_cycle() {
    let (mut arena, x, r) = chain();
    assert_eq!(arena.find_cycle(), None);
    arena.link(x, r);
    assert!(arena.find_cycle().is_some());
}
