use super::*;

#[test]
fn test_training_cycle() -> Result<(), TensorGraphError> {
    let mut s = GraphState::NotCompiled;
    s = s.transition(GraphEvent::CompileSucceeded)?;
    assert_eq!(s, GraphState::Compiled);
    s = s.transition(GraphEvent::Evaluate)?;
    assert_eq!(s, GraphState::Evaluated);
    s = s.transition(GraphEvent::BackPropagate)?;
    s = s.transition(GraphEvent::BackPropagate)?;
    assert_eq!(s, GraphState::Backward);
    s = s.transition(GraphEvent::ApplyGradients)?;
    assert_eq!(s, GraphState::Updated);
    s = s.transition(GraphEvent::Evaluate)?;
    assert_eq!(s, GraphState::Evaluated);
    Ok(())
}

#[test]
fn test_evaluate_keeps_pending_gradients() -> Result<(), TensorGraphError> {
    let s = GraphState::Backward.transition(GraphEvent::Evaluate)?;
    assert_eq!(s, GraphState::Backward);
    assert_eq!(s.transition(GraphEvent::ApplyGradients)?, GraphState::Updated);
    Ok(())
}

#[test]
fn test_node_added_resets_to_not_compiled() -> Result<(), TensorGraphError> {
    for s in [GraphState::Invalid, GraphState::Compiled, GraphState::Backward, GraphState::Updated] {
        assert_eq!(s.transition(GraphEvent::NodeAdded)?, GraphState::NotCompiled);
    }
    Ok(())
}

#[test]
fn test_recompile_keeps_progress() -> Result<(), TensorGraphError> {
    assert_eq!(
        GraphState::Backward.transition(GraphEvent::CompileSucceeded)?,
        GraphState::Backward
    );
    assert_eq!(
        GraphState::Invalid.transition(GraphEvent::CompileSucceeded)?,
        GraphState::Compiled
    );
    assert_eq!(
        GraphState::Evaluated.transition(GraphEvent::CompileFailed)?,
        GraphState::Invalid
    );
    Ok(())
}

#[test]
fn test_illegal_transitions_are_rejected() {
    let rejected = [
        (GraphState::NotCompiled, GraphEvent::Evaluate),
        (GraphState::Invalid, GraphEvent::Evaluate),
        (GraphState::Compiled, GraphEvent::BackPropagate),
        (GraphState::Updated, GraphEvent::BackPropagate),
        (GraphState::Compiled, GraphEvent::ApplyGradients),
        (GraphState::Evaluated, GraphEvent::ApplyGradients),
        (GraphState::Updated, GraphEvent::ApplyGradients),
        (GraphState::NotCompiled, GraphEvent::BackPropagate),
    ];
    for (state, event) in rejected {
        assert!(
            matches!(state.transition(event), Err(TensorGraphError::InvalidMode(_))),
            "{:?} from {} should be rejected",
            event,
            state
        );
    }
}
