use crate::error::TensorGraphError;
use std::fmt;

/// Lifecycle state of a [`Graph`](crate::graph::Graph).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GraphState {
    /// The last compile failed; the graph must be fixed and recompiled.
    Invalid,
    /// Nodes were added since the last compile.
    #[default]
    NotCompiled,
    Compiled,
    /// At least one forward pass ran since the last update.
    Evaluated,
    /// Gradients were accumulated and not yet applied. Further forward passes keep
    /// this state so the pending gradients can still be applied.
    Backward,
    /// Gradients were applied to the trainables.
    Updated,
}

/// Inputs of the state machine, one per state-changing graph operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphEvent {
    NodeAdded,
    CompileSucceeded,
    CompileFailed,
    Evaluate,
    BackPropagate,
    ApplyGradients,
}

impl fmt::Display for GraphState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            GraphState::Invalid => "Invalid",
            GraphState::NotCompiled => "NotCompiled",
            GraphState::Compiled => "Compiled",
            GraphState::Evaluated => "Evaluated",
            GraphState::Backward => "Backward",
            GraphState::Updated => "Updated",
        };
        write!(f, "{}", s)
    }
}

impl GraphState {
    /// True once linking succeeded and no node was added afterwards.
    pub fn is_compiled(&self) -> bool {
        matches!(
            self,
            GraphState::Compiled | GraphState::Evaluated | GraphState::Backward | GraphState::Updated
        )
    }

    /// Transition table. Illegal transitions are rejected with `InvalidMode` and leave
    /// the state unchanged.
    pub fn transition(self, event: GraphEvent) -> Result<GraphState, TensorGraphError> {
        use GraphEvent as E;
        use GraphState as S;
        match (self, event) {
            (_, E::NodeAdded) => Ok(S::NotCompiled),
            (_, E::CompileFailed) => Ok(S::Invalid),
            (S::Invalid | S::NotCompiled, E::CompileSucceeded) => Ok(S::Compiled),
            // Recompiling a linked graph keeps its progress.
            (s, E::CompileSucceeded) => Ok(s),

            (S::Backward, E::Evaluate) => Ok(S::Backward),
            (s, E::Evaluate) if s.is_compiled() => Ok(S::Evaluated),
            (S::Evaluated | S::Backward, E::BackPropagate) => Ok(S::Backward),
            (S::Backward, E::ApplyGradients) => Ok(S::Updated),

            (S::Compiled | S::Updated, E::BackPropagate) => Err(TensorGraphError::InvalidMode(
                format!("cannot backpropagate from state {}: forward pass not completed", self),
            )),
            (_, E::ApplyGradients) => Err(TensorGraphError::InvalidMode(format!(
                "cannot apply gradients from state {}: backpropagate not previously called",
                self
            ))),
            (s, e) => Err(TensorGraphError::InvalidMode(format!(
                "illegal transition {:?} from state {}: graph not compiled or invalid",
                e, s
            ))),
        }
    }
}

#[cfg(test)]
#[path = "state_test.rs"]
mod tests;
