/// Runtime switches for a [`Graph`](crate::graph::Graph).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphConfig {
    /// Fail forward and backward passes that produce NaN or infinite values.
    pub check_numeric_health: bool,
}

impl Default for GraphConfig {
    fn default() -> Self {
        GraphConfig {
            check_numeric_health: true,
        }
    }
}
