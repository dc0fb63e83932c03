use tensorgraph_core::nn::{Activation, FullyConnected, WeightsInit};
use tensorgraph_core::ops::PlaceHolder;
use tensorgraph_core::{Graph, TensorGraphError};

/// Installs `env_logger` once for the test binary; `RUST_LOG` controls the output.
#[allow(dead_code)]
pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// `x [batch, 3] -> FullyConnected(3, 2) "fc" -> Softmax`. Returns the graph and the
/// name of the softmax node.
#[allow(dead_code)]
pub fn softmax_classifier(seed: u64) -> Result<(Graph, String), TensorGraphError> {
    let mut graph = Graph::new();
    graph.add_node("x", &[], PlaceHolder::new())?;
    let layer = FullyConnected::new(3, 2)
        .with_activation(Activation::Softmax)
        .with_init(WeightsInit::XavierGlorot, seed);
    let output = graph.add_layer("fc", "x", &layer)?;
    Ok((graph, output))
}
