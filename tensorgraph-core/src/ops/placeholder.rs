use crate::error::TensorGraphError;
use crate::ops::{expect_inputs, DataHolder, Op};
use crate::tensor::Tensor;

/// Leaf op whose value is supplied from outside the graph through `Graph::set_input`.
#[derive(Debug, Clone, Default)]
pub struct PlaceHolder {
    data: Tensor,
}

impl PlaceHolder {
    pub fn new() -> Self {
        PlaceHolder::default()
    }
}

fn leaf_shape(operation: &str, data: &Tensor, input_shapes: &[Vec<usize>]) -> Result<Vec<usize>, TensorGraphError> {
    expect_inputs(operation, 0, input_shapes.len())?;
    Ok(data.shape().to_vec())
}

fn leaf_forward(operation: &str, data: &Tensor, output: &mut Tensor) -> Result<(), TensorGraphError> {
    if data.is_empty() {
        return Err(TensorGraphError::InvalidMode(format!(
            "{} evaluated before any data was set",
            operation
        )));
    }
    output.assign(data)
}

impl Op for PlaceHolder {
    fn descriptor(&self) -> &'static str {
        "PlaceHolder"
    }

    fn compute_output_shape(&self, input_shapes: &[Vec<usize>]) -> Result<Vec<usize>, TensorGraphError> {
        leaf_shape(self.descriptor(), &self.data, input_shapes)
    }

    fn forward(&self, _inputs: &[&Tensor], output: &mut Tensor, _is_training: bool) -> Result<(), TensorGraphError> {
        leaf_forward(self.descriptor(), &self.data, output)
    }

    fn backward(&mut self, _inputs: &[&Tensor], _error_signal: &Tensor) -> Result<Vec<Tensor>, TensorGraphError> {
        Ok(Vec::new())
    }

    fn known_output_shape(&self) -> Option<Vec<usize>> {
        (!self.data.is_empty()).then(|| self.data.shape().to_vec())
    }

    fn as_data_holder_mut(&mut self) -> Option<&mut dyn DataHolder> {
        Some(self)
    }
}

impl DataHolder for PlaceHolder {
    fn set_data(&mut self, data: Tensor) -> Result<bool, TensorGraphError> {
        let shape_changed = data.shape() != self.data.shape();
        self.data = data;
        Ok(shape_changed)
    }

    fn data(&self) -> &Tensor {
        &self.data
    }
}

/// Placeholder that accepts its data exactly once.
#[derive(Debug, Clone, Default)]
pub struct Constant {
    data: Tensor,
    data_set: bool,
}

impl Constant {
    pub fn new() -> Self {
        Constant::default()
    }

    /// A constant created with its value already fixed.
    pub fn with_value(data: Tensor) -> Self {
        Constant { data, data_set: true }
    }
}

impl Op for Constant {
    fn descriptor(&self) -> &'static str {
        "Constant"
    }

    fn compute_output_shape(&self, input_shapes: &[Vec<usize>]) -> Result<Vec<usize>, TensorGraphError> {
        leaf_shape(self.descriptor(), &self.data, input_shapes)
    }

    fn forward(&self, _inputs: &[&Tensor], output: &mut Tensor, _is_training: bool) -> Result<(), TensorGraphError> {
        leaf_forward(self.descriptor(), &self.data, output)
    }

    fn backward(&mut self, _inputs: &[&Tensor], _error_signal: &Tensor) -> Result<Vec<Tensor>, TensorGraphError> {
        Ok(Vec::new())
    }

    fn known_output_shape(&self) -> Option<Vec<usize>> {
        (!self.data.is_empty()).then(|| self.data.shape().to_vec())
    }

    fn as_data_holder_mut(&mut self) -> Option<&mut dyn DataHolder> {
        Some(self)
    }
}

impl DataHolder for Constant {
    fn set_data(&mut self, data: Tensor) -> Result<bool, TensorGraphError> {
        if self.data_set {
            return Err(TensorGraphError::InvalidMode(
                "data of a Constant can only be set once".to_string(),
            ));
        }
        let shape_changed = data.shape() != self.data.shape();
        self.data = data;
        self.data_set = true;
        Ok(shape_changed)
    }

    fn data(&self) -> &Tensor {
        &self.data
    }
}

#[cfg(test)]
#[path = "placeholder_test.rs"]
mod tests;
