/// Weight penalty added to a parameter's gradient after every backward pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Regulariser {
    /// `rate * |w|`, gradient `rate * sign(w)`.
    L1,
    /// `rate * w^2`, gradient `2 * rate * w`.
    L2,
}

impl Regulariser {
    /// Gradient of the penalty with respect to a single weight.
    pub fn gradient(&self, weight: f32, rate: f32) -> f32 {
        match self {
            Regulariser::L1 => {
                if weight > 0.0 {
                    rate
                } else if weight < 0.0 {
                    -rate
                } else {
                    0.0
                }
            }
            Regulariser::L2 => 2.0 * rate * weight,
        }
    }
}
