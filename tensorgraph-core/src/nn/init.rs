use crate::error::TensorGraphError;
use crate::tensor::{full, Tensor};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal, Uniform};

/// Weight initialisation schemes.
///
/// The Xavier variants draw from `Normal(0, sigma)` (gaussian) or `Uniform(-l, l)` with
/// the Glorot scale computed from the fan-in and fan-out of the weights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WeightsInit {
    Zeros,
    Ones,
    /// `sigma = sqrt(2 / (fan_in + fan_out))`
    #[default]
    XavierGlorot,
    /// `sigma = sqrt(1 / fan_in)`
    XavierFanIn,
    /// `sigma = sqrt(1 / fan_out)`
    XavierFanOut,
    /// `l = sqrt(6 / (fan_in + fan_out))`
    XavierGlorotUniform,
    /// `l = sqrt(3 / fan_in)`
    XavierFanInUniform,
    /// `l = sqrt(3 / fan_out)`
    XavierFanOutUniform,
}

/// Fan-in and fan-out of a weight shape: the first dimension against the rest.
pub fn fan_in_fan_out(shape: &[usize]) -> (usize, usize) {
    match shape.split_first() {
        Some((&fan_in, rest)) if !rest.is_empty() => (fan_in, rest.iter().product()),
        Some((&fan_in, _)) => (fan_in, 1),
        None => (0, 0),
    }
}

/// Creates a tensor of `shape` initialised by `mode`, deterministically for a given `seed`.
pub fn initialise(shape: &[usize], mode: WeightsInit, seed: u64) -> Result<Tensor, TensorGraphError> {
    let (fan_in, fan_out) = fan_in_fan_out(shape);
    initialise_with_fans(shape, fan_in, fan_out, mode, seed)
}

/// Like [`initialise`], with explicit fan sizes (e.g. when the shape is not `[in, out]`).
pub fn initialise_with_fans(
    shape: &[usize],
    fan_in: usize,
    fan_out: usize,
    mode: WeightsInit,
    seed: u64,
) -> Result<Tensor, TensorGraphError> {
    let gaussian = |scale: f32| sample(shape, seed, Sampler::Gaussian(scale));
    let uniform = |scale: f32| sample(shape, seed, Sampler::Uniform(scale));
    match mode {
        WeightsInit::Zeros => Ok(full(shape, 0.0)),
        WeightsInit::Ones => Ok(full(shape, 1.0)),
        WeightsInit::XavierGlorot => gaussian(scale(2.0, fan_in + fan_out)?),
        WeightsInit::XavierFanIn => gaussian(scale(1.0, fan_in)?),
        WeightsInit::XavierFanOut => gaussian(scale(1.0, fan_out)?),
        WeightsInit::XavierGlorotUniform => uniform(scale(6.0, fan_in + fan_out)?),
        WeightsInit::XavierFanInUniform => uniform(scale(3.0, fan_in)?),
        WeightsInit::XavierFanOutUniform => uniform(scale(3.0, fan_out)?),
    }
}

fn scale(numerator: f32, size: usize) -> Result<f32, TensorGraphError> {
    if size == 0 {
        return Err(TensorGraphError::InvalidMode(
            "Xavier initialisation requires non-zero fan sizes".to_string(),
        ));
    }
    Ok((numerator / size as f32).sqrt())
}

enum Sampler {
    Gaussian(f32),
    Uniform(f32),
}

fn sample(shape: &[usize], seed: u64, sampler: Sampler) -> Result<Tensor, TensorGraphError> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut tensor = full(shape, 0.0);
    match sampler {
        Sampler::Gaussian(sigma) => {
            let dist = Normal::new(0.0f32, sigma)
                .map_err(|e| TensorGraphError::InvalidMode(format!("normal distribution: {}", e)))?;
            tensor.data_mut().iter_mut().for_each(|x| *x = dist.sample(&mut rng));
        }
        Sampler::Uniform(limit) => {
            let dist = Uniform::new_inclusive(-limit, limit);
            tensor.data_mut().iter_mut().for_each(|x| *x = dist.sample(&mut rng));
        }
    }
    Ok(tensor)
}

#[cfg(test)]
#[path = "init_test.rs"]
mod tests;
