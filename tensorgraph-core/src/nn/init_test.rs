use super::*;

#[test]
fn test_constant_initialisers() -> Result<(), TensorGraphError> {
    let z = initialise(&[2, 3], WeightsInit::Zeros, 0)?;
    assert!(z.data().iter().all(|&x| x == 0.0));
    let o = initialise(&[2, 3], WeightsInit::Ones, 0)?;
    assert!(o.data().iter().all(|&x| x == 1.0));
    Ok(())
}

#[test]
fn test_same_seed_same_weights() -> Result<(), TensorGraphError> {
    let a = initialise(&[4, 5], WeightsInit::XavierGlorot, 42)?;
    let b = initialise(&[4, 5], WeightsInit::XavierGlorot, 42)?;
    let c = initialise(&[4, 5], WeightsInit::XavierGlorot, 43)?;
    assert_eq!(a, b);
    assert_ne!(a, c);
    Ok(())
}

#[test]
fn test_uniform_respects_limit() -> Result<(), TensorGraphError> {
    let (fan_in, fan_out) = (10, 20);
    let limit = (6.0f32 / (fan_in + fan_out) as f32).sqrt();
    let w = initialise(&[fan_in, fan_out], WeightsInit::XavierGlorotUniform, 7)?;
    assert_eq!(w.shape(), &[10, 20]);
    assert!(w.data().iter().all(|x| x.abs() <= limit));

    let limit_in = (3.0f32 / fan_in as f32).sqrt();
    let w = initialise(&[fan_in, fan_out], WeightsInit::XavierFanInUniform, 7)?;
    assert!(w.data().iter().all(|x| x.abs() <= limit_in));
    Ok(())
}

#[test]
fn test_gaussian_is_centred() -> Result<(), TensorGraphError> {
    let w = initialise(&[100, 100], WeightsInit::XavierFanOut, 3)?;
    let mean = w.sum() / w.numel() as f32;
    assert!(mean.abs() < 0.01, "mean was {}", mean);
    Ok(())
}

#[test]
fn test_fan_sizes() {
    assert_eq!(fan_in_fan_out(&[3, 2]), (3, 2));
    assert_eq!(fan_in_fan_out(&[4, 2, 5]), (4, 10));
    assert_eq!(fan_in_fan_out(&[7]), (7, 1));
    assert_eq!(fan_in_fan_out(&[]), (0, 0));
}

#[test]
fn test_zero_fan_is_rejected() {
    assert!(matches!(
        initialise(&[], WeightsInit::XavierGlorot, 0),
        Err(TensorGraphError::InvalidMode(_))
    ));
}
