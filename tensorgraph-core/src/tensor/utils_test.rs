use super::*;

#[test]
fn test_calculate_strides_simple() {
    assert_eq!(calculate_strides(&[2, 3]), vec![3, 1]);
    assert_eq!(calculate_strides(&[4, 5, 6]), vec![30, 6, 1]);
    assert_eq!(calculate_strides(&[5]), vec![1]);
    assert_eq!(calculate_strides(&[5, 1]), vec![1, 1]);
}

#[test]
fn test_calculate_strides_empty() {
    assert_eq!(calculate_strides(&[]), Vec::<usize>::new());
}

#[test]
fn test_numel() {
    assert_eq!(numel(&[]), 0);
    assert_eq!(numel(&[2, 3]), 6);
    assert_eq!(numel(&[2, 0]), 0);
}

#[test]
fn test_as_matrix_rejects_other_ranks() {
    assert_eq!(as_matrix(&[2, 3], "test"), Ok((2, 3)));
    assert!(as_matrix(&[2, 3, 4], "test").is_err());
}
