use super::*;

#[test]
fn test_zeros_ones_full() {
    let z = zeros(&[2, 3]);
    assert_eq!(z.shape(), &[2, 3]);
    assert!(z.data().iter().all(|&x| x == 0.0));

    let o = ones(&[4]);
    assert_eq!(o.data(), &[1.0; 4]);

    let f = full(&[1, 2], 7.5);
    assert_eq!(f.data(), &[7.5, 7.5]);
}

#[test]
fn test_like_constructors() {
    let base = full(&[3, 1], 2.0);
    assert_eq!(zeros_like(&base).shape(), &[3, 1]);
    assert_eq!(ones_like(&base).data(), &[1.0, 1.0, 1.0]);
}
