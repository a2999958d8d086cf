use ndarray::array;

use ndarray::ArrayView1;

use crate::error::AutomorphismError;
use crate::matrix::{
    finite_exponent, from_rows, identity, inverse_modulo, is_bijective_endomorphism,
    is_homomorphism_matrix, matmul_reduced, reduce_modulo, spans_modulo, to_rows, vecmat_reduced,
};

#[test]
fn test_matrix_reduction() {
    let mat = array![[3, -1, 9], [-2, 5, 4], [1, 1, -1]];
    let reduced = reduce_modulo(&mat, &[2, 3, 4]);
    assert_eq!(reduced, array![[1, 2, 1], [0, 2, 0], [1, 1, 3]]);

    let a = array![[1, 1], [0, 1]];
    assert_eq!(
        matmul_reduced(&a, &a, &[3, 3]).unwrap(),
        array![[1, 2], [0, 1]]
    );
    assert_eq!(
        matmul_reduced(&identity(2), &a, &[3, 3]).unwrap(),
        reduce_modulo(&a, &[3, 3])
    );
}

#[test]
fn test_matrix_rows() {
    let mat = array![[1, 0, 2], [0, 2, 0], [1, 0, 1]];
    let rows = to_rows(&mat);
    assert_eq!(rows, vec![vec![1, 0, 2], vec![0, 2, 0], vec![1, 0, 1]]);
    assert_eq!(from_rows(&rows), Some(mat));
    assert_eq!(from_rows(&[vec![1, 2], vec![3]]), None);
    assert_eq!(from_rows(&[]).map(|m| m.dim()), Some((0, 0)));
}

#[test]
fn test_matrix_homomorphism_condition() {
    let orders = [2, 3, 4];
    assert!(is_homomorphism_matrix(
        &array![[1, 0, 2], [0, 2, 0], [1, 0, 1]],
        &orders
    ));
    // The image of a generator of order 2 cannot have order 4.
    assert!(!is_homomorphism_matrix(
        &array![[1, 0, 1], [0, 1, 0], [0, 0, 1]],
        &orders
    ));
    // The image of a generator of order 3 cannot have a component of order 2.
    assert!(!is_homomorphism_matrix(
        &array![[1, 0, 0], [1, 1, 0], [0, 0, 1]],
        &orders
    ));
    assert!(!is_homomorphism_matrix(&array![[1, 0], [0, 1]], &orders));
}

#[test]
fn test_matrix_spans_modulo() {
    assert!(spans_modulo(&array![[2, 1], [1, 1]], 6));
    assert!(!spans_modulo(&array![[2, 0], [0, 1]], 6));
    assert!(spans_modulo(&array![[2, 0], [0, 1], [3, 0]], 6));
    assert!(!spans_modulo(&array![[1, 1]], 5));
    assert!(spans_modulo(&array![[0]], 1));
}

#[test]
fn test_matrix_bijectivity() {
    let orders = [2, 3, 4];
    let is_bijective = |mat| is_bijective_endomorphism(&mat, &orders).unwrap();
    assert!(is_bijective(identity(3)));
    assert!(is_bijective(array![[1, 0, 2], [0, 2, 0], [1, 0, 1]]));
    // Homomorphism with a non-trivial kernel: f3 is sent to the identity.
    assert!(!is_bijective(array![[1, 0, 0], [0, 1, 0], [0, 0, 0]]));
    assert!(is_bijective(array![[1, 0, 2], [0, 1, 0], [0, 0, 1]]));
    // Both f1 and f3 are sent into the cyclic subgroup generated by f1*f3.
    assert!(!is_bijective(array![[0, 0, 2], [0, 1, 0], [1, 0, 1]]));
    // f3 is sent to f3^2, which has order 2.
    assert!(!is_bijective(array![[1, 0, 0], [0, 1, 0], [0, 0, 2]]));

    assert!(is_bijective_endomorphism(&array![[5]], &[6]).unwrap());
    assert!(!is_bijective_endomorphism(&array![[3]], &[6]).unwrap());
    assert!(!is_bijective_endomorphism(&identity(2), &[0, 2]).unwrap());
    assert!(is_bijective_endomorphism(&array![[0, 1], [1, 0]], &[3, 3]).unwrap());
    assert!(!is_bijective_endomorphism(&array![[1, 1], [1, 1]], &[3, 3]).unwrap());
}

#[test]
fn test_matrix_large_orders() {
    let n = 1u64 << 40;
    let f = array![[(1i64 << 39) + 1]];
    assert_eq!(
        vecmat_reduced(ArrayView1::from(&[1i64 << 39]), &f, &[n]).unwrap(),
        array![1i64 << 39]
    );
    assert_eq!(matmul_reduced(&f, &f, &[n]).unwrap(), array![[1]]);
    assert!(is_bijective_endomorphism(&f, &[n]).unwrap());

    let m = i64::MAX - 1;
    assert_eq!(
        matmul_reduced(&array![[m]], &array![[m]], &[i64::MAX.unsigned_abs()]).unwrap(),
        array![[1]]
    );

    // The group order 2^64 does not fit into `u64`, but the exponent does.
    let orders = [1u64 << 32, 1u64 << 32];
    assert_eq!(finite_exponent(&orders).unwrap(), 1 << 32);
    assert!(is_bijective_endomorphism(&array![[1, 1], [0, 1]], &orders).unwrap());
}

#[test]
fn test_matrix_exponent_overflow() {
    let orders = [1u64 << 62, (1u64 << 62) - 1];
    assert!(matches!(
        finite_exponent(&orders),
        Err(AutomorphismError::DomainError(_))
    ));
    assert!(matches!(
        is_bijective_endomorphism(&identity(2), &orders),
        Err(AutomorphismError::DomainError(_))
    ));
    assert!(matches!(
        finite_exponent(&[0, 2]),
        Err(AutomorphismError::UnsupportedDomain(_))
    ));

    // Entries in an infinite column are not reduced, so their products can overflow.
    assert!(matches!(
        matmul_reduced(&array![[i64::MAX]], &array![[2]], &[0]),
        Err(AutomorphismError::DomainError(_))
    ));
}

#[test]
fn test_matrix_inverse_modulo() {
    assert_eq!(
        inverse_modulo(&array![[2]], &[1_000_003]).unwrap(),
        array![[500_002]]
    );
    assert_eq!(
        inverse_modulo(&array![[5]], &[1_000_000_007]).unwrap(),
        array![[400_000_003]]
    );
    assert_eq!(
        inverse_modulo(&array![[1, 1], [0, 1]], &[1 << 32, 1 << 32]).unwrap(),
        array![[1, (1i64 << 32) - 1], [0, 1]]
    );

    let orders = [2, 3, 4];
    let mat = array![[1, 0, 2], [0, 2, 0], [1, 0, 1]];
    let inv = inverse_modulo(&mat, &orders).unwrap();
    assert_eq!(
        matmul_reduced(&mat, &inv, &orders).unwrap(),
        reduce_modulo(&identity(3), &orders)
    );
    assert_eq!(
        matmul_reduced(&inv, &mat, &orders).unwrap(),
        reduce_modulo(&identity(3), &orders)
    );

    // Generators of order dividing the exponent only need to be inverted modulo their own order.
    let orders = [2, 10];
    let mat = array![[1, 5], [0, 3]];
    let inv = inverse_modulo(&mat, &orders).unwrap();
    assert_eq!(inv, array![[1, 5], [0, 7]]);

    assert_eq!(inverse_modulo(&array![[0]], &[1]).unwrap(), array![[0]]);
    assert!(matches!(
        inverse_modulo(&array![[3]], &[6]),
        Err(AutomorphismError::NotAutomorphism(_))
    ));
    assert!(matches!(
        inverse_modulo(&array![[1, 1], [0, 1]], &[2, 4]),
        Err(AutomorphismError::NotAutomorphism(_))
    ));
    assert!(matches!(
        inverse_modulo(&identity(1), &[0]),
        Err(AutomorphismError::UnsupportedDomain(_))
    ));
}
