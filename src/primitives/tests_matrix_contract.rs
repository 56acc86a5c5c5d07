// Property-based contract tests for the matrix primitives.
//
// References:
//   - Golub & Van Loan (2013) "Matrix Computations"

use super::*;
use proptest::prelude::*;

fn deterministic_data(len: usize, seed: u32) -> Vec<f64> {
    (0..len)
        .map(|i| ((i as f64 + f64::from(seed)) * 0.37).sin() * 10.0)
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(30))]

    /// Transpose involution: (A^T)^T = A.
    #[test]
    fn prop_transpose_involution(
        rows in 1..=8usize,
        cols in 1..=8usize,
        seed in 0..500u32,
    ) {
        let a = Matrix::from_vec(rows, cols, deterministic_data(rows * cols, seed))
            .expect("valid");
        let att = a.transpose().transpose();

        prop_assert_eq!(att.shape(), a.shape());
        for i in 0..rows {
            for j in 0..cols {
                prop_assert!((att.get(i, j) - a.get(i, j)).abs() < 1e-12);
            }
        }
    }

    /// Identity is neutral for matmul: A * I = A.
    #[test]
    fn prop_identity_matmul(
        n in 1..=6usize,
        seed in 0..500u32,
    ) {
        let a = Matrix::from_vec(n, n, deterministic_data(n * n, seed)).expect("valid");
        let result = a.matmul(&Matrix::eye(n)).expect("compatible");

        for i in 0..n {
            for j in 0..n {
                prop_assert!((result.get(i, j) - a.get(i, j)).abs() < 1e-9);
            }
        }
    }

    /// Matmul transpose identity: (A * B)^T = B^T * A^T.
    #[test]
    fn prop_matmul_transpose(
        m in 1..=5usize,
        k in 1..=5usize,
        n in 1..=5usize,
        seed in 0..500u32,
    ) {
        let a = Matrix::from_vec(m, k, deterministic_data(m * k, seed)).expect("valid");
        let b = Matrix::from_vec(k, n, deterministic_data(k * n, seed + 1)).expect("valid");

        let lhs = a.matmul(&b).expect("compatible").transpose();
        let rhs = b.transpose().matmul(&a.transpose()).expect("compatible");

        prop_assert_eq!(lhs.shape(), rhs.shape());
        for i in 0..n {
            for j in 0..m {
                prop_assert!((lhs.get(i, j) - rhs.get(i, j)).abs() < 1e-9);
            }
        }
    }

    /// Hadamard product commutes: A ∘ B = B ∘ A.
    #[test]
    fn prop_hadamard_commutes(
        rows in 1..=8usize,
        cols in 1..=8usize,
        seed in 0..500u32,
    ) {
        let a = Matrix::from_vec(rows, cols, deterministic_data(rows * cols, seed))
            .expect("valid");
        let b = Matrix::from_vec(rows, cols, deterministic_data(rows * cols, seed + 7))
            .expect("valid");

        let ab = a.hadamard(&b).expect("same shape");
        let ba = b.hadamard(&a).expect("same shape");
        prop_assert_eq!(ab.as_slice(), ba.as_slice());
    }

    /// ReLU output is non-negative and its gradient mask is binary.
    #[test]
    fn prop_relu_and_gradient(
        rows in 1..=8usize,
        cols in 1..=8usize,
        seed in 0..500u32,
    ) {
        let a = Matrix::from_vec(rows, cols, deterministic_data(rows * cols, seed))
            .expect("valid");

        let r = a.relu();
        prop_assert!(r.as_slice().iter().all(|&x| x >= 0.0));

        let g = a.relu_gradient();
        prop_assert!(g.as_slice().iter().all(|&x| x == 0.0 || x == 1.0));
    }

    /// Sigmoid stays inside (0, 1) and finite for any input.
    #[test]
    fn prop_sigmoid_bounded(x in -1e12f64..1e12f64) {
        let p = sigmoid(x);
        prop_assert!(p.is_finite());
        prop_assert!((0.0..=1.0).contains(&p));
    }
}
