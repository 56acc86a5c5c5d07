//! Core compute primitives (Vector, Matrix, activations, initialization).
//!
//! These types provide the dense linear-algebra foundation the GCN engine
//! composes from. Everything is `f64`: the engine's stability bounds (the
//! sigmoid clamp in particular) and the bit-identical determinism guarantee
//! assume double precision.

mod matrix;
mod vector;

#[cfg(test)]
#[path = "tests_matrix_contract.rs"]
mod matrix_contract;

pub use matrix::Matrix;
pub use vector::Vector;

use rand::rngs::StdRng;
use rand::Rng;

/// Numerically stable logistic sigmoid.
///
/// The input is clamped to [-500, 500] before exponentiation so that
/// `exp` can neither overflow nor underflow to a NaN-producing extreme.
///
/// # Examples
///
/// ```
/// use enlazar::primitives::sigmoid;
///
/// assert!((sigmoid(0.0) - 0.5).abs() < 1e-12);
/// assert!(sigmoid(1000.0) <= 1.0);
/// assert!(sigmoid(-1000.0) >= 0.0);
/// ```
#[must_use]
pub fn sigmoid(x: f64) -> f64 {
    let x = x.clamp(-500.0, 500.0);
    1.0 / (1.0 + (-x).exp())
}

/// Xavier/Glorot normal initialization (Glorot & Bengio, 2010).
///
/// Samples a `rows`×`cols` matrix from N(0, std) with
/// std = sqrt(2 / (fan_in + fan_out)), fan_in = rows, fan_out = cols.
/// Uses the Box-Muller transform over the supplied generator, so results
/// are reproducible given a seeded `StdRng`.
#[must_use]
pub fn xavier_normal(rows: usize, cols: usize, rng: &mut StdRng) -> Matrix {
    let std = (2.0 / (rows + cols) as f64).sqrt();

    let data: Vec<f64> = (0..rows * cols)
        .map(|_| {
            let u1: f64 = rng.gen_range(0.0001_f64..1.0_f64);
            let u2: f64 = rng.gen_range(0.0_f64..1.0_f64);
            let z = (-2.0_f64 * u1.ln()).sqrt() * (2.0_f64 * std::f64::consts::PI * u2).cos();
            std * z
        })
        .collect();

    Matrix::from_raw(rows, cols, data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_sigmoid_midpoint() {
        assert!((sigmoid(0.0) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_sigmoid_monotone() {
        assert!(sigmoid(-2.0) < sigmoid(0.0));
        assert!(sigmoid(0.0) < sigmoid(2.0));
    }

    #[test]
    fn test_sigmoid_extreme_inputs_finite() {
        for x in [f64::MAX, f64::MIN, 1e9, -1e9, 750.0, -750.0] {
            let p = sigmoid(x);
            assert!(p.is_finite(), "sigmoid({x}) = {p} not finite");
            assert!((0.0..=1.0).contains(&p));
        }
    }

    #[test]
    fn test_xavier_normal_reproducible() {
        let mut rng1 = StdRng::seed_from_u64(42);
        let mut rng2 = StdRng::seed_from_u64(42);

        let a = xavier_normal(8, 32, &mut rng1);
        let b = xavier_normal(8, 32, &mut rng2);

        assert_eq!(a.as_slice(), b.as_slice());
    }

    #[test]
    fn test_xavier_normal_std() {
        let mut rng = StdRng::seed_from_u64(7);
        let m = xavier_normal(100, 100, &mut rng);
        let expected_std = (2.0 / 200.0_f64).sqrt();

        let n = m.as_slice().len() as f64;
        let mean: f64 = m.as_slice().iter().sum::<f64>() / n;
        let var: f64 = m.as_slice().iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;

        assert!(mean.abs() < 0.01, "Mean {mean} too far from 0");
        assert!(
            (var.sqrt() - expected_std).abs() < 0.01,
            "Std {} too far from {expected_std}",
            var.sqrt()
        );
    }

    #[test]
    fn test_xavier_normal_different_seeds_differ() {
        let mut rng1 = StdRng::seed_from_u64(1);
        let mut rng2 = StdRng::seed_from_u64(2);

        let a = xavier_normal(10, 10, &mut rng1);
        let b = xavier_normal(10, 10, &mut rng2);

        assert_ne!(a.as_slice(), b.as_slice());
    }
}
