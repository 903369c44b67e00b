//! Closed-form correlation matrix generators.

use ndarray::Array2;
use rand::Rng;
use rand::distributions::{Distribution, Uniform};

/// Number of projection columns used by [`rand_corr_in`]. Many more columns
/// than rows keeps the row Gram matrix comfortably full-rank.
const PROJECTION_COLUMNS: usize = 1000;

/// Constant correlation matrix: every off-diagonal entry is `rho`.
///
/// Valid (positive definite) for `rho` in (-1/(size-1), 1).
pub fn constant_corr(size: usize, rho: f64) -> Array2<f64> {
    let mut out = Array2::from_elem((size, size), rho);
    out.diag_mut().fill(1.0);
    out
}

/// Random-projection correlation matrix from uniform draws in [-1, 1].
pub fn rand_corr<R: Rng + ?Sized>(size: usize, rng: &mut R) -> Array2<f64> {
    rand_corr_in(size, -1.0, 1.0, rng)
}

/// Random-projection correlation matrix with draws in [`lower`, `upper`).
///
/// Draws a size x 1000 matrix T, normalizes each row onto the unit sphere,
/// and returns TTᵀ with the diagonal forced to exactly 1. Requires
/// `lower < upper`.
pub fn rand_corr_in<R: Rng + ?Sized>(
    size: usize,
    lower: f64,
    upper: f64,
    rng: &mut R,
) -> Array2<f64> {
    let dist = Uniform::new(lower, upper);
    let mut t = Array2::from_shape_fn((size, PROJECTION_COLUMNS), |_| dist.sample(rng));
    for mut row in t.rows_mut() {
        let norm = row.iter().map(|&v| v * v).sum::<f64>().sqrt();
        row.mapv_inplace(|v| v / norm);
    }
    let mut c = t.dot(&t.t());
    c.diag_mut().fill(1.0);
    c
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::is_valid_correlation;
    use ndarray::Array2;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn constant_corr_is_valid() {
        let a = constant_corr(5, 0.99);
        assert!(is_valid_correlation(&a).unwrap().is_valid());
        assert_eq!(a[[0, 1]], 0.99);
        assert_eq!(a[[3, 3]], 1.0);
    }

    #[test]
    fn random_projection_corr_is_valid() {
        let mut rng = StdRng::seed_from_u64(42);
        let a = rand_corr(10, &mut rng);
        assert!(is_valid_correlation(&a).unwrap().is_valid());
    }

    #[test]
    fn draw_limits_bound_the_entries() {
        let mut rng = StdRng::seed_from_u64(42);
        let a = rand_corr_in(5, -0.25, 0.5, &mut rng);
        let min = a.iter().copied().fold(f64::INFINITY, f64::min);
        assert!(min >= -0.25);
        let max_off = (&a - &Array2::<f64>::eye(5))
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max);
        assert!(max_off <= 0.5);
    }
}
