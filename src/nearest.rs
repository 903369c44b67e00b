//! Nearest correlation matrix by alternating projections.
//!
//! Higham's algorithm (IMA J. Numer. Anal. 22, 2002): alternate projection
//! onto the positive-semidefinite cone and onto the unit-diagonal affine
//! set, with an accumulated Dykstra correction so the iteration converges to
//! the *nearest* point of the intersection in the (optionally weighted)
//! Frobenius norm, not merely a feasible point.

use ndarray::{Array1, Array2};
use ndarray_linalg::{Eigh, UPLO};
use thiserror::Error;

/// Default outer-iteration cap.
pub const DEFAULT_MAX_ITERATIONS: usize = 100;

/// Errors from the nearest-correlation projector.
///
/// Non-convergence is deliberately *not* represented here: hitting the
/// iteration cap returns the current iterate.
#[derive(Error, Debug)]
pub enum NearestError {
    #[error("Weight vector length ({got}) does not match the matrix dimension ({expected}).")]
    WeightLengthMismatch { got: usize, expected: usize },

    #[error("Weights must be strictly positive, but entry {index} is {value}.")]
    NonPositiveWeight { index: usize, value: f64 },

    #[error("Eigendecomposition failed during the PSD projection: {0}")]
    Linalg(#[from] ndarray_linalg::error::LinalgError),
}

/// Projects a symmetric matrix onto the positive-semidefinite cone by
/// clipping negative eigenvalues to zero and reconstructing V·max(Λ,0)·Vᵀ.
///
/// A matrix with no negative eigenvalues is returned unchanged up to the
/// rounding of the eigendecomposition.
pub fn proj_psd(a: &Array2<f64>) -> Result<Array2<f64>, NearestError> {
    let (values, vectors) = a.eigh(UPLO::Lower)?;
    let mut scaled = vectors.clone();
    for (mut col, &lam) in scaled.columns_mut().into_iter().zip(values.iter()) {
        let clipped = lam.max(0.0);
        col.mapv_inplace(|v| v * clipped);
    }
    let rebuilt = scaled.dot(&vectors.t());
    Ok((&rebuilt + &rebuilt.t()) / 2.0)
}

/// Projects onto the unit-diagonal affine set: the diagonal is forced to 1,
/// off-diagonal entries are untouched.
pub fn proj_unit_diag(a: &Array2<f64>) -> Array2<f64> {
    let mut out = a.clone();
    out.diag_mut().fill(1.0);
    out
}

fn frobenius(a: &Array2<f64>) -> f64 {
    a.iter().map(|&x| x * x).sum::<f64>().sqrt()
}

/// Finds the nearest correlation matrix to the symmetric matrix `a` in the
/// Frobenius norm, with the default iteration cap and unit weights.
pub fn nearest_correlation(a: &Array2<f64>) -> Result<Array2<f64>, NearestError> {
    nearest_correlation_with(a, DEFAULT_MAX_ITERATIONS, None)
}

/// [`nearest_correlation`] with an explicit iteration cap and optional
/// per-row weights.
///
/// Weights scale the norm as ‖√(w wᵀ) ∘ (A - X)‖_F. `None` means unit
/// weights; a supplied vector must have length n and strictly positive
/// entries. Convergence is declared when the relative change in the PSD
/// iterate, the relative change in the unit-diagonal iterate, and their
/// relative distance all fall to ε·n. Exceeding `max_iterations` returns
/// the current iterate rather than failing: alternating projections are
/// guaranteed to converge only in the limit, and callers prefer a usable
/// approximation over a hard error.
pub fn nearest_correlation_with(
    a: &Array2<f64>,
    max_iterations: usize,
    weights: Option<&Array1<f64>>,
) -> Result<Array2<f64>, NearestError> {
    let n = a.nrows();
    let weights = match weights {
        Some(w) => {
            if w.len() != n {
                return Err(NearestError::WeightLengthMismatch {
                    got: w.len(),
                    expected: n,
                });
            }
            if let Some((index, &value)) = w.iter().enumerate().find(|&(_, &v)| v <= 0.0) {
                return Err(NearestError::NonPositiveWeight { index, value });
            }
            w.to_owned()
        }
        None => Array1::ones(n),
    };
    let tol = f64::EPSILON * n as f64;
    let whalf = Array2::from_shape_fn((n, n), |(i, j)| (weights[i] * weights[j]).sqrt());

    let mut x = a.clone();
    let mut y = a.clone();
    let mut ds = Array2::<f64>::zeros((n, n));
    let mut rel_x = f64::INFINITY;
    let mut rel_y = f64::INFINITY;
    let mut rel_xy = f64::INFINITY;

    let mut iteration = 0usize;
    while rel_x.max(rel_y).max(rel_xy) > tol {
        iteration += 1;
        if iteration > max_iterations {
            log::warn!(
                "nearest_correlation hit the iteration cap ({max_iterations}); returning the current iterate"
            );
            return Ok(x);
        }

        let x_old = x.clone();
        // Dykstra correction: subtract the previous projection residual
        // before projecting onto the PSD cone.
        let r = &x - &ds;
        let projected = proj_psd(&(&whalf * &r))?;
        x = &projected / &whalf;
        ds = &x - &r;

        let y_old = y;
        y = proj_unit_diag(&x);
        // The unit-diagonal iterate feeds the next Dykstra step.
        x = y.clone();

        let norm_y = frobenius(&y);
        rel_x = frobenius(&(&x - &x_old)) / frobenius(&x);
        rel_y = frobenius(&(&y - &y_old)) / norm_y;
        rel_xy = frobenius(&(&y - &x)) / norm_y;
        log::debug!(
            "nearest_correlation iteration {iteration}: rel_x = {rel_x:.3e}, rel_y = {rel_y:.3e}, rel_xy = {rel_xy:.3e}"
        );
    }

    Ok(x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate::constant_corr;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn golden_three_by_three() {
        let a = array![[1.0, 1.0, 0.0], [1.0, 1.0, 1.0], [0.0, 1.0, 1.0]];
        let x = nearest_correlation(&a).unwrap();
        let expected = array![
            [1.0, 0.7607, 0.1573],
            [0.7607, 1.0, 0.7607],
            [0.1573, 0.7607, 1.0]
        ];
        assert_abs_diff_eq!(x, expected, epsilon = 2e-5);
    }

    #[test]
    fn idempotent_on_a_valid_correlation_matrix() {
        let a = constant_corr(4, 0.3);
        let x = nearest_correlation(&a).unwrap();
        assert_abs_diff_eq!(x, a, epsilon = 1e-8);
    }

    #[test]
    fn psd_projection_clips_negative_eigenvalues() {
        // eigenvalues 3 and -1
        let a = array![[1.0, 2.0], [2.0, 1.0]];
        let p = proj_psd(&a).unwrap();
        let values = p.eigh(UPLO::Lower).unwrap().0;
        assert!(values.iter().all(|&v| v > -1e-12));
        // already-PSD input is unchanged
        let b = array![[2.0, 0.5], [0.5, 2.0]];
        assert_abs_diff_eq!(proj_psd(&b).unwrap(), b, epsilon = 1e-12);
    }

    #[test]
    fn unit_diag_projection_only_touches_the_diagonal() {
        let a = array![[0.5, 0.2], [0.2, 3.0]];
        let p = proj_unit_diag(&a);
        assert_eq!(p, array![[1.0, 0.2], [0.2, 1.0]]);
    }

    #[test]
    fn unit_weights_match_the_unweighted_result() {
        let a = array![[1.0, 1.0, 0.0], [1.0, 1.0, 1.0], [0.0, 1.0, 1.0]];
        let ones = Array1::ones(3);
        let weighted = nearest_correlation_with(&a, DEFAULT_MAX_ITERATIONS, Some(&ones)).unwrap();
        let unweighted = nearest_correlation(&a).unwrap();
        assert_abs_diff_eq!(weighted, unweighted, epsilon = 1e-14);
    }

    #[test]
    fn rejects_bad_weights() {
        let a = array![[1.0, 0.5], [0.5, 1.0]];
        let short = array![1.0];
        assert!(matches!(
            nearest_correlation_with(&a, 100, Some(&short)),
            Err(NearestError::WeightLengthMismatch {
                got: 1,
                expected: 2
            })
        ));
        let zeroed = array![1.0, 0.0];
        assert!(matches!(
            nearest_correlation_with(&a, 100, Some(&zeroed)),
            Err(NearestError::NonPositiveWeight { index: 1, .. })
        ));
    }

    #[test]
    fn iteration_cap_returns_the_current_iterate() {
        let a = array![[1.0, 1.0, 0.0], [1.0, 1.0, 1.0], [0.0, 1.0, 1.0]];
        // zero budget: the first pass through the loop returns immediately
        let x = nearest_correlation_with(&a, 0, None).unwrap();
        assert_eq!(x, a);
    }
}
