//! Random perturbation of an existing correlation matrix.
//!
//! If C is a correlation matrix, C + X stays one as long as the 2-norm of X
//! is below the smallest eigenvalue of C. The perturbation is built from a
//! random matrix whose spectrum lies in [1 - λmin, 1 + λmin], shifted by -I.

use ndarray::{Array1, Array2};
use ndarray_linalg::{Eigh, UPLO};
use rand::Rng;
use rand::distributions::{Distribution, Uniform};
use thiserror::Error;

use crate::spectrum::{SpectrumError, build_with_eigenvalues, symmetrize};

#[derive(Error, Debug)]
pub enum PerturbError {
    #[error(
        "Perturbation requires a positive definite input; smallest eigenvalue is {0:.6e}."
    )]
    NotPositiveDefinite(f64),

    #[error("Eigendecomposition failed: {0}")]
    Linalg(#[from] ndarray_linalg::error::LinalgError),

    #[error(transparent)]
    Spectrum(#[from] SpectrumError),
}

/// Returns a random valid perturbation of the given correlation matrix.
pub fn perturb_rand_corr<R: Rng + ?Sized>(
    corr: &Array2<f64>,
    rng: &mut R,
) -> Result<Array2<f64>, PerturbError> {
    let n = corr.nrows();
    let eigenvalues = corr.eigh(UPLO::Lower)?.0;
    let lambda_min = eigenvalues
        .iter()
        .copied()
        .fold(f64::INFINITY, f64::min);
    if lambda_min <= 0.0 {
        return Err(PerturbError::NotPositiveDefinite(lambda_min));
    }

    let dist = Uniform::new(1.0 - lambda_min, 1.0 + lambda_min);
    let perturb_eigenvalues = Array1::from_shape_fn(n, |_| dist.sample(rng));
    let a = build_with_eigenvalues(perturb_eigenvalues.view(), rng)?;

    let mut perturbed = corr + &a - &Array2::<f64>::eye(n);
    perturbed.diag_mut().fill(1.0);
    Ok(symmetrize(&perturbed))
}
