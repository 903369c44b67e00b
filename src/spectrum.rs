//! # Correlation matrices with a prescribed eigenvalue spectrum
//!
//! Builds a random symmetric matrix with an exact eigenvalue multiset
//! (orthogonal similarity transform of the diagonal spectrum) and repairs it
//! into a correlation matrix with Givens rotations that force every diagonal
//! entry to 1. Rotations are orthogonal similarity transforms, so the
//! spectrum is invariant throughout the repair.
//!
//! Method from Davies & Higham, "Numerically stable generation of correlation
//! matrices and their factors" (BIT, 2000).

use ndarray::{Array2, ArrayView1};
use rand::Rng;
use thiserror::Error;

use crate::orthogonal::random_orthogonal;

/// Attempt budget for constructing a candidate whose floating-point trace
/// lands exactly on n.
pub const MAX_CONSTRUCTION_ATTEMPTS: usize = 20;

/// Absolute tolerance on |trace - n| inside the repair loop.
const TRACE_TOL: f64 = 1e-6;

/// Per-entry convergence tolerance on |diagonal - 1|.
const DIAG_TOL: f64 = 1e-6;

/// Errors from spectrum-constrained construction and Givens repair.
#[derive(Error, Debug)]
pub enum SpectrumError {
    #[error("An eigenvalue spectrum must contain at least one value.")]
    EmptySpectrum,

    #[error(
        "Could not construct a candidate matrix with trace(C) == n within {attempts} attempts."
    )]
    ConstructionFailed { attempts: usize },

    #[error(
        "Trace drifted away from n during Givens repair: trace = {trace:.9}, iteration = {iteration}."
    )]
    TraceDrift { trace: f64, iteration: usize },

    #[error("Givens repair did not converge within {iterations} iterations.")]
    DidNotConverge { iterations: usize },
}

pub(crate) fn symmetrize(a: &Array2<f64>) -> Array2<f64> {
    (a + &a.t()) / 2.0
}

/// Builds a random symmetric matrix whose eigenvalues are exactly the given
/// multiset, as QᵀΛQ for a random orthogonal Q.
///
/// The eigenvalues need not be sorted or normalized; the caller owns any
/// normalization. Errors on an empty spectrum.
pub fn build_with_eigenvalues<R: Rng + ?Sized>(
    eigenvalues: ArrayView1<f64>,
    rng: &mut R,
) -> Result<Array2<f64>, SpectrumError> {
    if eigenvalues.is_empty() {
        return Err(SpectrumError::EmptySpectrum);
    }
    let q = random_orthogonal(eigenvalues.len(), rng);
    let lambda = Array2::from_diag(&eigenvalues);
    let a = q.t().dot(&lambda).dot(&q);
    Ok(symmetrize(&a))
}

/// Applies one Givens plane rotation GᵀAG at indices (i, j), with the angle
/// chosen in closed form so the rotated (i, i) entry equals 1.
///
/// Preconditions (guaranteed when called from the repair loop, which picks
/// one index below 1 and one above): `a[j, j] != 1` and the discriminant
/// `Aij² - (Aii - 1)(Ajj - 1)` is non-negative.
///
/// Only rows and columns i and j change; every other entry is returned
/// bit-identical.
pub fn apply_givens(a: &Array2<f64>, i: usize, j: usize) -> Array2<f64> {
    let aii = a[[i, i]];
    let aij = a[[i, j]];
    let ajj = a[[j, j]];
    let t = (aij + (aij * aij - (aii - 1.0) * (ajj - 1.0)).sqrt()) / (ajj - 1.0);
    let c = 1.0 / (1.0 + t * t).sqrt();
    let s = c * t;

    let mut out = a.clone();
    // Gᵀ on the left touches rows i and j only.
    let row_i = a.row(i).to_owned();
    let row_j = a.row(j).to_owned();
    out.row_mut(i).assign(&(&row_i * c - &row_j * s));
    out.row_mut(j).assign(&(&row_i * s + &row_j * c));
    // G on the right touches columns i and j only.
    let col_i = out.column(i).to_owned();
    let col_j = out.column(j).to_owned();
    out.column_mut(i).assign(&(&col_i * c - &col_j * s));
    out.column_mut(j).assign(&(&col_i * s + &col_j * c));
    out
}

/// Repairs a symmetric matrix with trace n into a correlation matrix with
/// the same eigenvalues, using at most n + 1 Givens rotations.
pub fn repair_to_correlation(matrix: &Array2<f64>) -> Result<Array2<f64>, SpectrumError> {
    repair_to_correlation_with(matrix, matrix.nrows() + 1)
}

/// [`repair_to_correlation`] with an explicit rotation budget.
///
/// The input is symmetrized first. Each pass checks that the trace still
/// equals n within 1e-6 (violation means the input was not properly
/// spectrum-normalized and is fatal), then either declares convergence
/// (every |diagonal - 1| < 1e-6) or applies one rotation. The pivot pair is
/// a fixed policy: i = first index with diagonal < 1, j = last with
/// diagonal > 1, swapped to i = first above / j = last below when i > j.
/// After each rotation the touched diagonal entries are forced to exact
/// values so the trace invariant holds at machine precision.
///
/// The result is rounded to 4 decimal places with the diagonal forced to
/// exactly 1. Exhausting the rotation budget without convergence is an
/// error, never silently accepted.
pub fn repair_to_correlation_with(
    matrix: &Array2<f64>,
    max_iterations: usize,
) -> Result<Array2<f64>, SpectrumError> {
    let n = matrix.nrows();
    let mut corr = symmetrize(matrix);

    let mut iteration = 0usize;
    loop {
        let d = corr.diag().to_owned();
        let trace = d.sum();
        if (trace - n as f64).abs() > TRACE_TOL {
            return Err(SpectrumError::TraceDrift { trace, iteration });
        }
        if d.iter().all(|&v| (v - 1.0).abs() < DIAG_TOL) {
            break;
        }
        if iteration >= max_iterations {
            return Err(SpectrumError::DidNotConverge {
                iterations: max_iterations,
            });
        }

        let below: Vec<usize> = (0..n).filter(|&k| d[k] < 1.0).collect();
        let above: Vec<usize> = (0..n).filter(|&k| d[k] > 1.0).collect();
        let (first_below, last_below, first_above, last_above) =
            match (below.first(), below.last(), above.first(), above.last()) {
                (Some(&fb), Some(&lb), Some(&fa), Some(&la)) => (fb, lb, fa, la),
                // Diagonal deviation all on one side; the trace check above
                // bounds it, but the rotation has no valid pivot pair.
                _ => return Err(SpectrumError::TraceDrift { trace, iteration }),
            };
        let (i, j) = if first_below > last_above {
            (first_above, last_below)
        } else {
            (first_below, last_above)
        };
        log::debug!(
            "givens repair iteration {iteration}: rotating ({i}, {j}), d[i] = {:.6}, d[j] = {:.6}",
            d[i],
            d[j]
        );

        let pair_trace = corr[[i, i]] + corr[[j, j]];
        corr = apply_givens(&corr, i, j);
        // Compensate floating-point drift: the rotation drives (i, i) to 1
        // analytically, and (j, j) absorbs the rest of the pair trace.
        corr[[i, i]] = 1.0;
        corr[[j, j]] = pair_trace - 1.0;
        iteration += 1;
    }

    let mut out = corr.mapv(|v| (v * 1e4).round() / 1e4);
    out.diag_mut().fill(1.0);
    Ok(out)
}

/// Generates a random correlation matrix whose eigenvalues are the given
/// spectrum rescaled to sum to n.
pub fn rand_corr_with_eigenvalues<R: Rng + ?Sized>(
    eigenvalues: ArrayView1<f64>,
    rng: &mut R,
) -> Result<Array2<f64>, SpectrumError> {
    rand_corr_with_eigenvalues_with(eigenvalues, MAX_CONSTRUCTION_ATTEMPTS, rng)
}

/// [`rand_corr_with_eigenvalues`] with an explicit retry budget for the
/// candidate construction step.
///
/// The candidate QᵀΛQ is accepted only when its floating-point trace lands
/// exactly on n, which the Givens repair relies on; construction is retried
/// with fresh randomness until it does or the budget is exhausted.
pub fn rand_corr_with_eigenvalues_with<R: Rng + ?Sized>(
    eigenvalues: ArrayView1<f64>,
    max_retries: usize,
    rng: &mut R,
) -> Result<Array2<f64>, SpectrumError> {
    if eigenvalues.is_empty() {
        return Err(SpectrumError::EmptySpectrum);
    }
    let n = eigenvalues.len();
    let total = eigenvalues.sum();
    let lamb = eigenvalues.mapv(|v| n as f64 * v / total);

    let mut corr = build_with_eigenvalues(lamb.view(), rng)?;
    let mut attempts = 0usize;
    while corr.diag().sum() != n as f64 {
        attempts += 1;
        if attempts > max_retries {
            return Err(SpectrumError::ConstructionFailed { attempts });
        }
        corr = build_with_eigenvalues(lamb.view(), rng)?;
    }
    log::debug!("trace-exact candidate constructed after {attempts} retries");

    repair_to_correlation(&corr)
}
