//! Validity diagnostics for correlation matrices.

use ndarray::Array2;
use ndarray_linalg::{Eigh, UPLO};
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DiagnosticsError {
    #[error("Eigendecomposition failed while checking positive definiteness: {0}")]
    Linalg(#[from] ndarray_linalg::error::LinalgError),
}

/// A reason a matrix fails to be a valid correlation matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidityCause {
    NotSymmetric,
    NotPositiveDefinite,
    OffDiagonalOutOfRange,
    DiagonalNotUnit,
}

impl fmt::Display for ValidityCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::NotSymmetric => "not symmetric",
            Self::NotPositiveDefinite => "not positive definite",
            Self::OffDiagonalOutOfRange => "off-diagonal out of range",
            Self::DiagonalNotUnit => "diagonal != 1",
        };
        f.write_str(text)
    }
}

/// Result of the four validity predicates.
///
/// Symmetry and unit-diagonal checks are exact comparisons: the crate's own
/// generators set those entries exactly, so any deviation is a real defect.
#[derive(Debug, Clone)]
pub struct CorrDiagnostics {
    pub symmetric: bool,
    pub positive_definite: bool,
    pub off_diagonal_in_range: bool,
    pub unit_diagonal: bool,
}

impl CorrDiagnostics {
    pub fn is_valid(&self) -> bool {
        self.symmetric && self.positive_definite && self.off_diagonal_in_range && self.unit_diagonal
    }

    /// Failure causes in a fixed order: symmetry, positive definiteness,
    /// off-diagonal range, diagonal.
    pub fn causes(&self) -> Vec<ValidityCause> {
        let mut causes = Vec::new();
        if !self.symmetric {
            causes.push(ValidityCause::NotSymmetric);
        }
        if !self.positive_definite {
            causes.push(ValidityCause::NotPositiveDefinite);
        }
        if !self.off_diagonal_in_range {
            causes.push(ValidityCause::OffDiagonalOutOfRange);
        }
        if !self.unit_diagonal {
            causes.push(ValidityCause::DiagonalNotUnit);
        }
        causes
    }
}

/// Checks whether every eigenvalue of the (symmetric) matrix is positive.
pub fn is_pd(matrix: &Array2<f64>) -> Result<bool, DiagnosticsError> {
    let eigenvalues = matrix.eigh(UPLO::Lower)?.0;
    Ok(eigenvalues.iter().all(|&v| v > 0.0))
}

/// Runs the four validity predicates against a candidate correlation matrix.
pub fn is_valid_correlation(matrix: &Array2<f64>) -> Result<CorrDiagnostics, DiagnosticsError> {
    let symmetric = matrix
        .indexed_iter()
        .all(|((i, j), &v)| v == matrix[[j, i]]);
    let positive_definite = is_pd(matrix)?;
    let off_diagonal_in_range = matrix.iter().all(|&v| v.abs() <= 1.0);
    let unit_diagonal = matrix.diag().iter().all(|&v| v == 1.0);
    Ok(CorrDiagnostics {
        symmetric,
        positive_definite,
        off_diagonal_in_range,
        unit_diagonal,
    })
}
