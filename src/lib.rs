//! # Random correlation matrix simulation and repair
//!
//! Generators and repair algorithms for correlation matrices: symmetric,
//! unit-diagonal, positive-semidefinite matrices with off-diagonal entries
//! in [-1, 1].
//!
//! The crate covers three families of routines:
//!
//! 1. **Spectrum-constrained generation** — [`random_orthogonal`] (Stewart's
//!    algorithm), [`build_with_eigenvalues`] (random symmetric matrix with a
//!    prescribed eigenvalue multiset via an orthogonal similarity transform),
//!    and [`rand_corr_with_eigenvalues`] / [`repair_to_correlation`], which
//!    drive every diagonal entry to 1 through Givens rotations while leaving
//!    the spectrum untouched. See Davies & Higham, "Numerically stable
//!    generation of correlation matrices and their factors" (2000).
//! 2. **Nearest-correlation projection** — [`nearest_correlation`], Higham's
//!    alternating-projections algorithm with a Dykstra correction and
//!    optional per-row weights (Higham, IMA J. Numer. Anal. 22, 2002).
//! 3. **Closed-form generators and utilities** — [`constant_corr`],
//!    [`rand_corr`], [`perturb_rand_corr`], and the validity oracle
//!    [`is_valid_correlation`].
//!
//! All routines are pure functions of their inputs plus an injected random
//! source (`rand::Rng`); nothing here holds state across calls, so they may
//! be invoked concurrently from independent threads.

pub mod diagnostics;
pub mod generate;
pub mod nearest;
pub mod orthogonal;
pub mod perturb;
pub mod spectrum;

pub use diagnostics::{CorrDiagnostics, DiagnosticsError, ValidityCause, is_valid_correlation};
pub use generate::{constant_corr, rand_corr, rand_corr_in};
pub use nearest::{
    NearestError, nearest_correlation, nearest_correlation_with, proj_psd, proj_unit_diag,
};
pub use orthogonal::{random_orthogonal, random_orthogonal_with, sign, sign_elementwise};
pub use perturb::{PerturbError, perturb_rand_corr};
pub use spectrum::{
    SpectrumError, apply_givens, build_with_eigenvalues, rand_corr_with_eigenvalues,
    rand_corr_with_eigenvalues_with, repair_to_correlation, repair_to_correlation_with,
};
