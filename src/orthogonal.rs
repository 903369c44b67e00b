//! Random orthogonal matrices via Stewart's algorithm.

use ndarray::{Array1, Array2, s};
use rand::Rng;
use rand_distr::{Distribution, StandardNormal};

/// Scalar sign: +1 for positive, -1 for negative, 0 for zero.
pub fn sign(x: f64) -> f64 {
    if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// Elementwise [`sign`] of a matrix.
pub fn sign_elementwise(a: &Array2<f64>) -> Array2<f64> {
    a.mapv(sign)
}

/// Generates an n x n random orthogonal matrix from standard-normal draws,
/// uniformly distributed over the orthogonal group.
///
/// This is Stewart's algorithm: a product of Householder reflections built
/// from random vectors, applied to the identity, with a final random sign
/// per row. `n = 0` returns the empty matrix, `n = 1` a 1 x 1 `[[±1]]`.
pub fn random_orthogonal<R: Rng + ?Sized>(n: usize, rng: &mut R) -> Array2<f64> {
    random_orthogonal_with(n, StandardNormal, rng)
}

/// [`random_orthogonal`] with a caller-chosen draw distribution.
///
/// Any continuous `Distribution<f64>` works; uniform draws give a different
/// (still orthogonal) ensemble. Degenerate draws are guarded: an all-zero
/// reflection vector is redrawn, and a zero leading component takes the
/// positive sign so that the Householder scale β = s·x₀ is never zero.
/// Both events have probability zero under continuous distributions.
pub fn random_orthogonal_with<D, R>(n: usize, dist: D, rng: &mut R) -> Array2<f64>
where
    D: Distribution<f64> + Copy,
    R: Rng + ?Sized,
{
    let mut a = Array2::<f64>::eye(n);
    if n == 0 {
        return a;
    }

    let mut d = Array1::<f64>::zeros(n);
    let last_draw = sign(dist.sample(rng));
    d[n - 1] = if last_draw == 0.0 { 1.0 } else { last_draw };

    for k in (0..n.saturating_sub(1)).rev() {
        // Reflection vector of length n - k; redraw the (measure-zero)
        // all-zero vector so the norm below is positive.
        let mut x = loop {
            let x = Array1::from_shape_fn(n - k, |_| dist.sample(rng));
            if x.dot(&x) > 0.0 {
                break x;
            }
        };
        let sg = if x[0] < 0.0 { -1.0 } else { 1.0 };
        let s_norm = sg * x.dot(&x).sqrt();
        d[k] = -sg;
        x[0] += s_norm;
        let beta = s_norm * x[0];

        // Rank-1 Householder update of the trailing rows:
        // A[k.., ..] -= x · (xᵀ A[k.., ..]) / β
        let y = x.dot(&a.slice(s![k.., ..]));
        let scaled = &y / beta;
        let mut tail = a.slice_mut(s![k.., ..]);
        for (r, &xr) in x.iter().enumerate() {
            tail.row_mut(r).scaled_add(-xr, &scaled);
        }
    }

    for (i, mut row) in a.rows_mut().into_iter().enumerate() {
        let di = d[i];
        row.mapv_inplace(|v| v * di);
    }
    a
}
