//! Least-squares solvers.
//!
//! The trend fit repeatedly solves small penalized regression problems of the form:
//!
//! ```text
//! minimize Σ (y_i - x_i^T β)^2 + Σ λ_j β_j^2
//! ```
//!
//! The penalty is folded in by appending one synthetic row per penalized
//! coefficient (`sqrt(λ_j)` in column `j`, target 0) and solving the augmented
//! ordinary least-squares problem with SVD. The design is tall and has at most
//! a few dozen columns, so SVD cost is negligible.

use nalgebra::{DMatrix, DVector};

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = x.clone().svd(true, true);

    // Progressively looser singular-value cutoffs.
    for &tol in &[1e-12, 1e-10, 1e-8] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}

/// Solve a ridge-style penalized least squares problem.
///
/// `penalties[j]` is the weight `λ_j >= 0` on `β_j^2`; zero leaves the
/// coefficient unpenalized. `penalties.len()` must equal `x.ncols()`.
pub fn solve_penalized(x: &DMatrix<f64>, y: &DVector<f64>, penalties: &[f64]) -> Option<DVector<f64>> {
    let n = x.nrows();
    let p = x.ncols();
    if penalties.len() != p || y.len() != n {
        return None;
    }

    let extra: Vec<usize> = (0..p).filter(|&j| penalties[j] > 0.0).collect();
    let mut xa = DMatrix::<f64>::zeros(n + extra.len(), p);
    let mut ya = DVector::<f64>::zeros(n + extra.len());

    xa.rows_mut(0, n).copy_from(x);
    ya.rows_mut(0, n).copy_from(y);

    for (r, &j) in extra.iter().enumerate() {
        let lambda = penalties[j];
        if !lambda.is_finite() {
            return None;
        }
        xa[(n + r, j)] = lambda.sqrt();
    }

    solve_least_squares(&xa, &ya)
}
