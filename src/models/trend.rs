//! Piecewise-linear trend with changepoints.
//!
//! ```text
//! g(t) = m + k t + Σ_j δ_j (t - s_j)_+
//! ```
//!
//! `m` is the offset, `k` the base growth rate, and `δ_j` the change in slope
//! at changepoint `s_j`. `t` is on the scaled time axis (observed history maps
//! to `[0, 1]`). The form is linear in `(m, k, δ)` for fixed changepoints, so
//! the fitter can treat it as a regression.

/// Fitted trend parameters on the scaled axes.
#[derive(Debug, Clone, PartialEq)]
pub struct TrendParams {
    pub offset: f64,
    pub growth: f64,
    pub changepoints: Vec<f64>,
    pub deltas: Vec<f64>,
}

impl TrendParams {
    /// Number of regression coefficients for `n_changepoints`.
    pub fn coef_len(n_changepoints: usize) -> usize {
        2 + n_changepoints
    }

    pub fn predict(&self, t: f64) -> f64 {
        predict(t, self.offset, self.growth, &self.changepoints, &self.deltas)
    }

    /// Mean absolute slope change, the scale used when simulating future changes.
    pub fn mean_abs_delta(&self) -> f64 {
        if self.deltas.is_empty() {
            return 0.0;
        }
        self.deltas.iter().map(|d| d.abs()).sum::<f64>() / self.deltas.len() as f64
    }
}

/// Fill a design row `[1, t, (t - s_1)_+, ..., (t - s_S)_+]`.
///
/// # Panics
/// Panics if `out.len() != 2 + changepoints.len()`.
pub fn fill_design_row(t: f64, changepoints: &[f64], out: &mut [f64]) {
    assert_eq!(out.len(), TrendParams::coef_len(changepoints.len()));
    out[0] = 1.0;
    out[1] = t;
    for (j, &s) in changepoints.iter().enumerate() {
        out[2 + j] = (t - s).max(0.0);
    }
}

/// Evaluate the trend at `t`.
pub fn predict(t: f64, offset: f64, growth: f64, changepoints: &[f64], deltas: &[f64]) -> f64 {
    let mut y = offset + growth * t;
    for (&s, &d) in changepoints.iter().zip(deltas) {
        if t >= s {
            y += d * (t - s);
        }
    }
    y
}
