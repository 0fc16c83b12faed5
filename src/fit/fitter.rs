//! MAP fit of the changepoint trend.
//!
//! Given scaled times `t_i`, scaled scores `y_i` and changepoints `s_j`, the
//! fitter maximizes the posterior of
//!
//! ```text
//! y_i ~ N(g(t_i), σ²)
//! m, k ~ N(0, trend_prior_scale²)
//! δ_j ~ Laplace(0, changepoint_prior_scale)
//! σ   ~ HalfNormal(noise_prior_scale)
//! ```
//!
//! by alternating two steps until the coefficients stop moving:
//!
//! - coefficients: the Laplace term `|δ|/τ` is replaced by its local quadratic
//!   bound `δ²/(2τ|δ_prev|)`, turning the problem into penalized least squares
//!   (iteratively reweighted, one SVD solve per pass)
//! - noise: `σ²` has a closed form given the residual sum of squares
//!
//! Everything is deterministic; there is no RNG in the fit.

use nalgebra::{DMatrix, DVector};

use crate::domain::ModelConfig;
use crate::error::ForecastError;
use crate::math::solve_penalized;
use crate::models::{TrendParams, fill_design_row};

/// Floor on `|δ_prev|` in the reweighting step.
const DELTA_EPS: f64 = 1e-6;

/// Floor on the noise variance.
const SIGMA2_FLOOR: f64 = 1e-10;

/// Starting noise variance on the scaled axis.
const SIGMA2_INIT: f64 = 1e-2;

/// A fitted trend on the scaled axes.
#[derive(Debug, Clone)]
pub struct TrendFit {
    pub params: TrendParams,
    /// Observation noise std-dev (scaled units).
    pub sigma: f64,
    /// Root mean squared residual (scaled units).
    pub rmse: f64,
    pub iterations: usize,
    pub converged: bool,
}

/// Fit the trend to observed points.
///
/// `t` and `y` must have equal length and contain only finite values.
pub fn fit_trend(t: &[f64], y: &[f64], changepoints: &[f64], model: &ModelConfig) -> Result<TrendFit, ForecastError> {
    let n = t.len();
    if n != y.len() {
        return Err(ForecastError::InvalidInput(format!(
            "time/value length mismatch ({n} vs {})",
            y.len()
        )));
    }
    if n < 2 {
        return Err(ForecastError::InsufficientData {
            observed: n,
            required: 2,
        });
    }
    if t.iter().chain(y).any(|v| !v.is_finite()) {
        return Err(ForecastError::NonFinite { stage: "fit input" });
    }
    if !(model.changepoint_prior_scale.is_finite() && model.changepoint_prior_scale > 0.0) {
        return Err(ForecastError::InvalidInput(
            "changepoint prior scale must be > 0".to_string(),
        ));
    }
    if !(model.trend_prior_scale > 0.0 && model.noise_prior_scale > 0.0) {
        return Err(ForecastError::InvalidInput(
            "prior scales must be > 0".to_string(),
        ));
    }

    let s = changepoints.len();
    let p = TrendParams::coef_len(s);

    let mut x = DMatrix::<f64>::zeros(n, p);
    let mut row = vec![0.0; p];
    for i in 0..n {
        fill_design_row(t[i], changepoints, &mut row);
        for j in 0..p {
            x[(i, j)] = row[j];
        }
    }
    let yv = DVector::from_column_slice(y);

    let tau = model.changepoint_prior_scale;
    let trend_var = model.trend_prior_scale * model.trend_prior_scale;

    let mut sigma2 = SIGMA2_INIT;
    let mut delta_scale = vec![tau; s];
    let mut beta = DVector::<f64>::zeros(p);
    let mut penalties = vec![0.0; p];
    let mut iterations = 0;
    let mut converged = false;

    for iter in 0..model.max_iters.max(1) {
        iterations = iter + 1;

        // Objective scaled by 2σ²:
        //   Σ r² + σ²/trend_var (m² + k²) + Σ σ²/(τ c_j) δ_j²
        penalties[0] = sigma2 / trend_var;
        penalties[1] = sigma2 / trend_var;
        for j in 0..s {
            penalties[2 + j] = sigma2 / (tau * delta_scale[j]);
        }

        let next = solve_penalized(&x, &yv, &penalties).ok_or(ForecastError::Singular)?;
        if next.iter().any(|v| !v.is_finite()) {
            return Err(ForecastError::NonFinite { stage: "trend fit" });
        }

        let ssr = (&yv - &x * &next).norm_squared();
        let next_sigma2 = noise_variance(ssr, n, model.noise_prior_scale);

        let step = (&next - &beta).amax();
        let sigma_step = (next_sigma2.sqrt() - sigma2.sqrt()).abs();

        beta = next;
        sigma2 = next_sigma2;
        for j in 0..s {
            delta_scale[j] = beta[2 + j].abs().max(DELTA_EPS);
        }

        if iter > 0 && step < model.tolerance && sigma_step < model.tolerance {
            converged = true;
            break;
        }
    }

    let ssr = (&yv - &x * &beta).norm_squared();
    let rmse = (ssr / n as f64).sqrt();
    if !(rmse.is_finite() && sigma2.is_finite()) {
        return Err(ForecastError::NonFinite { stage: "trend fit" });
    }

    Ok(TrendFit {
        params: TrendParams {
            offset: beta[0],
            growth: beta[1],
            changepoints: changepoints.to_vec(),
            deltas: beta.iter().skip(2).copied().collect(),
        },
        sigma: sigma2.sqrt(),
        rmse,
        iterations,
        converged,
    })
}

/// Maximizer of `-SSR/(2σ²) - n ln σ - σ²/(2 s²)` over `σ²`.
///
/// Setting the derivative to zero gives `σ⁴/s² + nσ² - SSR = 0`.
fn noise_variance(ssr: f64, n: usize, prior_scale: f64) -> f64 {
    let n = n as f64;
    let s2 = prior_scale * prior_scale;
    let disc = n * n + 4.0 * ssr / s2;
    (s2 * (disc.sqrt() - n) / 2.0).max(SIGMA2_FLOOR)
}
