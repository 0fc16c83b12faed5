//! Predictive intervals by simulation.
//!
//! Two sources of uncertainty are simulated for every draw:
//!
//! - trend: beyond the end of history (`t > 1`) new changepoints appear at the
//!   same average rate as in the fitted history, with Laplace-distributed
//!   slope changes whose scale is the mean absolute fitted change
//! - observation noise: `N(0, σ²)`
//!
//! Interval bounds are empirical percentiles across draws. Draws come from a
//! seeded RNG, so the same inputs always give the same bounds.

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::{Exp, Normal, Poisson};

use crate::error::ForecastError;
use crate::fit::fitter::TrendFit;
use crate::math::percentile_sorted;
use crate::models::predict;

/// Lower/upper bounds on the scaled axis, one pair per evaluation time.
#[derive(Debug, Clone, PartialEq)]
pub struct Intervals {
    pub lower: Vec<f64>,
    pub upper: Vec<f64>,
}

/// Simulate `samples` draws at `t_eval` and return the central
/// `interval_width` interval for each time.
pub fn simulate_intervals(
    fit: &TrendFit,
    t_eval: &[f64],
    samples: usize,
    interval_width: f64,
    seed: u64,
) -> Result<Intervals, ForecastError> {
    if !(interval_width > 0.0 && interval_width < 1.0) {
        return Err(ForecastError::InvalidInput(format!(
            "interval width must be in (0, 1), got {interval_width}"
        )));
    }
    if samples == 0 || t_eval.is_empty() {
        let trend: Vec<f64> = t_eval.iter().map(|&t| fit.params.predict(t)).collect();
        return Ok(Intervals {
            lower: trend.clone(),
            upper: trend,
        });
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let noise = Normal::new(0.0, fit.sigma).map_err(|_| ForecastError::NonFinite {
        stage: "uncertainty simulation",
    })?;

    let t_max = t_eval.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let future_span = (t_max - 1.0).max(0.0);
    let change_rate = fit.params.changepoints.len() as f64 * future_span;
    let change_scale = fit.params.mean_abs_delta() + 1e-8;

    let count_dist = if change_rate > 0.0 {
        Some(Poisson::new(change_rate).map_err(|_| ForecastError::NonFinite {
            stage: "uncertainty simulation",
        })?)
    } else {
        None
    };
    let magnitude = Exp::new(1.0 / change_scale).map_err(|_| ForecastError::NonFinite {
        stage: "uncertainty simulation",
    })?;

    // draws[i][k] = value of draw k at t_eval[i]
    let mut draws: Vec<Vec<f64>> = vec![Vec::with_capacity(samples); t_eval.len()];
    let mut new_cps: Vec<f64> = Vec::new();
    let mut new_deltas: Vec<f64> = Vec::new();

    for _ in 0..samples {
        new_cps.clear();
        new_deltas.clear();

        if let Some(dist) = &count_dist {
            let n_changes = dist.sample(&mut rng) as usize;
            for _ in 0..n_changes {
                new_cps.push(rng.gen_range(1.0..=t_max));
                let size = magnitude.sample(&mut rng);
                new_deltas.push(if rng.gen_bool(0.5) { size } else { -size });
            }
        }

        for (i, &t) in t_eval.iter().enumerate() {
            let base = fit.params.predict(t);
            let extra = predict(t, 0.0, 0.0, &new_cps, &new_deltas);
            draws[i].push(base + extra + noise.sample(&mut rng));
        }
    }

    let lo_q = (1.0 - interval_width) / 2.0 * 100.0;
    let hi_q = (1.0 + interval_width) / 2.0 * 100.0;

    let mut lower = Vec::with_capacity(t_eval.len());
    let mut upper = Vec::with_capacity(t_eval.len());
    for mut values in draws {
        values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        let lo = percentile_sorted(&values, lo_q).ok_or(ForecastError::NonFinite {
            stage: "uncertainty simulation",
        })?;
        let hi = percentile_sorted(&values, hi_q).ok_or(ForecastError::NonFinite {
            stage: "uncertainty simulation",
        })?;
        if !(lo.is_finite() && hi.is_finite()) {
            return Err(ForecastError::NonFinite {
                stage: "uncertainty simulation",
            });
        }
        lower.push(lo);
        upper.push(hi);
    }

    Ok(Intervals { lower, upper })
}
