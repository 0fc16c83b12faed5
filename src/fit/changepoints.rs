//! Potential changepoint placement.
//!
//! Changepoints sit on observed dates, spread uniformly by index over the
//! first `range` fraction of the observed history. The most recent stretch of
//! history is left free of changepoints so the final slope is estimated from
//! enough points.

/// Generate `steps` evenly spaced points between `start` and `end` (inclusive).
pub fn linspace(start: f64, end: f64, steps: usize) -> Vec<f64> {
    match steps {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (steps as f64 - 1.0);
            (0..steps).map(|i| start + step * i as f64).collect()
        }
    }
}

/// Choose changepoint locations from sorted observed times.
///
/// With `n` observations at most `floor(range * n) - 1` changepoints are
/// placed (capped at `max_changepoints`). The first candidate index is always
/// dropped so no changepoint coincides with the start of history.
pub fn place_changepoints(observed_t: &[f64], max_changepoints: usize, range: f64) -> Vec<f64> {
    let range = if range.is_finite() { range.clamp(0.0, 1.0) } else { 0.0 };
    let hist_size = (observed_t.len() as f64 * range).floor() as usize;
    let n_changepoints = max_changepoints.min(hist_size.saturating_sub(1));
    if n_changepoints == 0 {
        return Vec::new();
    }

    linspace(0.0, (hist_size - 1) as f64, n_changepoints + 1)
        .into_iter()
        .skip(1)
        .map(|idx| observed_t[idx.round_ties_even() as usize])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(n: usize) -> Vec<f64> {
        linspace(0.0, 1.0, n)
    }

    #[test]
    fn linspace_includes_endpoints() {
        let v = linspace(0.0, 11.0, 12);
        assert_eq!(v.len(), 12);
        assert!((v[0] - 0.0).abs() < 1e-12);
        assert!((v[11] - 11.0).abs() < 1e-12);
        assert!(linspace(0.0, 1.0, 0).is_empty());
        assert_eq!(linspace(3.0, 9.0, 1), vec![3.0]);
    }

    #[test]
    fn fifteen_years_get_eleven_changepoints() {
        let t = grid(15);
        let cps = place_changepoints(&t, 25, 0.8);
        assert_eq!(cps.len(), 11);
        assert_eq!(cps[0], t[1]);
        assert_eq!(cps[10], t[11]);
    }

    #[test]
    fn changepoints_stay_inside_range_and_increase() {
        let t = grid(40);
        let cps = place_changepoints(&t, 25, 0.8);
        assert_eq!(cps.len(), 25);
        assert!(cps.windows(2).all(|w| w[0] < w[1]));
        assert!(cps.iter().all(|&c| c > 0.0 && c <= 0.8));
    }

    #[test]
    fn tiny_histories_get_none() {
        assert!(place_changepoints(&grid(2), 25, 0.8).is_empty());
        assert!(place_changepoints(&[0.0], 25, 0.8).is_empty());
        assert!(place_changepoints(&[], 25, 0.8).is_empty());
    }

    #[test]
    fn three_points_get_one() {
        let t = grid(3);
        assert_eq!(place_changepoints(&t, 25, 0.8), vec![t[1]]);
    }
}
