//! Two-pass, error-propagating line fits of radio SFR against IR SFR.
//!
//! Given `x`, `y` and independent uncertainties `σx`, `σy` we produce:
//!
//! - `free`: weighted least squares with a free intercept
//! - `zero`: the same relation held through the origin
//!
//! Each model is fitted twice. The first pass weights by `1/σy` only; its slope
//! `b` is then used to fold the x-uncertainty into a combined error
//!
//! ```text
//! σ_tot_i = sqrt(σy_i² + (b·σx_i)²)
//! ```
//!
//! and the second pass weights by `1/σ_tot`. Weights always multiply the
//! unsquared residual (see `math::ols`).

use log::{debug, info};

use crate::domain::{FitQuality, LinearModel, SampleSet, SfrFit, ZeroInterceptMode};
use crate::error::AnalysisError;
use crate::math::{LineBounds, bounded_line_fit, origin_line_fit, weighted_line_fit, weighted_sse};

/// A line has two parameters; anything below this is under-determined.
pub const MIN_SAMPLES: usize = 3;

/// Options that affect how the zero-intercept model is calibrated.
#[derive(Debug, Clone, Copy)]
pub struct FitOptions {
    pub zero_intercept: ZeroInterceptMode,
    /// Bounds used when `zero_intercept = Bounded`.
    pub bounds: LineBounds,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            zero_intercept: ZeroInterceptMode::Bounded,
            bounds: LineBounds::NEAR_ZERO_INTERCEPT,
        }
    }
}

/// Fit both lines to a sample set.
pub fn fit_sfr_relation(samples: &SampleSet, opts: &FitOptions) -> Result<SfrFit, AnalysisError> {
    validate(samples)?;

    let x = &samples.x;
    let y = &samples.y;
    let w_y: Vec<f64> = samples.y_err.iter().map(|s| 1.0 / s).collect();

    // Free intercept.
    let provisional = weighted_line_fit(x, y, &w_y).ok_or_else(singular)?;
    debug!("provisional free fit: {provisional}");

    let sigma_tot = combined_sigma(&samples.y_err, &samples.x_err, provisional.slope);
    let w_tot = inverse(&sigma_tot);
    let free = weighted_line_fit(x, y, &w_tot).ok_or_else(singular)?;
    info!("free-intercept fit: {free}");

    // Intercept held at zero.
    let provisional_zero = fit_zero(x, y, &w_y, opts)?;
    debug!("provisional zero-intercept fit: {provisional_zero}");

    let sigma_tot2 = combined_sigma(&samples.y_err, &samples.x_err, provisional_zero.slope);
    let w_tot2 = inverse(&sigma_tot2);
    let zero_raw = fit_zero(x, y, &w_tot2, opts)?;
    let zero = LinearModel::through_origin(zero_raw.slope);
    info!("zero-intercept fit: {zero} (solver intercept {:e})", zero_raw.intercept);

    let n = samples.len();
    Ok(SfrFit {
        free,
        zero,
        zero_raw_intercept: zero_raw.intercept,
        zero_mode: opts.zero_intercept,
        free_quality: quality(x, y, &w_tot, &free, n, 2),
        zero_quality: quality(x, y, &w_tot2, &zero, n, 1),
    })
}

/// Combined uncertainty, x-error propagated through `slope` and added in quadrature.
pub fn combined_sigma(y_err: &[f64], x_err: &[f64], slope: f64) -> Vec<f64> {
    y_err
        .iter()
        .zip(x_err)
        .map(|(&sy, &sx)| (sy * sy + (slope * sx) * (slope * sx)).sqrt())
        .collect()
}

fn fit_zero(x: &[f64], y: &[f64], w: &[f64], opts: &FitOptions) -> Result<LinearModel, AnalysisError> {
    match opts.zero_intercept {
        ZeroInterceptMode::Bounded => bounded_line_fit(x, y, w, opts.bounds).ok_or_else(singular),
        ZeroInterceptMode::Exact => origin_line_fit(x, y, w)
            .map(LinearModel::through_origin)
            .ok_or_else(singular),
    }
}

fn validate(samples: &SampleSet) -> Result<(), AnalysisError> {
    let n = samples.len();
    if samples.y.len() != n || samples.x_err.len() != n || samples.y_err.len() != n {
        return Err(AnalysisError::DegenerateInput(
            "sample sequences differ in length".to_string(),
        ));
    }
    if n < MIN_SAMPLES {
        return Err(AnalysisError::InsufficientSamples { n });
    }

    for (i, &s) in samples.y_err.iter().enumerate() {
        if !(s.is_finite() && s > 0.0) {
            return Err(AnalysisError::DegenerateInput(format!(
                "y uncertainty at index {i} must be finite and > 0 (got {s})"
            )));
        }
    }
    for (i, &s) in samples.x_err.iter().enumerate() {
        if !(s.is_finite() && s >= 0.0) {
            return Err(AnalysisError::DegenerateInput(format!(
                "x uncertainty at index {i} must be finite and >= 0 (got {s})"
            )));
        }
    }
    if let Some(i) = samples
        .x
        .iter()
        .zip(&samples.y)
        .position(|(x, y)| !(x.is_finite() && y.is_finite()))
    {
        return Err(AnalysisError::DegenerateInput(format!(
            "non-finite sample at index {i}"
        )));
    }

    let x0 = samples.x[0];
    if samples.x.iter().all(|&x| x == x0) {
        return Err(AnalysisError::DegenerateInput(format!(
            "all x values are identical ({x0})"
        )));
    }
    Ok(())
}

fn inverse(sigma: &[f64]) -> Vec<f64> {
    sigma.iter().map(|s| 1.0 / s).collect()
}

fn singular() -> AnalysisError {
    AnalysisError::DegenerateInput("weighted least squares system is singular".to_string())
}

fn quality(x: &[f64], y: &[f64], w: &[f64], model: &LinearModel, n: usize, params: usize) -> FitQuality {
    let chi2 = weighted_sse(x, y, w, model);
    let dof = n.saturating_sub(params);
    let reduced_chi2 = if dof > 0 { chi2 / dof as f64 } else { f64::NAN };
    FitQuality {
        chi2,
        dof,
        reduced_chi2,
        n,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::synthetic::generate_linear_samples;

    fn samples(x: &[f64], y: &[f64], sx: f64, sy: f64) -> SampleSet {
        SampleSet::new(x.to_vec(), y.to_vec(), vec![sx; x.len()], vec![sy; x.len()]).unwrap()
    }

    #[test]
    fn exact_line_is_recovered() {
        let x = [10.0, 20.0, 40.0, 80.0];
        let y: Vec<f64> = x.iter().map(|v| 3.0 + 0.5 * v).collect();
        let fit = fit_sfr_relation(&samples(&x, &y, 1.0, 2.0), &FitOptions::default()).unwrap();

        assert!((fit.free.slope - 0.5).abs() < 1e-9);
        assert!((fit.free.intercept - 3.0).abs() < 1e-8);
        assert!(fit.free_quality.chi2 < 1e-12);
        assert_eq!(fit.free_quality.dof, 2);
    }

    #[test]
    fn zero_model_stays_inside_bound() {
        let x = [10.0, 25.0, 50.0, 90.0, 150.0];
        let y = [8.0, 14.0, 22.0, 41.0, 57.0];
        let fit = fit_sfr_relation(&samples(&x, &y, 2.0, 3.0), &FitOptions::default()).unwrap();

        assert_eq!(fit.zero.intercept, 0.0);
        assert!(fit.zero_raw_intercept >= 0.0 && fit.zero_raw_intercept <= 1e-10);
        assert!(fit.free.slope.is_finite() && fit.free.intercept.is_finite());
        assert!(fit.zero.slope.is_finite());
    }

    #[test]
    fn exact_mode_matches_bounded_mode_closely() {
        let x = [10.0, 25.0, 50.0, 90.0, 150.0];
        let y = [8.0, 14.0, 22.0, 41.0, 57.0];
        let s = samples(&x, &y, 2.0, 3.0);
        let bounded = fit_sfr_relation(&s, &FitOptions::default()).unwrap();
        let exact = fit_sfr_relation(
            &s,
            &FitOptions {
                zero_intercept: ZeroInterceptMode::Exact,
                ..FitOptions::default()
            },
        )
        .unwrap();
        assert_eq!(exact.zero_raw_intercept, 0.0);
        assert!((bounded.zero.slope - exact.zero.slope).abs() < 1e-9);
    }

    #[test]
    fn rejects_fewer_than_three_points() {
        let err = fit_sfr_relation(&samples(&[1.0, 2.0], &[1.0, 2.0], 0.1, 0.1), &FitOptions::default())
            .unwrap_err();
        assert_eq!(err, AnalysisError::InsufficientSamples { n: 2 });
    }

    #[test]
    fn rejects_identical_x() {
        let err = fit_sfr_relation(
            &samples(&[5.0, 5.0, 5.0], &[1.0, 2.0, 3.0], 0.1, 0.1),
            &FitOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, AnalysisError::DegenerateInput(_)));
    }

    #[test]
    fn rejects_zero_y_uncertainty() {
        let s = SampleSet::new(
            vec![1.0, 2.0, 3.0],
            vec![1.0, 2.0, 3.0],
            vec![0.1; 3],
            vec![0.1, 0.0, 0.1],
        )
        .unwrap();
        let err = fit_sfr_relation(&s, &FitOptions::default()).unwrap_err();
        assert!(matches!(err, AnalysisError::DegenerateInput(_)));
    }

    #[test]
    fn combined_sigma_adds_in_quadrature() {
        let s = combined_sigma(&[3.0, 0.0], &[2.0, 1.0], 2.0);
        assert!((s[0] - 5.0).abs() < 1e-12);
        assert!((s[1] - 2.0).abs() < 1e-12);
    }

    #[test]
    fn slope_converges_as_noise_shrinks() {
        let mut previous_err = f64::INFINITY;
        for &noise in &[0.2, 0.02, 0.002] {
            let s = generate_linear_samples(60, 0.0, 2.5, noise, 7);
            let fit = fit_sfr_relation(&s, &FitOptions::default()).unwrap();
            let err = (fit.free.slope - 2.5).abs().max((fit.zero.slope - 2.5).abs());
            assert!(err < 10.0 * noise, "noise={noise} err={err}");
            assert!(err <= previous_err + 1e-12);
            previous_err = err;
        }
    }
}
