//! Weighted least squares for straight lines.
//!
//! We solve small problems of the form:
//!
//! ```text
//! minimize Σ (w_i · (y_i - a - b·x_i))^2
//! ```
//!
//! Note that `w_i` multiplies the *unsquared* residual, so passing
//! `w_i = 1/σ_i` yields the usual χ² objective. This matches how the catalog
//! fits have always been weighted; do not pass `1/σ²`.
//!
//! Implementation choices:
//! - We scale rows by `w_i` and solve an ordinary least squares problem.
//! - We use SVD so the tall design matrix is handled robustly, and check the
//!   numerical rank so a singular problem is reported rather than papered over
//!   with a minimum-norm solution.

use nalgebra::{DMatrix, DVector};

use crate::domain::LinearModel;

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is rank-deficient or the solution is not finite.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = x.clone().svd(true, true);

    let s_max = svd.singular_values.iter().copied().fold(0.0_f64, f64::max);
    if !(s_max.is_finite() && s_max > 0.0) {
        return None;
    }
    let tol = s_max * 1e-12;
    if svd.rank(tol) < x.ncols() {
        return None;
    }

    let beta = svd.solve(y, tol).ok()?;
    if beta.iter().all(|v| v.is_finite()) {
        Some(beta)
    } else {
        None
    }
}

/// Fit `y = a + b·x` with per-sample weights on the unsquared residuals.
pub fn weighted_line_fit(x: &[f64], y: &[f64], w: &[f64]) -> Option<LinearModel> {
    let n = x.len();
    if n < 2 || y.len() != n || w.len() != n {
        return None;
    }

    let mut xw = DMatrix::<f64>::zeros(n, 2);
    let mut yw = DVector::<f64>::zeros(n);
    for i in 0..n {
        xw[(i, 0)] = w[i];
        xw[(i, 1)] = x[i] * w[i];
        yw[i] = y[i] * w[i];
    }

    let beta = solve_least_squares(&xw, &yw)?;
    Some(LinearModel {
        intercept: beta[0],
        slope: beta[1],
    })
}

/// Fit `y = b·x` (no intercept term) with weights on the unsquared residuals.
pub fn origin_line_fit(x: &[f64], y: &[f64], w: &[f64]) -> Option<f64> {
    let mut sxx = 0.0;
    let mut sxy = 0.0;
    for ((&xi, &yi), &wi) in x.iter().zip(y).zip(w) {
        let u = wi * wi;
        sxx += u * xi * xi;
        sxy += u * xi * yi;
    }
    if !(sxx.is_finite() && sxx > 0.0) {
        return None;
    }
    let b = sxy / sxx;
    b.is_finite().then_some(b)
}

/// Weighted sum of squared residuals for a line.
pub fn weighted_sse(x: &[f64], y: &[f64], w: &[f64], model: &LinearModel) -> f64 {
    x.iter()
        .zip(y)
        .zip(w)
        .map(|((&xi, &yi), &wi)| {
            let r = wi * (yi - model.intercept - model.slope * xi);
            r * r
        })
        .sum()
}
