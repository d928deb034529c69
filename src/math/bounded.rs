//! Box-constrained weighted line fit.
//!
//! Minimizes the same objective as `weighted_line_fit`,
//!
//! ```text
//! S(a, b) = Σ (w_i · (y_i - a - b·x_i))^2
//! ```
//!
//! subject to `a ∈ [a_lo, a_hi]` and `b ∈ [b_lo, b_hi]`.
//!
//! `S` is a convex quadratic, so the constrained minimum is either the
//! unconstrained minimum (when feasible) or lies on one of the four box edges.
//! On an edge the problem is one-dimensional and the minimizer is the clamped
//! stationary point. We evaluate every feasible candidate and keep the best.

use crate::domain::LinearModel;

/// Closed interval bounds for intercept and slope.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineBounds {
    pub intercept: (f64, f64),
    pub slope: (f64, f64),
}

impl LineBounds {
    /// Intercept pinned into `[0, 1e-10]`, slope into `[-10, 10]`.
    pub const NEAR_ZERO_INTERCEPT: LineBounds = LineBounds {
        intercept: (0.0, 1e-10),
        slope: (-10.0, 10.0),
    };

    fn contains(&self, m: &LinearModel) -> bool {
        m.intercept >= self.intercept.0
            && m.intercept <= self.intercept.1
            && m.slope >= self.slope.0
            && m.slope <= self.slope.1
    }
}

/// Weighted moments of the sample.
struct Moments {
    sw: f64,
    sx: f64,
    sy: f64,
    sxx: f64,
    sxy: f64,
    syy: f64,
}

impl Moments {
    fn new(x: &[f64], y: &[f64], w: &[f64]) -> Self {
        let mut m = Moments {
            sw: 0.0,
            sx: 0.0,
            sy: 0.0,
            sxx: 0.0,
            sxy: 0.0,
            syy: 0.0,
        };
        for ((&xi, &yi), &wi) in x.iter().zip(y).zip(w) {
            let u = wi * wi;
            m.sw += u;
            m.sx += u * xi;
            m.sy += u * yi;
            m.sxx += u * xi * xi;
            m.sxy += u * xi * yi;
            m.syy += u * yi * yi;
        }
        m
    }

    /// Objective expanded in moments (avoids a second pass over the data).
    fn objective(&self, a: f64, b: f64) -> f64 {
        self.syy + a * a * self.sw + b * b * self.sxx - 2.0 * a * self.sy - 2.0 * b * self.sxy
            + 2.0 * a * b * self.sx
    }
}

/// Fit `y = a + b·x` under box bounds.
///
/// Returns `None` when the inputs are empty or the moments are not finite.
pub fn bounded_line_fit(x: &[f64], y: &[f64], w: &[f64], bounds: LineBounds) -> Option<LinearModel> {
    if x.is_empty() || x.len() != y.len() || x.len() != w.len() {
        return None;
    }
    let m = Moments::new(x, y, w);
    if ![m.sw, m.sx, m.sy, m.sxx, m.sxy, m.syy].iter().all(|v| v.is_finite()) || m.sw <= 0.0 {
        return None;
    }

    let (a_lo, a_hi) = bounds.intercept;
    let (b_lo, b_hi) = bounds.slope;
    let mut candidates: Vec<LinearModel> = Vec::with_capacity(5);

    let det = m.sw * m.sxx - m.sx * m.sx;
    if det.abs() > f64::EPSILON * (m.sw * m.sxx).abs() {
        let free = LinearModel {
            intercept: (m.sxx * m.sy - m.sx * m.sxy) / det,
            slope: (m.sw * m.sxy - m.sx * m.sy) / det,
        };
        if bounds.contains(&free) {
            return Some(free);
        }
    }

    // Intercept fixed on an edge: minimize over slope.
    for a in [a_lo, a_hi] {
        let slope = if m.sxx > 0.0 { (m.sxy - a * m.sx) / m.sxx } else { 0.0 };
        candidates.push(LinearModel {
            intercept: a,
            slope: slope.clamp(b_lo, b_hi),
        });
    }
    // Slope fixed on an edge: minimize over intercept.
    for b in [b_lo, b_hi] {
        let intercept = (m.sy - b * m.sx) / m.sw;
        candidates.push(LinearModel {
            intercept: intercept.clamp(a_lo, a_hi),
            slope: b,
        });
    }

    candidates
        .into_iter()
        .filter(|c| c.intercept.is_finite() && c.slope.is_finite())
        .map(|c| (m.objective(c.intercept, c.slope), c))
        .min_by(|(sa, _), (sb, _)| sa.partial_cmp(sb).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(_, c)| c)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feasible_unconstrained_minimum_is_returned() {
        let x = [1.0, 2.0, 3.0, 4.0];
        let y = [3.0, 5.0, 7.0, 9.0]; // y = 1 + 2x
        let w = [1.0; 4];
        let bounds = LineBounds {
            intercept: (-5.0, 5.0),
            slope: (-5.0, 5.0),
        };
        let m = bounded_line_fit(&x, &y, &w, bounds).unwrap();
        assert!((m.intercept - 1.0).abs() < 1e-10);
        assert!((m.slope - 2.0).abs() < 1e-10);
    }

    #[test]
    fn near_zero_bound_pins_intercept() {
        let x = [1.0, 2.0, 3.0, 4.0];
        let y = [3.0, 5.0, 7.0, 9.0]; // true intercept 1, outside the bound
        let w = [1.0; 4];
        let m = bounded_line_fit(&x, &y, &w, LineBounds::NEAR_ZERO_INTERCEPT).unwrap();
        assert!(m.intercept >= 0.0 && m.intercept <= 1e-10);
        // With a ≈ 0 the best slope is Σxy/Σxx.
        let expected = (3.0 + 10.0 + 21.0 + 36.0) / 30.0;
        assert!((m.slope - expected).abs() < 1e-8);
    }

    #[test]
    fn slope_is_clamped_to_bounds() {
        let x = [1.0, 2.0, 3.0];
        let y = [50.0, 100.0, 150.0]; // slope 50
        let w = [1.0; 3];
        let m = bounded_line_fit(&x, &y, &w, LineBounds::NEAR_ZERO_INTERCEPT).unwrap();
        assert!((m.slope - 10.0).abs() < 1e-12);
        assert!(m.intercept >= 0.0 && m.intercept <= 1e-10);
    }
}
