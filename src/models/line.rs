//! Evaluation and formatting for `LinearModel`.

use std::fmt;

use crate::domain::LinearModel;

impl LinearModel {
    /// `y = slope·x` (intercept exactly zero).
    pub fn through_origin(slope: f64) -> Self {
        Self { intercept: 0.0, slope }
    }

    /// The one-to-one reference line.
    pub fn one_to_one() -> Self {
        Self::through_origin(1.0)
    }

    /// Radio SFR suppressed by a constant factor relative to IR SFR.
    pub fn suppressed_by(factor: f64) -> Self {
        Self::through_origin(1.0 / factor)
    }

    /// Predict `y(x)`.
    pub fn predict(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }

    /// Sample the line at `n` evenly spaced points on `[x_min, x_max]`.
    pub fn sample(&self, x_min: f64, x_max: f64, n: usize) -> Vec<(f64, f64)> {
        let n = n.max(2);
        (0..n)
            .map(|i| {
                let u = i as f64 / (n as f64 - 1.0);
                let x = x_min + u * (x_max - x_min);
                (x, self.predict(x))
            })
            .collect()
    }
}

/// Polynomial-style rendering, e.g. `2.5 x + 0.1` or `0.4 x`.
impl fmt::Display for LinearModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4} x", self.slope)?;
        if self.intercept != 0.0 {
            let sign = if self.intercept < 0.0 { '-' } else { '+' };
            write!(f, " {sign} {:.4}", self.intercept.abs())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn predict_and_sample() {
        let m = LinearModel { intercept: 1.0, slope: 2.0 };
        assert_eq!(m.predict(3.0), 7.0);
        let pts = m.sample(0.0, 10.0, 3);
        assert_eq!(pts, vec![(0.0, 1.0), (5.0, 11.0), (10.0, 21.0)]);
    }

    #[test]
    fn display_formats() {
        assert_eq!(LinearModel { intercept: -0.5, slope: 2.5 }.to_string(), "2.5000 x - 0.5000");
        assert_eq!(LinearModel::suppressed_by(2.5).to_string(), "0.4000 x");
    }
}
