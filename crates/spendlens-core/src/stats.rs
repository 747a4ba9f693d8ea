//! Small statistics helpers shared by the analyzers

/// Savings rate (percent) below which savings are called low
pub const LOW_SAVINGS_RATE: f64 = 10.0;
/// Savings rate (percent) the advice aims for
pub const TARGET_SAVINGS_RATE: f64 = 20.0;

/// Arithmetic mean; 0.0 for an empty slice
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample (n - 1) standard deviation; 0.0 with fewer than two values
pub fn sample_std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let avg = mean(values);
    let sum_sq: f64 = values.iter().map(|v| (v - avg).powi(2)).sum();
    (sum_sq / (values.len() - 1) as f64).sqrt()
}

/// `part / total * 100`, or 0.0 when `total` is not positive
pub fn percentage(part: f64, total: f64) -> f64 {
    if total > 0.0 {
        part / total * 100.0
    } else {
        0.0
    }
}

/// Round to cents for display
pub fn round_currency(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Ordinary least-squares line `y = intercept + slope * x`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
}

impl LinearFit {
    /// Fit a line through `(x, y)` points.
    ///
    /// Returns `None` with fewer than two points or when every x is equal.
    pub fn fit(points: &[(f64, f64)]) -> Option<Self> {
        if points.len() < 2 {
            return None;
        }

        let n = points.len() as f64;
        let sum_x: f64 = points.iter().map(|(x, _)| x).sum();
        let sum_y: f64 = points.iter().map(|(_, y)| y).sum();
        let sum_xy: f64 = points.iter().map(|(x, y)| x * y).sum();
        let sum_xx: f64 = points.iter().map(|(x, _)| x * x).sum();

        let denominator = n.mul_add(sum_xx, -(sum_x * sum_x));
        if denominator.abs() < f64::EPSILON {
            return None;
        }

        let slope = n.mul_add(sum_xy, -(sum_x * sum_y)) / denominator;
        let intercept = (sum_y - slope * sum_x) / n;
        Some(Self { slope, intercept })
    }

    /// Fit against the zero-based index of each value
    pub fn fit_indexed(values: &[f64]) -> Option<Self> {
        let points: Vec<(f64, f64)> = values
            .iter()
            .enumerate()
            .map(|(i, &y)| (i as f64, y))
            .collect();
        Self::fit(&points)
    }

    pub fn predict(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }
}
