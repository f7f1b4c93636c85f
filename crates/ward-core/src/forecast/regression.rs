//! Ordinary least-squares trend line
//!
//! Points are accumulated as running centered sums, so fitting never forms
//! large raw sums of x² (epoch days squared) and stays numerically stable.

use serde::{Deserialize, Serialize};

/// Below this, all x values are treated as identical
const DEGENERATE_SXX: f64 = 1e-10;

/// A fitted line `y = slope * x + intercept`
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RegressionModel {
    pub slope: f64,
    pub intercept: f64,
}

impl RegressionModel {
    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// Incremental simple linear regression
#[derive(Debug, Clone, Default)]
pub struct TrendRegressor {
    n: u64,
    x_mean: f64,
    y_mean: f64,
    sum_xx: f64,
    sum_xy: f64,
}

impl TrendRegressor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> u64 {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    pub fn add(&mut self, x: f64, y: f64) {
        if self.n == 0 {
            self.x_mean = x;
            self.y_mean = y;
        } else {
            let n = self.n as f64;
            let weight = n / (n + 1.0);
            let dx = x - self.x_mean;
            let dy = y - self.y_mean;
            self.sum_xx += dx * dx * weight;
            self.sum_xy += dx * dy * weight;
            self.x_mean += dx / (n + 1.0);
            self.y_mean += dy / (n + 1.0);
        }
        self.n += 1;
    }

    /// Fit the least-squares line
    ///
    /// With fewer than two distinct x values the slope is zero and the line
    /// sits at the mean of y (zero when no point was added).
    pub fn fit(&self) -> RegressionModel {
        if self.n == 0 {
            return RegressionModel::default();
        }
        if self.sum_xx.abs() < DEGENERATE_SXX {
            return RegressionModel {
                slope: 0.0,
                intercept: self.y_mean,
            };
        }

        let slope = self.sum_xy / self.sum_xx;
        RegressionModel {
            slope,
            intercept: self.y_mean - slope * self.x_mean,
        }
    }
}

impl Extend<(f64, f64)> for TrendRegressor {
    fn extend<I: IntoIterator<Item = (f64, f64)>>(&mut self, points: I) {
        for (x, y) in points {
            self.add(x, y);
        }
    }
}

impl FromIterator<(f64, f64)> for TrendRegressor {
    fn from_iter<I: IntoIterator<Item = (f64, f64)>>(points: I) -> Self {
        let mut regressor = Self::new();
        regressor.extend(points);
        regressor
    }
}
