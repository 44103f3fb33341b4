//! Per-category linear trend fitting.
//!
//! The independent variable is elapsed time in years since a fixed epoch;
//! the dependent variable is the aggregated amount. Each category in the
//! cube is fitted independently by closed-form ordinary least squares.
//!
//! A fit needs at least two observations with non-zero variance in x.
//! Categories that cannot be fitted (empty series, single observation,
//! degenerate x) are logged and skipped; they are absent from the result
//! mapping rather than raising.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::warn;

use crate::error::{Result, TaprootError};
use crate::tabular::CategoryCube;

/// Conventional reference date the elapsed-years axis is measured from.
pub static DEFAULT_EPOCH: Lazy<NaiveDate> =
    Lazy::new(|| NaiveDate::from_ymd_opt(2010, 1, 1).expect("valid calendar date"));

/// Mean calendar-year length in days.
const DAYS_PER_YEAR: f64 = 365.25;

/// A fitted linear model plus the series it was fitted on.
#[derive(Debug, Clone, Serialize)]
pub struct TrendResult {
    /// Elapsed years since the epoch, one per date
    pub years: Vec<f64>,
    /// Aggregated amounts, one per date
    pub amounts: Vec<f64>,
    /// Fitted slope (amount per year)
    pub slope: f64,
    /// Fitted intercept (amount at the epoch)
    pub intercept: f64,
}

impl TrendResult {
    /// Evaluate the fitted line at an elapsed-years value
    pub fn predict(&self, years: f64) -> f64 {
        self.slope * years + self.intercept
    }
}

/// Elapsed time from `epoch` to `date`, in fractional years.
pub fn elapsed_years(date: NaiveDate, epoch: NaiveDate) -> f64 {
    (date - epoch).num_days() as f64 / DAYS_PER_YEAR
}

/// Fit `y = slope * x + intercept` by least squares.
pub fn fit_line(x: &[f64], y: &[f64]) -> Result<(f64, f64)> {
    if x.len() != y.len() {
        return Err(TaprootError::Fit {
            message: format!("Series length mismatch: {} vs {}", x.len(), y.len()),
        });
    }
    if x.len() < 2 {
        return Err(TaprootError::Fit {
            message: format!(
                "A linear fit needs at least two observations, got {}",
                x.len()
            ),
        });
    }

    let n = x.len() as f64;
    let mean_x = x.iter().sum::<f64>() / n;
    let mean_y = y.iter().sum::<f64>() / n;

    let mut sxx = 0.0;
    let mut sxy = 0.0;
    for (&xi, &yi) in x.iter().zip(y.iter()) {
        let dx = xi - mean_x;
        sxx += dx * dx;
        sxy += dx * (yi - mean_y);
    }

    if sxx == 0.0 {
        return Err(TaprootError::Fit {
            message: "Zero variance in the time axis".to_string(),
        });
    }

    let slope = sxy / sxx;
    let intercept = mean_y - slope * mean_x;
    Ok((slope, intercept))
}

/// Fit a linear trend for every category in the cube.
///
/// Returns a mapping from category name to its [`TrendResult`]. Categories
/// that cannot be fitted are logged and skipped.
pub fn fit_trends(cube: &CategoryCube, epoch: NaiveDate) -> BTreeMap<String, TrendResult> {
    let years: Vec<f64> = cube
        .dates
        .iter()
        .map(|&date| elapsed_years(date, epoch))
        .collect();

    let mut trends = BTreeMap::new();

    for (col, category) in cube.categories.iter().enumerate() {
        let amounts: Vec<f64> = cube.amounts.column(col).to_vec();

        if amounts.is_empty() {
            warn!(category = %category, "No data for category; skipping");
            continue;
        }

        match fit_line(&years, &amounts) {
            Ok((slope, intercept)) => {
                trends.insert(
                    category.clone(),
                    TrendResult {
                        years: years.clone(),
                        amounts,
                        slope,
                        intercept,
                    },
                );
            }
            Err(e) => {
                warn!(category = %category, error = %e, "Cannot fit category; skipping");
            }
        }
    }

    trends
}
