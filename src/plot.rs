//! Plot-ready payloads for an external renderer.
//!
//! The pipelines end in data structures, not pixels: trend plots carry the
//! observed points and a sampled fit line per category, heatmaps carry the
//! variable averaged onto the lat/lon plane. Everything here serializes to
//! JSON for whatever draws it.

use chrono::NaiveDate;
use ndarray::{Array, Axis, IxDyn};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::error::{Result, TaprootError};
use crate::extract::{LAT_DIM, LON_DIM};
use crate::state::GridDataset;
use crate::trend::TrendResult;

/// Points sampled along each fitted line.
const FIT_SAMPLES: usize = 100;

/// One category's trend: observed (years, amount) points plus the fit line.
#[derive(Debug, Clone, Serialize)]
pub struct TrendSeries {
    pub category: String,
    /// Observed points as [elapsed_years, amount]
    pub observed: Vec<[f64; 2]>,
    /// Sampled fitted line spanning the observed x-range
    pub fitted: Vec<[f64; 2]>,
    pub slope: f64,
    pub intercept: f64,
}

/// A complete trend plot over one or more categories.
#[derive(Debug, Clone, Serialize)]
pub struct TrendPlot {
    /// The date elapsed-years are measured from
    pub epoch: NaiveDate,
    pub series: Vec<TrendSeries>,
}

/// Build the trend plot payload from fitted results.
pub fn trend_plot(trends: &BTreeMap<String, TrendResult>, epoch: NaiveDate) -> TrendPlot {
    let series = trends
        .iter()
        .map(|(category, trend)| {
            let observed: Vec<[f64; 2]> = trend
                .years
                .iter()
                .zip(trend.amounts.iter())
                .map(|(&x, &y)| [x, y])
                .collect();

            let fitted = sample_fit_line(trend);

            TrendSeries {
                category: category.clone(),
                observed,
                fitted,
                slope: trend.slope,
                intercept: trend.intercept,
            }
        })
        .collect();

    TrendPlot { epoch, series }
}

fn sample_fit_line(trend: &TrendResult) -> Vec<[f64; 2]> {
    let min = trend.years.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = trend.years.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    if !min.is_finite() || !max.is_finite() {
        return Vec::new();
    }

    let step = (max - min) / (FIT_SAMPLES - 1) as f64;
    (0..FIT_SAMPLES)
        .map(|i| {
            let x = min + step * i as f64;
            [x, trend.predict(x)]
        })
        .collect()
}

/// A variable collapsed onto the lat/lon plane by averaging all other
/// dimensions (the time-mean for a (time, lat, lon) variable).
#[derive(Debug, Clone, Serialize)]
pub struct HeatmapPlot {
    pub variable: String,
    pub lats: Vec<f64>,
    pub lons: Vec<f64>,
    /// Row-major values, `values[lat_index][lon_index]`
    pub values: Vec<Vec<f32>>,
}

/// Build the heatmap payload for a variable.
pub fn heatmap(dataset: &GridDataset, variable: &str) -> Result<HeatmapPlot> {
    let var_meta = dataset.variable_metadata_checked(variable)?;
    let data = dataset.variable_data_checked(variable)?;

    let mut dims = var_meta.dimensions.clone();
    if !dims.iter().any(|d| d == LAT_DIM) || !dims.iter().any(|d| d == LON_DIM) {
        return Err(TaprootError::SchemaMissing {
            message: format!("Variable {} has no lat/lon plane to map", variable),
        });
    }

    // Average away every non-spatial axis, one at a time.
    let mut reduced: Array<f32, IxDyn> = data.to_owned();
    while let Some(pos) = dims.iter().position(|d| d != LAT_DIM && d != LON_DIM) {
        reduced = reduced
            .mean_axis(Axis(pos))
            .ok_or_else(|| TaprootError::DataNotFound {
                message: format!("Dimension {} of {} is empty", dims[pos], variable),
            })?;
        dims.remove(pos);
    }

    let lats = dataset.coordinate_checked(LAT_DIM)?.clone();
    let lons = dataset.coordinate_checked(LON_DIM)?.clone();

    let lat_first = dims[0] == LAT_DIM;
    let mut values = Vec::with_capacity(lats.len());
    for i in 0..lats.len() {
        let mut row = Vec::with_capacity(lons.len());
        for j in 0..lons.len() {
            let value = if lat_first {
                reduced[[i, j]]
            } else {
                reduced[[j, i]]
            };
            row.push(value);
        }
        values.push(row);
    }

    Ok(HeatmapPlot {
        variable: variable.to_string(),
        lats,
        lons,
        values,
    })
}
