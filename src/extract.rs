//! Point extraction from a loaded gridded dataset.
//!
//! A [`GridProbe`] owns the source path and the optionally-loaded dataset.
//! Sampling resolves the requested latitude and longitude to grid indices
//! per axis independently (nearest coordinate value on each axis, not a
//! geodesic nearest neighbor) and slices the variable at that cell across
//! all remaining dimensions.

use ndarray::{Array, Axis, IxDyn};
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::error::{Result, TaprootError};
use crate::state::GridDataset;

/// Dimension names the extractor resolves against.
pub const LAT_DIM: &str = "lat";
pub const LON_DIM: &str = "lon";

/// A variable sampled at one grid cell.
///
/// `values` holds the variable's data at the nearest cell across all
/// dimensions other than lat/lon (a 1-D series for a time-varying
/// variable, a scalar for a purely spatial one).
#[derive(Debug, Clone)]
pub struct PointSample {
    /// Requested latitude
    pub lat: f64,
    /// Requested longitude
    pub lon: f64,
    /// Resolved latitude index
    pub lat_index: usize,
    /// Resolved longitude index
    pub lon_index: usize,
    /// Values at the cell over the remaining dimensions
    pub values: Array<f32, IxDyn>,
}

impl PointSample {
    /// The sampled values flattened into a plain vector, in storage order.
    pub fn values_flat(&self) -> Vec<f32> {
        self.values.iter().copied().collect()
    }
}

/// Point extractor over a gridded dataset.
#[derive(Debug)]
pub struct GridProbe {
    path: PathBuf,
    dataset: Option<GridDataset>,
}

impl GridProbe {
    /// Create a probe for a file that has not been loaded yet
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            dataset: None,
        }
    }

    /// Create a probe over an already-built dataset
    pub fn from_dataset(dataset: GridDataset) -> Self {
        Self {
            path: PathBuf::new(),
            dataset: Some(dataset),
        }
    }

    /// The source file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the dataset from the probe's path
    #[cfg(feature = "netcdf")]
    pub fn load(&mut self) -> Result<&GridDataset> {
        let dataset = crate::data_loader::load_grid(&self.path)?;
        Ok(self.dataset.insert(dataset))
    }

    /// The loaded dataset, or a dataset-not-ready error
    pub fn dataset(&self) -> Result<&GridDataset> {
        self.dataset.as_ref().ok_or_else(|| TaprootError::DatasetNotLoaded {
            message: format!(
                "Dataset {} not loaded; call load() first",
                self.path.display()
            ),
        })
    }

    /// Sample a variable at the grid cell nearest to (lat, lon).
    pub fn sample_at(&self, lat: f64, lon: f64, variable: &str) -> Result<PointSample> {
        if !lat.is_finite() || !lon.is_finite() {
            return Err(TaprootError::InvalidCoordinates {
                message: format!("Coordinates must be finite, got ({}, {})", lat, lon),
            });
        }

        let dataset = self.dataset()?;
        let var_meta = dataset.variable_metadata_checked(variable)?;
        let data = dataset.variable_data_checked(variable)?;

        let lat_pos = axis_position(&var_meta.dimensions, variable, LAT_DIM)?;
        let lon_pos = axis_position(&var_meta.dimensions, variable, LON_DIM)?;

        let lat_index = dataset.nearest_coordinate_index(LAT_DIM, lat)?;
        let lon_index = dataset.nearest_coordinate_index(LON_DIM, lon)?;

        // Slice the higher axis first so the lower position stays valid.
        let mut slices = [(lat_pos, lat_index), (lon_pos, lon_index)];
        slices.sort_by(|a, b| b.0.cmp(&a.0));

        let mut view = data.view();
        for (axis, index) in slices {
            view = view.index_axis_move(Axis(axis), index);
        }

        Ok(PointSample {
            lat,
            lon,
            lat_index,
            lon_index,
            values: view.to_owned(),
        })
    }

    /// Sample a variable at each of the given (lat, lon) points.
    ///
    /// Points are processed independently, but the comparison is
    /// all-or-nothing: the first failing query abandons the remaining
    /// points and yields `None` with a warning, never partial results.
    pub fn compare_points(
        &self,
        points: &[(f64, f64)],
        variable: &str,
    ) -> Option<Vec<PointSample>> {
        let mut results = Vec::with_capacity(points.len());
        for &(lat, lon) in points {
            match self.sample_at(lat, lon, variable) {
                Ok(sample) => results.push(sample),
                Err(e) => {
                    warn!(
                        lat,
                        lon,
                        variable,
                        error = %e,
                        "Comparison abandoned on first failing point; no results returned"
                    );
                    return None;
                }
            }
        }
        Some(results)
    }
}

fn axis_position(dimensions: &[String], variable: &str, dim: &str) -> Result<usize> {
    dimensions
        .iter()
        .position(|d| d == dim)
        .ok_or_else(|| TaprootError::SchemaMissing {
            message: format!("Variable {} has no '{}' dimension", variable, dim),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{Dimension, Metadata, Variable};
    use std::collections::HashMap;

    /// Grid with lat=[10,20,30], lon=[100,110]:
    ///   t  = [[1,2],[3,4],[5,6]]                  (lat, lon)
    ///   tt = t repeated at two time steps, +10    (time, lat, lon)
    fn sample_dataset() -> GridDataset {
        let mut dimensions = HashMap::new();
        for (name, size) in [("time", 2usize), ("lat", 3usize), ("lon", 2usize)] {
            dimensions.insert(
                name.to_string(),
                Dimension {
                    name: name.to_string(),
                    size,
                    is_unlimited: false,
                },
            );
        }

        let mut coordinates = HashMap::new();
        coordinates.insert("time".to_string(), vec![0.0, 1.0]);
        coordinates.insert("lat".to_string(), vec![10.0, 20.0, 30.0]);
        coordinates.insert("lon".to_string(), vec![100.0, 110.0]);

        let mut variables = HashMap::new();
        variables.insert(
            "t".to_string(),
            Variable {
                name: "t".to_string(),
                dimensions: vec!["lat".to_string(), "lon".to_string()],
                shape: vec![3, 2],
                attributes: HashMap::new(),
                dtype: "Float".to_string(),
            },
        );
        variables.insert(
            "tt".to_string(),
            Variable {
                name: "tt".to_string(),
                dimensions: vec!["time".to_string(), "lat".to_string(), "lon".to_string()],
                shape: vec![2, 3, 2],
                attributes: HashMap::new(),
                dtype: "Float".to_string(),
            },
        );

        let base = vec![1.0f32, 2.0, 3.0, 4.0, 5.0, 6.0];
        let mut stacked = base.clone();
        stacked.extend(base.iter().map(|v| v + 10.0));

        let mut data = HashMap::new();
        data.insert(
            "t".to_string(),
            Array::from_shape_vec(IxDyn(&[3, 2]), base).unwrap(),
        );
        data.insert(
            "tt".to_string(),
            Array::from_shape_vec(IxDyn(&[2, 3, 2]), stacked).unwrap(),
        );

        GridDataset::new(
            Metadata {
                global_attributes: HashMap::new(),
                dimensions,
                variables,
                coordinates,
            },
            data,
        )
    }

    #[test]
    fn test_sample_exact_cell_returns_stored_value() {
        let probe = GridProbe::from_dataset(sample_dataset());
        let sample = probe.sample_at(20.0, 110.0, "t").unwrap();
        assert_eq!(sample.values_flat(), vec![4.0]);
    }

    #[test]
    fn test_sample_resolves_nearest_per_axis() {
        let probe = GridProbe::from_dataset(sample_dataset());
        // lat=22 -> index 1, lon=101 -> index 0
        let sample = probe.sample_at(22.0, 101.0, "t").unwrap();
        assert_eq!(sample.lat_index, 1);
        assert_eq!(sample.lon_index, 0);
        assert_eq!(sample.values_flat(), vec![3.0]);
    }

    #[test]
    fn test_sample_outside_range_uses_edge_cell() {
        let probe = GridProbe::from_dataset(sample_dataset());
        let sample = probe.sample_at(-200.0, 99999.0, "t").unwrap();
        assert_eq!(sample.lat_index, 0);
        assert_eq!(sample.lon_index, 1);
        assert_eq!(sample.values_flat(), vec![2.0]);
    }

    #[test]
    fn test_sample_time_series_at_cell() {
        let probe = GridProbe::from_dataset(sample_dataset());
        let sample = probe.sample_at(22.0, 101.0, "tt").unwrap();
        // One value per time step at the resolved cell.
        assert_eq!(sample.values.shape(), &[2]);
        assert_eq!(sample.values_flat(), vec![3.0, 13.0]);
    }

    #[test]
    fn test_sample_before_load_fails() {
        let probe = GridProbe::new("/tmp/never-loaded.nc");
        let result = probe.sample_at(20.0, 110.0, "t");
        assert!(matches!(
            result,
            Err(TaprootError::DatasetNotLoaded { .. })
        ));
    }

    #[test]
    fn test_sample_rejects_non_finite_coordinates() {
        let probe = GridProbe::from_dataset(sample_dataset());
        assert!(matches!(
            probe.sample_at(f64::NAN, 101.0, "t"),
            Err(TaprootError::InvalidCoordinates { .. })
        ));
    }

    #[test]
    fn test_sample_unknown_variable_fails() {
        let probe = GridProbe::from_dataset(sample_dataset());
        assert!(matches!(
            probe.sample_at(20.0, 110.0, "missing"),
            Err(TaprootError::DataNotFound { .. })
        ));
    }

    #[test]
    fn test_compare_points_returns_all_samples() {
        let probe = GridProbe::from_dataset(sample_dataset());
        let samples = probe
            .compare_points(&[(22.0, 101.0), (30.0, 110.0)], "t")
            .unwrap();
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].values_flat(), vec![3.0]);
        assert_eq!(samples[1].values_flat(), vec![6.0]);
    }

    #[test]
    fn test_compare_points_abandons_all_on_first_error() {
        let probe = GridProbe::from_dataset(sample_dataset());
        assert!(probe
            .compare_points(&[(22.0, 101.0), (30.0, 110.0)], "missing")
            .is_none());

        let unloaded = GridProbe::new("/tmp/never-loaded.nc");
        assert!(unloaded.compare_points(&[(22.0, 101.0)], "t").is_none());
    }
}
