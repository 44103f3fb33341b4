//! In-memory representation of a loaded gridded dataset.
//!
//! A [`GridDataset`] holds the dimensions, variables, attributes and
//! coordinate arrays of a NetCDF file, plus the dense data arrays
//! themselves. Point extraction resolves coordinates through
//! [`GridDataset::nearest_coordinate_index`].

use ndarray::{Array, IxDyn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{Result, TaprootError};

/// Metadata about a dataset dimension
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dimension {
    /// Name of the dimension
    pub name: String,
    /// Size of the dimension
    pub size: usize,
    /// Whether this dimension is unlimited
    pub is_unlimited: bool,
}

/// Metadata about a dataset variable
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Variable {
    /// Name of the variable
    pub name: String,
    /// Dimensions of the variable
    pub dimensions: Vec<String>,
    /// Shape of the variable (dimension sizes)
    pub shape: Vec<usize>,
    /// Variable attributes
    pub attributes: HashMap<String, AttributeValue>,
    /// Data type as string
    pub dtype: String,
}

/// Possible attribute values in a gridded file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    /// String attribute
    Text(String),
    /// Numeric attribute (stored as f64 for simplicity)
    Number(f64),
    /// Array of numbers
    NumberArray(Vec<f64>),
}

/// Complete metadata for a gridded file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Metadata {
    /// File-level attributes
    pub global_attributes: HashMap<String, AttributeValue>,
    /// Dimensions in the file
    pub dimensions: HashMap<String, Dimension>,
    /// Variables in the file
    pub variables: HashMap<String, Variable>,
    /// Coordinate arrays (variables that share a dimension's name)
    pub coordinates: HashMap<String, Vec<f64>>,
}

/// A fully loaded gridded dataset, exclusively owned by its pipeline run.
#[derive(Debug, Clone)]
pub struct GridDataset {
    /// File metadata
    pub metadata: Metadata,
    /// Loaded data arrays
    pub data: HashMap<String, Array<f32, IxDyn>>,
}

impl GridDataset {
    /// Create a new GridDataset
    pub fn new(metadata: Metadata, data: HashMap<String, Array<f32, IxDyn>>) -> Self {
        Self { metadata, data }
    }

    /// Get a variable's data array
    pub fn variable_data(&self, name: &str) -> Option<&Array<f32, IxDyn>> {
        self.data.get(name)
    }

    /// Get a variable's data array with error handling
    pub fn variable_data_checked(&self, name: &str) -> Result<&Array<f32, IxDyn>> {
        self.data.get(name).ok_or_else(|| TaprootError::DataNotFound {
            message: format!("Variable not found: {}", name),
        })
    }

    /// Get coordinate values for a dimension
    pub fn coordinate(&self, name: &str) -> Option<&Vec<f64>> {
        self.metadata.coordinates.get(name)
    }

    /// Get coordinate values for a dimension with error handling
    pub fn coordinate_checked(&self, name: &str) -> Result<&Vec<f64>> {
        self.metadata.coordinates.get(name).ok_or_else(|| TaprootError::DataNotFound {
            message: format!("Coordinate not found: {}", name),
        })
    }

    /// Get variable metadata with error handling
    pub fn variable_metadata_checked(&self, name: &str) -> Result<&Variable> {
        self.metadata.variables.get(name).ok_or_else(|| TaprootError::DataNotFound {
            message: format!("Variable metadata not found: {}", name),
        })
    }

    /// Check if a variable exists
    pub fn has_variable(&self, name: &str) -> bool {
        self.metadata.variables.contains_key(name)
    }

    /// Names of the data variables, excluding coordinate variables,
    /// sorted for a stable menu order.
    pub fn data_variable_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .metadata
            .variables
            .keys()
            .filter(|name| !self.metadata.dimensions.contains_key(*name))
            .cloned()
            .collect();
        names.sort();
        names
    }

    /// Find the index whose coordinate value minimizes the absolute
    /// difference to `value`, per axis independently.
    ///
    /// Values outside the coordinate range resolve to the nearest edge
    /// index; there is no extrapolation and no out-of-range failure.
    pub fn nearest_coordinate_index(&self, dim_name: &str, value: f64) -> Result<usize> {
        let coords = self.coordinate_checked(dim_name)?;

        if coords.is_empty() {
            return Err(TaprootError::DataNotFound {
                message: format!("Coordinate {} is empty", dim_name),
            });
        }

        let mut closest_idx = 0;
        let mut min_diff = f64::MAX;

        for (i, &coord) in coords.iter().enumerate() {
            let diff = (coord - value).abs();
            if diff < min_diff {
                min_diff = diff;
                closest_idx = i;
            }
        }

        Ok(closest_idx)
    }

    /// Validate that the dataset is consistent and ready for use
    pub fn validate(&self) -> Result<()> {
        if self.metadata.variables.is_empty() {
            return Err(TaprootError::DataNotFound {
                message: "No variables found in the dataset".to_string(),
            });
        }

        for (var_name, var) in &self.metadata.variables {
            for dim_name in &var.dimensions {
                if !self.metadata.dimensions.contains_key(dim_name) {
                    return Err(TaprootError::DataNotFound {
                        message: format!(
                            "Variable {} references non-existent dimension {}",
                            var_name, dim_name
                        ),
                    });
                }
            }
        }

        for (var_name, var) in &self.metadata.variables {
            if let Some(data) = self.data.get(var_name) {
                let shape = data.shape();
                if shape.len() != var.shape.len() {
                    return Err(TaprootError::DataNotFound {
                        message: format!(
                            "Variable {} has inconsistent dimensions between metadata ({:?}) and data ({:?})",
                            var_name, var.shape, shape
                        ),
                    });
                }

                for (i, &dim_size) in var.shape.iter().enumerate() {
                    if shape[i] != dim_size {
                        return Err(TaprootError::DataNotFound {
                            message: format!(
                                "Variable {} has inconsistent dimension size at index {}: metadata={}, data={}",
                                var_name, i, dim_size, shape[i]
                            ),
                        });
                    }
                }
            }
        }

        Ok(())
    }
}
