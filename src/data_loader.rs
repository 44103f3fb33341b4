//! NetCDF data loading functionality.
//!
//! This module handles reading NetCDF files and loading them into memory.
//! It converts NetCDF variables and metadata into the [`GridDataset`]
//! representation used by the point-extraction pipeline.

use ndarray::{Array, Dim, IxDyn};
use netcdf::{self, Attribute, Variable as NetCDFVariable};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::error::{Result, TaprootError};
use crate::state::{AttributeValue, Dimension, GridDataset, Metadata, Variable};

/// Load a NetCDF file into memory as a validated [`GridDataset`]
pub fn load_grid(path: &Path) -> Result<GridDataset> {
    if !path.exists() {
        return Err(TaprootError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("File not found: {}", path.display()),
        )));
    }

    let file = netcdf::open(path)?;

    info!("Opened NetCDF file: {}", path.display());
    debug!("File has {} variables", file.variables().count());
    debug!("File has {} dimensions", file.dimensions().count());

    let metadata = extract_metadata(&file)?;
    let data = extract_data(&file, &metadata)?;

    let dataset = GridDataset::new(metadata, data);
    validate_grid_data(&dataset)?;

    Ok(dataset)
}

/// Extract metadata from the NetCDF file
fn extract_metadata(file: &netcdf::File) -> Result<Metadata> {
    let mut global_attributes = HashMap::new();
    for attr in file.attributes() {
        let value = convert_attribute(&attr)?;
        global_attributes.insert(attr.name().to_string(), value);
    }

    let mut dimensions = HashMap::new();
    for dim in file.dimensions() {
        let dimension = Dimension {
            name: dim.name().to_string(),
            size: dim.len(),
            is_unlimited: dim.is_unlimited(),
        };
        dimensions.insert(dim.name().to_string(), dimension);
    }

    let mut variables = HashMap::new();
    let mut coordinates = HashMap::new();

    for var in file.variables() {
        // Skip variables we can't handle (non-numeric types)
        if !is_supported_variable(&var) {
            warn!("Skipping unsupported variable: {}", var.name());
            continue;
        }

        let var_dims: Vec<String> = var
            .dimensions()
            .iter()
            .map(|dim| dim.name().to_string())
            .collect();

        let var_shape: Vec<usize> = var_dims
            .iter()
            .map(|name| file.dimension(name).unwrap().len())
            .collect();

        let mut var_attrs = HashMap::new();
        for attr in var.attributes() {
            let value = convert_attribute(&attr)?;
            var_attrs.insert(attr.name().to_string(), value);
        }

        let variable = Variable {
            name: var.name().to_string(),
            dimensions: var_dims,
            shape: var_shape,
            attributes: var_attrs,
            dtype: format!("{:?}", var.vartype()),
        };

        variables.insert(var.name().to_string(), variable);

        // A variable whose name matches a dimension is that dimension's
        // coordinate array.
        if file.dimension(&var.name()).is_some() {
            let coord_values = extract_coordinate_values(&var)?;
            coordinates.insert(var.name().to_string(), coord_values);
        }
    }

    // Dimensions without a coordinate variable get 0-based index coordinates.
    for dim_name in dimensions.keys() {
        if !coordinates.contains_key(dim_name) {
            let dim_size = dimensions[dim_name].size;
            let coord_values: Vec<f64> = (0..dim_size).map(|i| i as f64).collect();
            coordinates.insert(dim_name.to_string(), coord_values);

            warn!("Created default coordinates for dimension: {}", dim_name);
        }
    }

    Ok(Metadata {
        global_attributes,
        dimensions,
        variables,
        coordinates,
    })
}

/// Check if a variable has a supported type that we can work with
fn is_supported_variable(var: &NetCDFVariable) -> bool {
    use netcdf::types::{BasicType, VariableType};

    matches!(
        var.vartype(),
        VariableType::Basic(BasicType::Byte)
            | VariableType::Basic(BasicType::Char)
            | VariableType::Basic(BasicType::Short)
            | VariableType::Basic(BasicType::Int)
            | VariableType::Basic(BasicType::Float)
            | VariableType::Basic(BasicType::Double)
    )
}

/// Convert a NetCDF attribute to our AttributeValue enum
fn convert_attribute(attr: &Attribute) -> Result<AttributeValue> {
    use netcdf::AttributeValue as NcAttributeValue;

    let value = attr.value()?;

    match value {
        NcAttributeValue::Str(s) => Ok(AttributeValue::Text(s)),

        // Numeric types - store as f64 for simplicity
        NcAttributeValue::Uchar(v) => Ok(AttributeValue::Number(v as f64)),
        NcAttributeValue::Schar(v) => Ok(AttributeValue::Number(v as f64)),
        NcAttributeValue::Short(v) => Ok(AttributeValue::Number(v as f64)),
        NcAttributeValue::Int(v) => Ok(AttributeValue::Number(v as f64)),
        NcAttributeValue::Float(v) => Ok(AttributeValue::Number(v as f64)),
        NcAttributeValue::Double(v) => Ok(AttributeValue::Number(v)),

        _ => Ok(AttributeValue::Text(format!("{:?}", value))),
    }
}

/// Extract coordinate values from a coordinate variable
fn extract_coordinate_values(var: &NetCDFVariable) -> Result<Vec<f64>> {
    use netcdf::types::{BasicType, VariableType};

    match var.vartype() {
        VariableType::Basic(BasicType::Byte) => {
            let values: Vec<i8> = var.get_values::<i8, _>(&[] as &[netcdf::Extent])?;
            Ok(values.into_iter().map(|v| v as f64).collect())
        }
        VariableType::Basic(BasicType::Short) => {
            let values: Vec<i16> = var.get_values::<i16, _>(&[] as &[netcdf::Extent])?;
            Ok(values.into_iter().map(|v| v as f64).collect())
        }
        VariableType::Basic(BasicType::Int) => {
            let values: Vec<i32> = var.get_values::<i32, _>(&[] as &[netcdf::Extent])?;
            Ok(values.into_iter().map(|v| v as f64).collect())
        }
        VariableType::Basic(BasicType::Float) => {
            let values: Vec<f32> = var.get_values::<f32, _>(&[] as &[netcdf::Extent])?;
            Ok(values.into_iter().map(|v| v as f64).collect())
        }
        VariableType::Basic(BasicType::Double) => {
            let values: Vec<f64> = var.get_values::<f64, _>(&[] as &[netcdf::Extent])?;
            Ok(values)
        }
        _ => {
            let indices: Vec<f64> = (0..var.dimensions()[0].len()).map(|i| i as f64).collect();
            warn!(
                "Unsupported coordinate variable type: {:?}, using indices instead",
                var.vartype()
            );
            Ok(indices)
        }
    }
}

/// Extract data from the NetCDF variables
fn extract_data(
    file: &netcdf::File,
    metadata: &Metadata,
) -> Result<HashMap<String, Array<f32, IxDyn>>> {
    let mut data = HashMap::new();

    for var_name in metadata.variables.keys() {
        if let Some(var) = file.variable(var_name) {
            if !is_supported_variable(&var) {
                continue;
            }

            let shape = &metadata.variables[var_name].shape;
            let array = convert_variable_to_array(&var, shape)?;
            data.insert(var_name.clone(), array);
        }
    }

    Ok(data)
}

/// Convert a NetCDF variable to an ndarray Array<f32, IxDyn>
fn convert_variable_to_array(var: &NetCDFVariable, shape: &[usize]) -> Result<Array<f32, IxDyn>> {
    use netcdf::types::{BasicType, VariableType};

    let dim = Dim(shape.to_vec());

    match var.vartype() {
        VariableType::Basic(BasicType::Byte) => {
            let data: Vec<i8> = var.get_values::<i8, _>(&[] as &[netcdf::Extent])?;
            let array = Array::from_shape_vec(dim, data.into_iter().map(|v| v as f32).collect())?;
            Ok(array)
        }
        VariableType::Basic(BasicType::Short) => {
            let data: Vec<i16> = var.get_values::<i16, _>(&[] as &[netcdf::Extent])?;
            let array = Array::from_shape_vec(dim, data.into_iter().map(|v| v as f32).collect())?;
            Ok(array)
        }
        VariableType::Basic(BasicType::Int) => {
            let data: Vec<i32> = var.get_values::<i32, _>(&[] as &[netcdf::Extent])?;
            let array = Array::from_shape_vec(dim, data.into_iter().map(|v| v as f32).collect())?;
            Ok(array)
        }
        VariableType::Basic(BasicType::Float) => {
            let data: Vec<f32> = var.get_values::<f32, _>(&[] as &[netcdf::Extent])?;
            let array = Array::from_shape_vec(dim, data)?;
            Ok(array)
        }
        VariableType::Basic(BasicType::Double) => {
            let data: Vec<f64> = var.get_values::<f64, _>(&[] as &[netcdf::Extent])?;
            let array = Array::from_shape_vec(dim, data.into_iter().map(|v| v as f32).collect())?;
            Ok(array)
        }
        _ => Err(TaprootError::DataNotFound {
            message: format!("Unsupported variable type: {:?}", var.vartype()),
        }),
    }
}

/// Validate the loaded data for consistency
fn validate_grid_data(dataset: &GridDataset) -> Result<()> {
    dataset.validate()?;

    // Every variable must have a backing array.
    for var_name in dataset.metadata.variables.keys() {
        if !dataset.data.contains_key(var_name) {
            return Err(TaprootError::DataNotFound {
                message: format!("Data array for variable {} not found", var_name),
            });
        }
    }

    // Every dimension must have coordinates.
    for dim_name in dataset.metadata.dimensions.keys() {
        if !dataset.metadata.coordinates.contains_key(dim_name) {
            return Err(TaprootError::DataNotFound {
                message: format!("Coordinate values for dimension {} not found", dim_name),
            });
        }
    }

    Ok(())
}

/// Create a test NetCDF file with sample data for testing
#[cfg(test)]
fn create_test_netcdf_file(path: &Path) -> Result<()> {
    let mut file = netcdf::create(path)?;

    file.add_dimension("lon", 4)?;
    file.add_dimension("lat", 3)?;
    file.add_unlimited_dimension("time")?;

    file.add_attribute("title", "Taproot Test File")?;
    file.add_attribute("source", "test")?;

    {
        let mut lon_var = file.add_variable::<f64>("lon", &["lon"])?;
        lon_var.put_attribute("units", "degrees_east")?;
        lon_var.put_values(&[0.0, 1.0, 2.0, 3.0], &[..])?;
    }

    {
        let mut lat_var = file.add_variable::<f64>("lat", &["lat"])?;
        lat_var.put_attribute("units", "degrees_north")?;
        lat_var.put_values(&[0.0, 1.0, 2.0], &[..])?;
    }

    {
        let mut time_var = file.add_variable::<f64>("time", &["time"])?;
        time_var.put_attribute("units", "days since 2000-01-01")?;
        time_var.put_values(&[0.0, 1.0], &[..])?;
    }

    {
        let mut temp_var = file.add_variable::<f32>("soil_temp", &["time", "lat", "lon"])?;
        temp_var.put_attribute("units", "K")?;
        temp_var.put_attribute("long_name", "Soil temperature")?;

        // 2 time steps x 3 lat x 4 lon = 24 values
        let temp_data: Vec<f32> = (0..24).map(|i| i as f32).collect();
        temp_var.put_values(&temp_data, &[.., .., ..])?;
    }

    Ok(())
}
