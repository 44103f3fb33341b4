//! Test data generation utilities.
//!
//! Generates small CSV and NetCDF fixtures with known data patterns for
//! exercising the pipelines end to end.

use std::path::Path;

/// A seed-collection CSV exercising the cleaning rules: duplicate Oak rows
/// on one date, a single-observation Maple, and a Pine series.
pub fn write_seed_csv(path: &Path) -> std::io::Result<()> {
    let contents = "\
species,date_collected,Available lb
Oak,2010-01-01,10
Oak,2010-01-01,5
Oak,2012-01-01,20
Maple,2010-01-01,7
Pine,2010-01-01,4
Pine,2011-01-01,6
Pine,2012-01-01,8
";
    std::fs::write(path, contents)
}

/// A CSV whose Pine amounts lie exactly on `amount = 2 * years + 3`,
/// measured from the 2010-01-01 epoch.
pub fn write_linear_csv(path: &Path, slope: f64, intercept: f64) -> std::io::Result<()> {
    let epoch = chrono::NaiveDate::from_ymd_opt(2010, 1, 1).unwrap();
    let mut contents = String::from("species,date_collected,Available lb\n");
    for year in 2010..=2016 {
        let date = chrono::NaiveDate::from_ymd_opt(year, 1, 1).unwrap();
        let years = (date - epoch).num_days() as f64 / 365.25;
        let amount = slope * years + intercept;
        contents.push_str(&format!("Pine,{},{:.12}\n", date.format("%Y-%m-%d"), amount));
    }
    std::fs::write(path, contents)
}

/// Creates a NetCDF file matching the documented extraction example:
/// `lat=[10,20,30]`, `lon=[100,110]`, and a `soil_temp` variable over
/// (time, lat, lon) whose first time step is `[[1,2],[3,4],[5,6]]` and
/// second is the same plus 10.
#[cfg(feature = "netcdf")]
pub fn create_point_grid_nc(path: &Path) -> Result<(), netcdf::Error> {
    let mut file = netcdf::create(path)?;

    file.add_dimension("lat", 3)?;
    file.add_dimension("lon", 2)?;
    file.add_unlimited_dimension("time")?;

    file.add_attribute("title", "Point grid fixture")?;

    {
        let mut lat_var = file.add_variable::<f64>("lat", &["lat"])?;
        lat_var.put_attribute("units", "degrees_north")?;
        lat_var.put_values(&[10.0, 20.0, 30.0], &[..])?;
    }

    {
        let mut lon_var = file.add_variable::<f64>("lon", &["lon"])?;
        lon_var.put_attribute("units", "degrees_east")?;
        lon_var.put_values(&[100.0, 110.0], &[..])?;
    }

    {
        let mut time_var = file.add_variable::<f64>("time", &["time"])?;
        time_var.put_attribute("units", "days since 2000-01-01")?;
        time_var.put_values(&[0.0, 1.0], &[..])?;
    }

    {
        let mut temp_var = file.add_variable::<f32>("soil_temp", &["time", "lat", "lon"])?;
        temp_var.put_attribute("units", "K")?;

        let base: Vec<f32> = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let mut values = base.clone();
        values.extend(base.iter().map(|v| v + 10.0));
        temp_var.put_values(&values, &[.., .., ..])?;
    }

    Ok(())
}
