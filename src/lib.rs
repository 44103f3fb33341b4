//! # taproot
//!
//! Point-sampling and trend analysis for environmental observation data.
//!
//! This library provides two independent pipelines over in-memory data:
//!
//! - **Grid point extraction**: load a NetCDF file, resolve a requested
//!   (latitude, longitude) to the nearest grid cell per axis, and return
//!   the variable's values at that cell across the remaining dimensions.
//! - **Category trend fitting**: load tabular seed-collection records (or
//!   generate deterministic demonstration data), reshape them into a
//!   (date x category) cube, and fit an independent linear trend per
//!   category.
//!
//! Both pipelines end in plot-ready data structures; rendering is left to
//! an external collaborator.
//!
//! ## Architecture
//!
//! - **Data layer**: NetCDF and CSV loading into dense in-memory arrays
//! - **Extraction**: nearest-cell sampling and multi-point comparison
//! - **Analysis**: per-category least-squares trend fitting
//! - **Surface**: pure session/menu logic; I/O stays in the binaries

pub mod config;
#[cfg(feature = "netcdf")]
pub mod data_loader;
pub mod error;
pub mod extract;
pub mod logging;
pub mod plot;
pub mod session;
pub mod state;
pub mod tabular;
pub mod trend;

pub use config::Config;
pub use error::{Result, TaprootError};
pub use logging::{init_tracing, log_data_load_stats, log_error, log_timed_operation};
pub use state::{AttributeValue, Dimension, GridDataset, Metadata, Variable};
