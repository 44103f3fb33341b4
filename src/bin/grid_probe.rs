//! grid_probe - sample a gridded dataset at point locations
//!
//! Loads a NetCDF file, prints its structure, resolves a data variable
//! (from a flag or an interactive menu), samples it at the requested
//! (lat, lon) points, and optionally writes the lat/lon-plane heatmap
//! payload as JSON for an external renderer.

use anyhow::{bail, Context};
use clap::Parser;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing::info;

use taproot::extract::{GridProbe, PointSample};
use taproot::plot;
use taproot::session::{self, VariableChoice};
use taproot::GridDataset;

#[derive(Parser, Debug)]
#[command(name = "grid_probe")]
#[command(author, version, about = "Sample a gridded dataset at point locations", long_about = None)]
struct Args {
    /// Path to the NetCDF file
    netcdf_file: PathBuf,

    /// Variable to sample; chosen interactively when omitted
    #[arg(long)]
    var: Option<String>,

    /// Point to compare, as lat,lon (repeatable)
    #[arg(long = "point", value_name = "LAT,LON")]
    points: Vec<String>,

    /// Write the lat/lon heatmap payload as JSON to this path
    #[arg(long)]
    heatmap_out: Option<PathBuf>,

    /// Write the file metadata as JSON to this path
    #[arg(long)]
    metadata_out: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "TAPROOT_LOG_LEVEL", default_value = "info")]
    log_level: String,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    taproot::init_tracing(&args.log_level);

    let points = args
        .points
        .iter()
        .map(|text| parse_point(text))
        .collect::<anyhow::Result<Vec<_>>>()?;

    let mut probe = GridProbe::new(&args.netcdf_file);
    probe
        .load()
        .with_context(|| format!("loading {}", args.netcdf_file.display()))?;

    let dataset = probe.dataset()?;
    print_structure(dataset);

    let var_names = dataset.data_variable_names();
    let dim_details = dataset
        .metadata
        .dimensions
        .values()
        .map(|d| format!("{}={}", d.name, d.size))
        .collect::<Vec<_>>()
        .join(", ");
    taproot::log_data_load_stats(
        &args.netcdf_file.display().to_string(),
        var_names.len(),
        &var_names.iter().map(String::as_str).collect::<Vec<_>>(),
        dataset.metadata.dimensions.len(),
        &dim_details,
    );

    if let Some(path) = &args.metadata_out {
        let json = serde_json::to_string_pretty(&dataset.metadata)?;
        std::fs::write(path, json)
            .with_context(|| format!("writing metadata to {}", path.display()))?;
        println!("Wrote metadata to {}", path.display());
    }

    let variable = match args.var {
        Some(name) => name,
        None => match choose_variable(&var_names)? {
            Some(name) => name,
            None => {
                println!("Goodbye");
                return Ok(());
            }
        },
    };

    if points.is_empty() {
        info!("No points supplied; skipping comparison");
    } else {
        match probe.compare_points(&points, &variable) {
            Some(samples) => print_comparison(&variable, &samples),
            None => println!("Comparison returned no results; see warnings above."),
        }
    }

    if let Some(path) = &args.heatmap_out {
        let payload = plot::heatmap(dataset, &variable)?;
        let json = serde_json::to_string_pretty(&payload)?;
        std::fs::write(path, json)
            .with_context(|| format!("writing heatmap payload to {}", path.display()))?;
        println!("Wrote heatmap payload to {}", path.display());
    }

    Ok(())
}

fn parse_point(text: &str) -> anyhow::Result<(f64, f64)> {
    let Some((lat, lon)) = text.split_once(',') else {
        bail!("Point '{}' is not in lat,lon form", text);
    };
    let lat: f64 = lat
        .trim()
        .parse()
        .with_context(|| format!("latitude in '{}'", text))?;
    let lon: f64 = lon
        .trim()
        .parse()
        .with_context(|| format!("longitude in '{}'", text))?;
    Ok((lat, lon))
}

fn print_structure(dataset: &GridDataset) {
    println!("\nDimensions:");
    let mut dims: Vec<_> = dataset.metadata.dimensions.values().collect();
    dims.sort_by(|a, b| a.name.cmp(&b.name));
    for dim in dims {
        println!(
            "  {} = {} {}",
            dim.name,
            dim.size,
            if dim.is_unlimited { "(unlimited)" } else { "" }
        );
    }

    println!("\nVariables:");
    let mut vars: Vec<_> = dataset.metadata.variables.values().collect();
    vars.sort_by(|a, b| a.name.cmp(&b.name));
    for var in vars {
        println!(
            "  {} ({}) [{}]",
            var.name,
            var.dtype,
            var.dimensions.join(", ")
        );
    }
    println!();
}

/// Interactive variable menu; `None` means the user quit.
fn choose_variable(var_names: &[String]) -> anyhow::Result<Option<String>> {
    if var_names.is_empty() {
        bail!("The file has no data variables to sample");
    }

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        for (i, name) in var_names.iter().enumerate() {
            println!("{}.  {}", i + 1, name);
        }
        println!("\n(x)  Quit\n");

        print!("Enter the number associated with the variable you choose: ");
        io::stdout().flush().context("flushing prompt")?;

        let Some(line) = lines.next() else {
            return Ok(None);
        };
        let input = line.context("reading input")?;

        match session::parse_variable_choice(&input, var_names.len()) {
            Ok(VariableChoice::Variable(index)) => return Ok(Some(var_names[index].clone())),
            Ok(VariableChoice::Quit) => return Ok(None),
            Err(e) => println!("{}", e),
        }
    }
}

fn print_comparison(variable: &str, samples: &[PointSample]) {
    println!("\n{:>10} {:>10}  {}", "latitude", "longitude", variable);
    for sample in samples {
        let rendered = sample
            .values_flat()
            .iter()
            .map(|v| format!("{:.3}", v))
            .collect::<Vec<_>>()
            .join(", ");
        println!("{:>10.3} {:>10.3}  [{}]", sample.lat, sample.lon, rendered);
    }
}
