//! taproot - interactive seed-collection trend analysis
//!
//! Loads seed-collection records from a CSV (or generates demonstration
//! data), reshapes them into a category cube, and serves a small menu for
//! printing the raw cube and fitting per-category trends. All data logic
//! is pure library code; this binary only reads lines and prints.

use anyhow::Context;
use std::collections::BTreeMap;
use std::io::{self, BufRead, Write};
use std::path::Path;
use tracing::info;

use taproot::config::Config;
use taproot::plot::trend_plot;
use taproot::session::{self, MainMenuChoice, PlotMenuChoice, SeedSession};
use taproot::tabular::{self, CategoryCube};
use taproot::trend::TrendResult;

fn main() -> anyhow::Result<()> {
    let (config, csv_path) = Config::load().context("loading configuration")?;
    config.validate().context("validating configuration")?;

    taproot::init_tracing(&config.log_level);

    info!("Starting taproot v{}", env!("CARGO_PKG_VERSION"));

    let records = match &csv_path {
        Some(path) => taproot::log_timed_operation("load_records", || {
            tabular::load_cleaned(path, &config.columns)
        })
        .with_context(|| format!("loading records from {}", path.display()))?,
        None => {
            info!("No record source supplied; generating demonstration data");
            tabular::synthetic::demo_records(config.synthetic.seed)
        }
    };

    let cube = CategoryCube::from_records(&records);
    info!(
        dates = cube.dates.len(),
        categories = cube.categories.len(),
        "Built category cube"
    );

    let session = SeedSession::new(cube, config.trend.epoch);

    println!("\ntaproot - seed collection trend analysis\n");

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        println!("\nPlease choose from the following options:");
        println!("  1. Print raw data");
        println!("  2. Plot collection over time");
        println!("  3. Quit");

        let Some(input) = read_line("Select option 1 - 3: ", &mut lines)? else {
            break;
        };

        let choice = match session::parse_main_choice(&input) {
            Ok(choice) => choice,
            Err(e) => {
                println!("{}", e);
                continue;
            }
        };

        match choice {
            MainMenuChoice::PrintRaw => println!("\n{}", session.cube),
            MainMenuChoice::Plot => run_plot_menu(&session, &config, &mut lines)?,
            MainMenuChoice::Quit => break,
        }
    }

    println!("Goodbye");
    Ok(())
}

/// The plot submenu: all categories, or a single validated selection.
fn run_plot_menu(
    session: &SeedSession,
    config: &Config,
    lines: &mut impl Iterator<Item = io::Result<String>>,
) -> anyhow::Result<()> {
    println!("\n  1. All species");
    println!("  2. Display one species");

    let Some(input) = read_line("Enter 1 or 2: ", lines)? else {
        return Ok(());
    };

    let choice = match session::parse_plot_choice(&input) {
        Ok(choice) => choice,
        Err(e) => {
            println!("{}", e);
            return Ok(());
        }
    };

    let trends = match choice {
        PlotMenuChoice::AllCategories => session.trends_all(),
        PlotMenuChoice::OneCategory => {
            let categories = session.categories();
            for (i, category) in categories.iter().enumerate() {
                println!("{}. {}", i + 1, category);
            }

            // Re-prompt until the selection is in range.
            loop {
                let Some(input) = read_line("Enter the species number: ", lines)? else {
                    return Ok(());
                };
                match session::parse_category_choice(&input, categories.len()) {
                    Ok(index) => break session.trends_for(index)?,
                    Err(e) => println!("{}", e),
                }
            }
        }
    };

    if trends.is_empty() {
        println!("No categories could be fitted.");
        return Ok(());
    }

    print_trend_table(&trends);

    if let Some(path) = &config.plot_out {
        write_plot_payload(&trends, session, path)?;
    }

    Ok(())
}

fn print_trend_table(trends: &BTreeMap<String, TrendResult>) {
    println!("\n{:<12} {:>14} {:>14}", "species", "slope (lb/yr)", "intercept (lb)");
    for (category, trend) in trends {
        println!(
            "{:<12} {:>14.3} {:>14.3}",
            category, trend.slope, trend.intercept
        );
    }
}

fn write_plot_payload(
    trends: &BTreeMap<String, TrendResult>,
    session: &SeedSession,
    path: &Path,
) -> anyhow::Result<()> {
    let payload = trend_plot(trends, session.epoch);
    let json = serde_json::to_string_pretty(&payload)?;
    std::fs::write(path, json)
        .with_context(|| format!("writing plot payload to {}", path.display()))?;
    println!("Wrote plot payload to {}", path.display());
    Ok(())
}

/// Prompt and read one line; `None` on end of input.
fn read_line(
    prompt: &str,
    lines: &mut impl Iterator<Item = io::Result<String>>,
) -> anyhow::Result<Option<String>> {
    print!("{}", prompt);
    io::stdout().flush().context("flushing prompt")?;

    match lines.next() {
        Some(line) => Ok(Some(line.context("reading input")?)),
        None => Ok(None),
    }
}
