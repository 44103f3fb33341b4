//! Interactive session state and menu parsing.
//!
//! All parsing and selection validation lives here as pure functions over
//! an explicit session state; the binaries only read lines and print. An
//! out-of-range selection is a typed error the prompt loop re-prompts on,
//! never a silent fallthrough.

use chrono::NaiveDate;
use std::collections::BTreeMap;

use crate::error::{Result, TaprootError};
use crate::tabular::CategoryCube;
use crate::trend::{fit_trends, TrendResult};

/// Top-level menu choices for the seed-trend app.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MainMenuChoice {
    /// Print the raw cube
    PrintRaw,
    /// Enter the plot submenu
    Plot,
    /// End the session
    Quit,
}

/// Plot submenu choices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlotMenuChoice {
    AllCategories,
    OneCategory,
}

/// Variable-menu choices for the grid tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableChoice {
    /// 0-based index into the variable list
    Variable(usize),
    Quit,
}

/// Parse a top-level menu selection ("1".."3").
pub fn parse_main_choice(input: &str) -> Result<MainMenuChoice> {
    match input.trim() {
        "1" => Ok(MainMenuChoice::PrintRaw),
        "2" => Ok(MainMenuChoice::Plot),
        "3" => Ok(MainMenuChoice::Quit),
        other => Err(TaprootError::InvalidSelection {
            message: format!("Expected 1-3, got '{}'", other),
        }),
    }
}

/// Parse a plot submenu selection ("1" or "2").
pub fn parse_plot_choice(input: &str) -> Result<PlotMenuChoice> {
    match input.trim() {
        "1" => Ok(PlotMenuChoice::AllCategories),
        "2" => Ok(PlotMenuChoice::OneCategory),
        other => Err(TaprootError::InvalidSelection {
            message: format!("Expected 1 or 2, got '{}'", other),
        }),
    }
}

/// Parse a 1-based category selection, validated against the list length.
/// Returns the 0-based index.
pub fn parse_category_choice(input: &str, category_count: usize) -> Result<usize> {
    let trimmed = input.trim();
    let number: usize = trimmed.parse().map_err(|_| TaprootError::InvalidSelection {
        message: format!("Expected a number, got '{}'", trimmed),
    })?;

    if number == 0 || number > category_count {
        return Err(TaprootError::InvalidSelection {
            message: format!(
                "Category number {} is out of range 1-{}",
                number, category_count
            ),
        });
    }

    Ok(number - 1)
}

/// Parse a variable selection: a 1-based number, or `x` to quit.
pub fn parse_variable_choice(input: &str, variable_count: usize) -> Result<VariableChoice> {
    let trimmed = input.trim();
    if trimmed.eq_ignore_ascii_case("x") {
        return Ok(VariableChoice::Quit);
    }

    let number: usize = trimmed.parse().map_err(|_| TaprootError::InvalidSelection {
        message: format!("Expected a number or 'x', got '{}'", trimmed),
    })?;

    if number == 0 || number > variable_count {
        return Err(TaprootError::InvalidSelection {
            message: format!(
                "Variable number {} is out of range 1-{}",
                number, variable_count
            ),
        });
    }

    Ok(VariableChoice::Variable(number - 1))
}

/// The seed-trend session: the loaded cube plus the fitting epoch.
#[derive(Debug, Clone)]
pub struct SeedSession {
    pub cube: CategoryCube,
    pub epoch: NaiveDate,
}

impl SeedSession {
    pub fn new(cube: CategoryCube, epoch: NaiveDate) -> Self {
        Self { cube, epoch }
    }

    /// The category list in menu order
    pub fn categories(&self) -> &[String] {
        &self.cube.categories
    }

    /// Fit every category
    pub fn trends_all(&self) -> BTreeMap<String, TrendResult> {
        fit_trends(&self.cube, self.epoch)
    }

    /// Fit a single category by its 0-based menu index
    pub fn trends_for(&self, index: usize) -> Result<BTreeMap<String, TrendResult>> {
        let category =
            self.cube
                .categories
                .get(index)
                .ok_or_else(|| TaprootError::InvalidSelection {
                    message: format!(
                        "Category index {} is out of range 0-{}",
                        index,
                        self.cube.categories.len().saturating_sub(1)
                    ),
                })?;

        let restricted = self.cube.restricted_to(category)?;
        Ok(fit_trends(&restricted, self.epoch))
    }
}
