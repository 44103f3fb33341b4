//! CSV loading and cleaning for seed-collection records.
//!
//! The cleaner enforces the trend-fitting preconditions: required fields
//! present, dates coerced to `NaiveDate`, rows with missing values dropped,
//! categories with a single observation excluded entirely, and duplicate
//! (date, category) rows aggregated by summing.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info};

use super::model::SeedRecord;
use crate::error::{Result, TaprootError};

/// Date formats accepted when coercing the date column, tried in order.
const DATE_FORMATS: [&str; 2] = ["%d-%b-%y", "%Y-%m-%d"];

/// Which header names carry the required fields.
///
/// The date column may be left unset, in which case the first header whose
/// lowercase form contains `date` is used.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnSpec {
    /// Category (species) column header
    #[serde(default = "default_category_column")]
    pub category: String,
    /// Amount column header
    #[serde(default = "default_amount_column")]
    pub amount: String,
    /// Date column header; located by substring match on "date" when unset
    #[serde(default)]
    pub date: Option<String>,
}

impl Default for ColumnSpec {
    fn default() -> Self {
        Self {
            category: default_category_column(),
            amount: default_amount_column(),
            date: None,
        }
    }
}

pub(crate) fn default_category_column() -> String {
    "species".to_string()
}

pub(crate) fn default_amount_column() -> String {
    "Available lb".to_string()
}

/// Read raw records from a CSV file.
///
/// Rows with an empty required field are dropped. A missing required
/// column is a recoverable [`TaprootError::SchemaMissing`], not a process
/// exit; a row whose date or amount cannot be interpreted is a
/// [`TaprootError::Record`] naming the row.
pub fn load_records(path: &Path, columns: &ColumnSpec) -> Result<Vec<SeedRecord>> {
    let mut reader = csv::Reader::from_path(path)?;
    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();

    let (category_idx, date_idx, amount_idx) = resolve_columns(&headers, columns)?;
    debug!(
        category = %headers[category_idx],
        date = %headers[date_idx],
        amount = %headers[amount_idx],
        "Resolved record columns"
    );

    let mut records = Vec::new();
    let mut dropped = 0usize;

    for (row_no, result) in reader.records().enumerate() {
        let row = result?;

        let category = row.get(category_idx).unwrap_or("").trim();
        let date_text = row.get(date_idx).unwrap_or("").trim();
        let amount_text = row.get(amount_idx).unwrap_or("").trim();

        if category.is_empty() || date_text.is_empty() || amount_text.is_empty() {
            dropped += 1;
            continue;
        }

        let date = parse_date(date_text).ok_or_else(|| TaprootError::Record {
            row: row_no + 1,
            message: format!("Unrecognized date: {}", date_text),
        })?;

        let amount: f64 = amount_text.parse().map_err(|_| TaprootError::Record {
            row: row_no + 1,
            message: format!("Amount is not numeric: {}", amount_text),
        })?;

        records.push(SeedRecord::new(category, date, amount));
    }

    if dropped > 0 {
        info!(dropped, "Dropped rows with missing required values");
    }

    Ok(records)
}

/// Load and clean in one step.
pub fn load_cleaned(path: &Path, columns: &ColumnSpec) -> Result<Vec<SeedRecord>> {
    Ok(clean_records(load_records(path, columns)?))
}

/// Apply the trend-fitting preconditions to raw records:
/// categories with a single observation are excluded entirely, then
/// duplicate (date, category) rows are summed.
pub fn clean_records(records: Vec<SeedRecord>) -> Vec<SeedRecord> {
    let mut observation_counts: BTreeMap<String, usize> = BTreeMap::new();
    for record in &records {
        *observation_counts.entry(record.category.clone()).or_default() += 1;
    }

    let singletons: Vec<&str> = observation_counts
        .iter()
        .filter(|(_, &count)| count <= 1)
        .map(|(category, _)| category.as_str())
        .collect();
    if !singletons.is_empty() {
        info!(
            categories = %singletons.join(", "),
            "Excluding single-observation categories"
        );
    }

    let mut aggregated: BTreeMap<(NaiveDate, String), f64> = BTreeMap::new();
    for record in records {
        if observation_counts[&record.category] <= 1 {
            continue;
        }
        *aggregated
            .entry((record.date, record.category))
            .or_default() += record.amount;
    }

    aggregated
        .into_iter()
        .map(|((date, category), amount)| SeedRecord::new(category, date, amount))
        .collect()
}

/// Resolve header positions for the required columns.
fn resolve_columns(headers: &[String], columns: &ColumnSpec) -> Result<(usize, usize, usize)> {
    let category_idx = position(headers, &columns.category)?;
    let amount_idx = position(headers, &columns.amount)?;

    let date_idx = match &columns.date {
        Some(name) => position(headers, name)?,
        None => headers
            .iter()
            .position(|h| h.to_lowercase().contains("date"))
            .ok_or_else(|| TaprootError::SchemaMissing {
                message: format!(
                    "No date column found (no header contains 'date'): {}",
                    headers.join(", ")
                ),
            })?,
    };

    Ok((category_idx, date_idx, amount_idx))
}

fn position(headers: &[String], name: &str) -> Result<usize> {
    headers
        .iter()
        .position(|h| h == name)
        .ok_or_else(|| TaprootError::SchemaMissing {
            message: format!("Required column '{}' not found in: {}", name, headers.join(", ")),
        })
}

fn parse_date(text: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn csv_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_and_clean_aggregates_and_drops_singletons() {
        let file = csv_file(
            "species,date_collected,Available lb\n\
             Oak,2010-01-01,10\n\
             Oak,2010-01-01,5\n\
             Maple,2010-01-01,7\n",
        );

        let cleaned = load_cleaned(file.path(), &ColumnSpec::default()).unwrap();

        // Oak's duplicate rows sum to one row; single-observation Maple is gone.
        assert_eq!(
            cleaned,
            vec![SeedRecord::new("Oak", date("2010-01-01"), 15.0)]
        );
    }

    #[test]
    fn test_date_column_found_by_substring() {
        let file = csv_file(
            "species,Collection Date,Available lb\n\
             Oak,14-Apr-25,10\n\
             Oak,15-Apr-25,5\n",
        );

        let records = load_records(file.path(), &ColumnSpec::default()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].date, date("2025-04-14"));
    }

    #[test]
    fn test_missing_required_column_is_recoverable() {
        let file = csv_file("species,date_collected\nOak,2010-01-01\n");
        let result = load_records(file.path(), &ColumnSpec::default());
        assert!(matches!(result, Err(TaprootError::SchemaMissing { .. })));

        let file = csv_file("name,when,Available lb\nOak,2010-01-01,10\n");
        let result = load_records(file.path(), &ColumnSpec::default());
        assert!(matches!(result, Err(TaprootError::SchemaMissing { .. })));
    }

    #[test]
    fn test_rows_with_missing_values_are_dropped() {
        let file = csv_file(
            "species,date_collected,Available lb\n\
             Oak,2010-01-01,10\n\
             ,2010-06-01,3\n\
             Oak,,4\n\
             Oak,2011-01-01,\n\
             Oak,2012-01-01,8\n",
        );

        let records = load_records(file.path(), &ColumnSpec::default()).unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_unparseable_date_names_the_row() {
        let file = csv_file(
            "species,date_collected,Available lb\n\
             Oak,not-a-date,10\n",
        );

        match load_records(file.path(), &ColumnSpec::default()) {
            Err(TaprootError::Record { row, .. }) => assert_eq!(row, 1),
            other => panic!("Expected Record error, got {:?}", other),
        }
    }

    #[test]
    fn test_explicit_date_column() {
        let file = csv_file(
            "species,noted_on,Available lb\n\
             Oak,2010-01-01,10\n",
        );

        let spec = ColumnSpec {
            date: Some("noted_on".to_string()),
            ..ColumnSpec::default()
        };
        let records = load_records(file.path(), &spec).unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_clean_keeps_multi_observation_categories() {
        let records = vec![
            SeedRecord::new("Oak", date("2010-01-01"), 1.0),
            SeedRecord::new("Oak", date("2011-01-01"), 2.0),
            SeedRecord::new("Pine", date("2010-01-01"), 3.0),
        ];

        let cleaned = clean_records(records);
        assert_eq!(cleaned.len(), 2);
        assert!(cleaned.iter().all(|r| r.category == "Oak"));
    }
}
