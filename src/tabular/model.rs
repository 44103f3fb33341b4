//! Record and cube types for the seed-collection pipeline.

use chrono::NaiveDate;
use ndarray::Array2;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

use crate::error::{Result, TaprootError};

/// One cleaned seed-collection observation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeedRecord {
    /// Species label
    pub category: String,
    /// Collection date
    pub date: NaiveDate,
    /// Collected amount, non-negative by convention
    pub amount: f64,
}

impl SeedRecord {
    pub fn new(category: impl Into<String>, date: NaiveDate, amount: f64) -> Self {
        Self {
            category: category.into(),
            date,
            amount,
        }
    }
}

/// Records reshaped into a (date x category) matrix of aggregated amounts,
/// zero-filled for missing combinations. One independent time series per
/// category, read down a column.
#[derive(Debug, Clone)]
pub struct CategoryCube {
    /// Sorted unique dates (row axis)
    pub dates: Vec<NaiveDate>,
    /// Sorted unique categories (column axis)
    pub categories: Vec<String>,
    /// Aggregated amounts, `[date_index, category_index]`
    pub amounts: Array2<f64>,
}

impl CategoryCube {
    /// Reshape records into the cube. Duplicate (date, category) pairs
    /// accumulate by summing.
    pub fn from_records(records: &[SeedRecord]) -> Self {
        let dates: Vec<NaiveDate> = records
            .iter()
            .map(|r| r.date)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let categories: Vec<String> = records
            .iter()
            .map(|r| r.category.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let mut amounts = Array2::zeros((dates.len(), categories.len()));
        for record in records {
            // Both lookups succeed by construction.
            let row = dates.binary_search(&record.date).unwrap();
            let col = categories.binary_search(&record.category).unwrap();
            amounts[[row, col]] += record.amount;
        }

        Self {
            dates,
            categories,
            amounts,
        }
    }

    /// Number of (date, category) cells
    pub fn len(&self) -> usize {
        self.dates.len() * self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Position of a category in the column axis
    pub fn category_index(&self, category: &str) -> Option<usize> {
        self.categories.iter().position(|c| c == category)
    }

    /// The amount series for one category, in date order
    pub fn series(&self, category: &str) -> Option<Vec<f64>> {
        let col = self.category_index(category)?;
        Some(self.amounts.column(col).to_vec())
    }

    /// A cube restricted to a single category column.
    pub fn restricted_to(&self, category: &str) -> Result<CategoryCube> {
        let col = self
            .category_index(category)
            .ok_or_else(|| TaprootError::DataNotFound {
                message: format!("Category not found: {}", category),
            })?;

        let mut amounts = Array2::zeros((self.dates.len(), 1));
        amounts
            .column_mut(0)
            .assign(&self.amounts.column(col));

        Ok(CategoryCube {
            dates: self.dates.clone(),
            categories: vec![self.categories[col].clone()],
            amounts,
        })
    }
}

impl fmt::Display for CategoryCube {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "CategoryCube: {} dates x {} categories",
            self.dates.len(),
            self.categories.len()
        )?;

        write!(f, "{:>12}", "date")?;
        for category in &self.categories {
            write!(f, "  {:>12}", category)?;
        }
        writeln!(f)?;

        for (row, date) in self.dates.iter().enumerate() {
            write!(f, "{:>12}", date.format("%Y-%m-%d"))?;
            for col in 0..self.categories.len() {
                write!(f, "  {:>12.2}", self.amounts[[row, col]])?;
            }
            writeln!(f)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_cube_zero_fills_missing_combinations() {
        let records = vec![
            SeedRecord::new("Oak", date("2010-01-01"), 10.0),
            SeedRecord::new("Maple", date("2011-01-01"), 7.0),
        ];
        let cube = CategoryCube::from_records(&records);

        assert_eq!(cube.dates, vec![date("2010-01-01"), date("2011-01-01")]);
        assert_eq!(cube.categories, vec!["Maple".to_string(), "Oak".to_string()]);
        // Oak has no 2011 row, Maple no 2010 row: both zero-filled.
        assert_eq!(cube.series("Oak").unwrap(), vec![10.0, 0.0]);
        assert_eq!(cube.series("Maple").unwrap(), vec![0.0, 7.0]);
    }

    #[test]
    fn test_cube_sums_duplicate_cells() {
        let records = vec![
            SeedRecord::new("Oak", date("2010-01-01"), 10.0),
            SeedRecord::new("Oak", date("2010-01-01"), 5.0),
        ];
        let cube = CategoryCube::from_records(&records);
        assert_eq!(cube.series("Oak").unwrap(), vec![15.0]);
    }

    #[test]
    fn test_restricted_to_single_category() {
        let records = vec![
            SeedRecord::new("Oak", date("2010-01-01"), 10.0),
            SeedRecord::new("Maple", date("2010-01-01"), 7.0),
        ];
        let cube = CategoryCube::from_records(&records);

        let oak = cube.restricted_to("Oak").unwrap();
        assert_eq!(oak.categories, vec!["Oak".to_string()]);
        assert_eq!(oak.series("Oak").unwrap(), vec![10.0]);

        assert!(cube.restricted_to("Birch").is_err());
    }

    #[test]
    fn test_empty_cube() {
        let cube = CategoryCube::from_records(&[]);
        assert!(cube.is_empty());
        assert!(cube.series("Oak").is_none());
    }
}
