//! Observational mass-balance series (IMBIE)
//!
//! IMBIE series are cumulative mass balance against a fractional-year date
//! column. The comparison works on successive changes: each row's change is
//! taken against the row visited before it, with the first row after the start
//! date compared against the exact start-date value.

use crate::datekey::DateKey;
use crate::errors::{IceMassError, IceMassResult};
use crate::FloatValue;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Name of the fractional-year column in IMBIE files.
pub const YEAR_COLUMN: &str = "Year";

/// Default cumulative mass-balance column in IMBIE files.
pub const DEFAULT_MASS_BALANCE_COLUMN: &str = "Cumulative mass balance (Gt)";

/// In-memory observation table: a fractional-year column plus named value columns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservationTable {
    years: Vec<FloatValue>,
    columns: BTreeMap<String, Vec<FloatValue>>,
}

impl ObservationTable {
    /// Create a table, checking every column has one value per year
    pub fn new(
        years: Vec<FloatValue>,
        columns: BTreeMap<String, Vec<FloatValue>>,
    ) -> IceMassResult<Self> {
        for (name, values) in &columns {
            if values.len() != years.len() {
                return Err(IceMassError::ShapeMismatch {
                    name: format!("observation column '{name}'"),
                    expected: format!("{} rows", years.len()),
                    actual: values.len().to_string(),
                });
            }
        }
        Ok(Self { years, columns })
    }

    /// Convenience constructor for a single value column
    pub fn with_column(
        years: Vec<FloatValue>,
        name: &str,
        values: Vec<FloatValue>,
    ) -> IceMassResult<Self> {
        Self::new(years, BTreeMap::from([(name.to_string(), values)]))
    }

    pub fn years(&self) -> &[FloatValue] {
        &self.years
    }

    pub fn column(&self, name: &str) -> Option<&[FloatValue]> {
        self.columns.get(name).map(|v| v.as_slice())
    }

    pub fn len(&self) -> usize {
        self.years.len()
    }

    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }
}

/// Loads observation tables from disk
///
/// Implemented by the file-format adapters (CSV readers and similar).
pub trait ObservationSource {
    fn load(&self, path: &Path) -> IceMassResult<ObservationTable>;
}

impl<F> ObservationSource for F
where
    F: Fn(&Path) -> IceMassResult<ObservationTable>,
{
    fn load(&self, path: &Path) -> IceMassResult<ObservationTable> {
        self(path)
    }
}

/// One observation row after the start date
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObservationDelta {
    pub year: FloatValue,
    /// Cumulative mass balance (Gt)
    pub mass_balance: FloatValue,
    /// Change since the previous row (Gt)
    pub mass_change: FloatValue,
}

/// Observed mass changes within `(start_date, end_date]`, sorted by date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservationDeltas {
    pub start_date: FloatValue,
    pub start_value: FloatValue,
    pub rows: Vec<ObservationDelta>,
}

impl ObservationDeltas {
    pub fn years(&self) -> Vec<FloatValue> {
        self.rows.iter().map(|r| r.year).collect()
    }

    /// Mass change keyed by canonical date
    pub fn by_date(&self) -> IceMassResult<BTreeMap<DateKey, FloatValue>> {
        self.rows
            .iter()
            .map(|r| Ok((DateKey::new(r.year)?, r.mass_change)))
            .collect()
    }
}

/// Difference an observation series over `(start_date, end_date]`
///
/// Rows are sorted by year. `start_date` must match a row exactly; its value
/// seeds the first difference, and every later row is differenced against the
/// row before it.
pub fn difference_observations(
    table: &ObservationTable,
    mass_balance_column: &str,
    start_date: FloatValue,
    end_date: FloatValue,
) -> IceMassResult<ObservationDeltas> {
    let values = table
        .column(mass_balance_column)
        .ok_or_else(|| IceMassError::MissingColumn(mass_balance_column.to_string()))?;

    let mut rows: Vec<(FloatValue, FloatValue)> = table
        .years()
        .iter()
        .copied()
        .zip(values.iter().copied())
        .collect();
    // Stable, so rows sharing a year keep file order
    rows.sort_by(|a, b| a.0.total_cmp(&b.0));

    let start_value = rows
        .iter()
        .find(|(year, _)| *year == start_date)
        .map(|&(_, value)| value)
        .ok_or(IceMassError::MissingStartDate(start_date))?;

    let mut previous = start_value;
    let deltas = rows
        .into_iter()
        .filter(|&(year, _)| year > start_date && year <= end_date)
        .map(|(year, mass_balance)| {
            let mass_change = mass_balance - previous;
            previous = mass_balance;
            ObservationDelta {
                year,
                mass_balance,
                mass_change,
            }
        })
        .collect();

    Ok(ObservationDeltas {
        start_date,
        start_value,
        rows: deltas,
    })
}
