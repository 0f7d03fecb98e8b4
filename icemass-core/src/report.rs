//! Tabular model/observation comparison
//!
//! The table starts with a synthetic row set for the start date (zero change
//! for every basin, region and total) followed by one block per compared date:
//! basins, regions (when the regional comparison ran), then the masked and
//! unmasked totals.

use crate::aggregate::ModelMassChanges;
use crate::datekey::DateKey;
use crate::errors::IceMassResult;
use crate::residual::{Region, Residuals};
use crate::FloatValue;
use serde::{Deserialize, Serialize};
use std::io::{self, Write};

pub const MASKED_TOTAL_LABEL: &str = "Masked_Total";
pub const UNMASKED_TOTAL_LABEL: &str = "Unmasked_Total";

const HEADER: [&str; 5] = [
    "Date",
    "Basin/Region",
    "Model mass change (Gt)",
    "IMBIE mass change (Gt)",
    "Residual (Gt)",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRow {
    pub date: DateKey,
    pub label: String,
    pub model: Option<FloatValue>,
    pub observed: Option<FloatValue>,
    pub residual: Option<FloatValue>,
}

impl ComparisonRow {
    fn new(
        date: DateKey,
        label: &str,
        model: Option<FloatValue>,
        observed: Option<FloatValue>,
        residual: Option<FloatValue>,
    ) -> Self {
        Self {
            date,
            label: label.to_string(),
            model,
            observed,
            residual,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonTable {
    pub title: String,
    pub period: String,
    pub rows: Vec<ComparisonRow>,
}

impl ComparisonTable {
    pub fn build(
        mass_balance_type: &str,
        start_date: FloatValue,
        end_date: FloatValue,
        model: &ModelMassChanges,
        residuals: &Residuals,
    ) -> IceMassResult<Self> {
        let start = DateKey::new(start_date)?;
        let end = DateKey::new(end_date)?;
        let mut rows = Vec::new();

        // Labels come from the first modelled date after the start
        let first = model.range(start..).find(|(date, _)| **date > start);
        let basins: Vec<String> = first
            .map(|(_, record)| record.basins.keys().cloned().collect())
            .unwrap_or_default();
        let regions: Vec<String> = match first {
            Some((_, record)) if residuals.regional_available => record
                .regions
                .as_ref()
                .map(|r| r.keys().cloned().collect())
                .unwrap_or_default(),
            _ => Vec::new(),
        };

        for basin in &basins {
            rows.push(ComparisonRow::new(start, basin, Some(0.0), None, None));
        }
        for region in &regions {
            rows.push(ComparisonRow::new(start, region, Some(0.0), Some(0.0), Some(0.0)));
        }
        for label in [MASKED_TOTAL_LABEL, UNMASKED_TOTAL_LABEL] {
            rows.push(ComparisonRow::new(start, label, Some(0.0), Some(0.0), Some(0.0)));
        }

        for (date, residual) in &residuals.totals {
            let Some(record) = model.get(date) else {
                continue;
            };

            for (basin, value) in &record.basins {
                rows.push(ComparisonRow::new(*date, basin, Some(*value), None, None));
            }

            if residuals.regional_available {
                let regional = residuals.regional.get(date);
                for (label, value) in record.regions.iter().flatten() {
                    let matched = Region::from_label(label)
                        .and_then(|region| regional.and_then(|r| r.get(&region)));
                    rows.push(ComparisonRow::new(
                        *date,
                        label,
                        Some(*value),
                        matched.map(|m| m.observed),
                        matched.map(|m| m.residual),
                    ));
                }
            }

            rows.push(ComparisonRow::new(
                *date,
                MASKED_TOTAL_LABEL,
                Some(record.masked_total),
                Some(residual.observed),
                Some(residual.residual_masked),
            ));
            rows.push(ComparisonRow::new(
                *date,
                UNMASKED_TOTAL_LABEL,
                Some(record.unmasked_total),
                Some(residual.observed),
                Some(residual.residual_unmasked),
            ));
        }

        Ok(Self {
            title: format!("Mass change comparison ({mass_balance_type})"),
            period: format!("{start} - {end}"),
            rows,
        })
    }

    /// Rows for a single label, in date order
    pub fn rows_for<'a>(&'a self, label: &'a str) -> impl Iterator<Item = &'a ComparisonRow> {
        self.rows.iter().filter(move |r| r.label == label)
    }

    /// Write the table as comma-delimited text
    ///
    /// Values use two decimals; absent values are written as `--`.
    pub fn write_delimited<W: Write>(&self, mut writer: W) -> io::Result<()> {
        write_record(&mut writer, &[&self.title, &self.period])?;
        write_record(&mut writer, &HEADER)?;
        for row in &self.rows {
            let date = row.date.to_string();
            let model = format_value(row.model);
            let observed = format_value(row.observed);
            let residual = format_value(row.residual);
            write_record(
                &mut writer,
                &[&date, &row.label, &model, &observed, &residual],
            )?;
        }
        writer.flush()
    }
}

fn format_value(value: Option<FloatValue>) -> String {
    match value {
        Some(v) => format!("{v:.2}"),
        None => "--".to_string(),
    }
}

fn write_record<W: Write, S: AsRef<str>>(writer: &mut W, fields: &[S]) -> io::Result<()> {
    let line = fields
        .iter()
        .map(|f| quote(f.as_ref()))
        .collect::<Vec<_>>()
        .join(",");
    writeln!(writer, "{line}")
}

fn quote(field: &str) -> String {
    if field.contains([',', '"', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::MassChangeRecord;
    use crate::residual::{RegionalResidual, ResidualRecord};
    use std::collections::BTreeMap;

    fn key(year: FloatValue) -> DateKey {
        DateKey::new(year).unwrap()
    }

    fn inputs(regional_available: bool) -> (ModelMassChanges, Residuals) {
        let model = BTreeMap::from([(
            key(2001.0),
            MassChangeRecord {
                unmasked_total: -12.0,
                masked_total: -10.0,
                basins: BTreeMap::from([("A".to_string(), -4.0), ("B".to_string(), -6.0)]),
                regions: Some(BTreeMap::from([
                    ("East".to_string(), -4.0),
                    ("West".to_string(), -6.0),
                ])),
            },
        )]);
        let mut residuals = Residuals {
            regional_available,
            ..Default::default()
        };
        residuals.totals.insert(
            key(2001.0),
            ResidualRecord {
                observed: -11.0,
                residual_masked: -1.0,
                residual_unmasked: 1.0,
            },
        );
        if regional_available {
            residuals.regional.insert(
                key(2001.0),
                BTreeMap::from([(
                    Region::East,
                    RegionalResidual {
                        observed: -5.0,
                        model: -4.0,
                        residual: -1.0,
                    },
                )]),
            );
        }
        (model, residuals)
    }

    #[test]
    fn start_rows_are_injected() {
        let (model, residuals) = inputs(false);
        let table = ComparisonTable::build("Total", 2000.0, 2001.0, &model, &residuals).unwrap();

        let start_rows: Vec<_> = table.rows.iter().filter(|r| r.date == key(2000.0)).collect();
        let labels: Vec<_> = start_rows.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, vec!["A", "B", MASKED_TOTAL_LABEL, UNMASKED_TOTAL_LABEL]);
        assert_eq!(start_rows[0].observed, None);
        assert!(start_rows.iter().all(|r| r.model == Some(0.0)));
    }

    #[test]
    fn regional_rows_only_when_available() {
        let (model, residuals) = inputs(false);
        let table = ComparisonTable::build("Total", 2000.0, 2001.0, &model, &residuals).unwrap();
        assert_eq!(table.rows_for("East").count(), 0);

        let (model, residuals) = inputs(true);
        let table = ComparisonTable::build("Total", 2000.0, 2001.0, &model, &residuals).unwrap();
        let east: Vec<_> = table.rows_for("East").collect();
        assert_eq!(east.len(), 2);
        assert_eq!(east[1].residual, Some(-1.0));
        let west: Vec<_> = table.rows_for("West").collect();
        assert_eq!(west[1].observed, None);
    }

    #[test]
    fn writes_delimited_text() {
        let (model, residuals) = inputs(false);
        let table = ComparisonTable::build("Total", 2000.0, 2001.0, &model, &residuals).unwrap();
        let mut buffer = Vec::new();
        table.write_delimited(&mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<_> = text.lines().collect();

        // The period uses the same date format as the date column
        assert_eq!(lines[0], "Mass change comparison (Total),2000.0 - 2001.0");
        assert_eq!(lines[2], "2000.0,A,0.00,--,--");
        assert!(lines.contains(&"2001.0,Masked_Total,-10.00,-11.00,-1.00"));
        assert!(lines.contains(&"2001.0,Unmasked_Total,-12.00,-11.00,1.00"));
    }
}
