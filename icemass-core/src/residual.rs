//! Reconciliation of observed and modelled mass change
//!
//! Residuals are `observed - modelled` at every date present in both series.
//! Antarctic runs can additionally be compared per region (East, West,
//! Peninsula) when all three regional observation files are available.

use crate::aggregate::ModelMassChanges;
use crate::basins::IceSheetLayout;
use crate::datekey::DateKey;
use crate::errors::IceMassResult;
use crate::observation::{difference_observations, ObservationDeltas, ObservationSource};
use crate::FloatValue;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Antarctic regions with their own IMBIE series
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Region {
    East,
    West,
    Peninsula,
}

impl Region {
    pub const ALL: [Region; 3] = [Region::East, Region::West, Region::Peninsula];

    /// Label used for the region in basin layers
    pub fn label(&self) -> &'static str {
        match self {
            Region::East => "East",
            Region::West => "West",
            Region::Peninsula => "Peninsula",
        }
    }

    /// Exact-match lookup; other spellings are not recognised
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.label() == label)
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Residuals of the ice-sheet totals at one date
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResidualRecord {
    pub observed: FloatValue,
    /// `observed - masked model total`
    pub residual_masked: FloatValue,
    /// `observed - unmasked model total`
    pub residual_unmasked: FloatValue,
}

/// Residual of one region at one date
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegionalResidual {
    pub observed: FloatValue,
    pub model: FloatValue,
    pub residual: FloatValue,
}

/// Differenced observations for each Antarctic region
#[derive(Debug, Clone, PartialEq)]
pub struct RegionalDeltas {
    pub east: ObservationDeltas,
    pub west: ObservationDeltas,
    pub peninsula: ObservationDeltas,
}

impl RegionalDeltas {
    pub fn get(&self, region: Region) -> &ObservationDeltas {
        match region {
            Region::East => &self.east,
            Region::West => &self.west,
            Region::Peninsula => &self.peninsula,
        }
    }
}

/// Locations of the optional regional observation files
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionalObservationPaths {
    pub east: Option<PathBuf>,
    pub west: Option<PathBuf>,
    pub peninsula: Option<PathBuf>,
}

impl RegionalObservationPaths {
    fn existing(path: &Option<PathBuf>) -> Option<&Path> {
        path.as_deref().filter(|p| p.exists())
    }

    /// True only when all three files are configured and exist
    pub fn all_present(&self) -> bool {
        [&self.east, &self.west, &self.peninsula]
            .into_iter()
            .all(|p| Self::existing(p).is_some())
    }

    /// Load and difference the three regional series
    ///
    /// Returns `None` unless every file is present: a partial set disables the
    /// regional comparison entirely.
    pub fn load_if_complete(
        &self,
        source: &impl ObservationSource,
        mass_balance_column: &str,
        start_date: FloatValue,
        end_date: FloatValue,
    ) -> IceMassResult<Option<RegionalDeltas>> {
        let (Some(east), Some(west), Some(peninsula)) = (
            Self::existing(&self.east),
            Self::existing(&self.west),
            Self::existing(&self.peninsula),
        ) else {
            if self.east.is_some() || self.west.is_some() || self.peninsula.is_some() {
                warn!("Not all regional observation files exist; regional comparison disabled");
            }
            return Ok(None);
        };

        let load = |path: &Path| -> IceMassResult<ObservationDeltas> {
            let table = source.load(path)?;
            difference_observations(&table, mass_balance_column, start_date, end_date)
        };
        Ok(Some(RegionalDeltas {
            east: load(east)?,
            west: load(west)?,
            peninsula: load(peninsula)?,
        }))
    }
}

/// Residuals for every date present in both series
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Residuals {
    pub totals: BTreeMap<DateKey, ResidualRecord>,
    pub regional: BTreeMap<DateKey, BTreeMap<Region, RegionalResidual>>,
    /// Whether the regional comparison ran; carried through to reporting
    pub regional_available: bool,
}

/// Compare observed deltas against modelled mass change
///
/// Dates missing from the model results are skipped with a warning. Regional
/// residuals are only computed when `layout` defines regions and `regional`
/// is provided.
pub fn reconcile(
    layout: &IceSheetLayout,
    observed: &ObservationDeltas,
    model: &ModelMassChanges,
    regional: Option<&RegionalDeltas>,
) -> IceMassResult<Residuals> {
    let mut residuals = Residuals::default();

    for row in &observed.rows {
        let key = DateKey::new(row.year)?;
        match model.get(&key) {
            Some(record) => {
                residuals.totals.insert(
                    key,
                    ResidualRecord {
                        observed: row.mass_change,
                        residual_masked: row.mass_change - record.masked_total,
                        residual_unmasked: row.mass_change - record.unmasked_total,
                    },
                );
            }
            None => warn!(date = %key, "Date not found in model results. Skipping"),
        }
    }

    let regional = match regional {
        Some(regional) if layout.has_regions() => regional,
        _ => return Ok(residuals),
    };
    residuals.regional_available = true;
    info!("Regional observation files present; computing regional residuals");

    for region in Region::ALL {
        for row in &regional.get(region).rows {
            let key = DateKey::new(row.year)?;
            let Some(record) = model.get(&key) else {
                warn!(date = %key, %region, "Date not found in model results. Skipping");
                continue;
            };
            let Some(model_change) = record
                .regions
                .as_ref()
                .and_then(|regions| regions.get(region.label()))
            else {
                continue;
            };
            residuals.regional.entry(key).or_default().insert(
                region,
                RegionalResidual {
                    observed: row.mass_change,
                    model: *model_change,
                    residual: row.mass_change - model_change,
                },
            );
        }
    }

    Ok(residuals)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::MassChangeRecord;
    use crate::basins::IceSheet;
    use crate::observation::ObservationDelta;

    fn deltas(rows: &[(FloatValue, FloatValue)]) -> ObservationDeltas {
        ObservationDeltas {
            start_date: 2000.0,
            start_value: 0.0,
            rows: rows
                .iter()
                .map(|&(year, mass_change)| ObservationDelta {
                    year,
                    mass_balance: 0.0,
                    mass_change,
                })
                .collect(),
        }
    }

    fn model() -> ModelMassChanges {
        let record = MassChangeRecord {
            unmasked_total: -12.0,
            masked_total: -10.0,
            basins: BTreeMap::from([("A-Ap".to_string(), -10.0)]),
            regions: Some(BTreeMap::from([
                ("East".to_string(), -4.0),
                ("West".to_string(), -6.0),
                ("Wilkes".to_string(), 0.0),
            ])),
        };
        BTreeMap::from([(DateKey::new(2001.0).unwrap(), record)])
    }

    #[test]
    fn totals_skip_missing_dates() {
        let observed = deltas(&[(2001.0, -15.0), (2002.0, -3.0)]);
        let residuals =
            reconcile(&IceSheet::Greenland.layout(), &observed, &model(), None).unwrap();
        assert_eq!(residuals.totals.len(), 1);
        let record = residuals.totals[&DateKey::new(2001.0).unwrap()];
        assert_eq!(record.residual_masked, -5.0);
        assert_eq!(record.residual_unmasked, -3.0);
        assert!(!residuals.regional_available);
    }

    #[test]
    fn regional_residuals_for_recognised_regions() {
        let regional = RegionalDeltas {
            east: deltas(&[(2001.0, -5.0)]),
            west: deltas(&[(2001.0, -5.0)]),
            peninsula: deltas(&[(2001.0, -1.0)]),
        };
        let observed = deltas(&[(2001.0, -11.0)]);
        let residuals = reconcile(
            &IceSheet::Antarctic.layout(),
            &observed,
            &model(),
            Some(&regional),
        )
        .unwrap();

        assert!(residuals.regional_available);
        let at_2001 = &residuals.regional[&DateKey::new(2001.0).unwrap()];
        assert_eq!(at_2001[&Region::East].residual, -1.0);
        assert_eq!(at_2001[&Region::West].residual, 1.0);
        // The model has no "Peninsula" region
        assert!(!at_2001.contains_key(&Region::Peninsula));
    }

    #[test]
    fn greenland_ignores_regional_input() {
        let regional = RegionalDeltas {
            east: deltas(&[(2001.0, -5.0)]),
            west: deltas(&[(2001.0, -5.0)]),
            peninsula: deltas(&[(2001.0, -1.0)]),
        };
        let residuals = reconcile(
            &IceSheet::Greenland.layout(),
            &deltas(&[]),
            &model(),
            Some(&regional),
        )
        .unwrap();
        assert!(!residuals.regional_available);
        assert!(residuals.regional.is_empty());
    }

    #[test]
    fn region_labels_are_exact() {
        assert_eq!(Region::from_label("Peninsula"), Some(Region::Peninsula));
        assert_eq!(Region::from_label("east"), None);
        assert_eq!(Region::from_label("Antarctic Peninsula"), None);
    }

    #[test]
    fn missing_paths_disable_regional_loading() {
        let paths = RegionalObservationPaths {
            east: Some(PathBuf::from("/nonexistent/east.csv")),
            west: None,
            peninsula: None,
        };
        assert!(!paths.all_present());
        let source = |_: &Path| -> IceMassResult<crate::observation::ObservationTable> {
            panic!("source must not be called")
        };
        assert!(paths
            .load_if_complete(&source, "mass", 2000.0, 2001.0)
            .unwrap()
            .is_none());
    }
}
