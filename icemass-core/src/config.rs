//! Comparison run configuration
//!
//! A run is described by a small TOML document:
//!
//! ```toml
//! icesheet = "AIS"
//! start_date = 2003.0
//! end_date = 2010.0
//! mass_balance_column = "Cumulative mass balance (Gt)"
//!
//! [regional]
//! east = "imbie_east.csv"
//! west = "imbie_west.csv"
//! peninsula = "imbie_peninsula.csv"
//! ```

use crate::basins::IceSheet;
use crate::errors::{IceMassError, IceMassResult};
use crate::interpolate::Extrapolation;
use crate::observation::DEFAULT_MASS_BALANCE_COLUMN;
use crate::residual::RegionalObservationPaths;
use crate::resample::{MassScaling, ICE_DENSITY, KG_TO_GT};
use crate::FloatValue;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ComparisonConfig {
    /// Ice sheet being compared (`"GIS"` or `"AIS"`).
    pub icesheet: IceSheet,

    /// Analysis start as a fractional year.
    /// Must exactly match a row of the observation series.
    pub start_date: FloatValue,

    /// Analysis end as a fractional year (inclusive).
    pub end_date: FloatValue,

    /// Observation column holding cumulative mass balance.
    /// default: "Cumulative mass balance (Gt)"
    #[serde(default = "default_mass_balance_column")]
    pub mass_balance_column: String,

    /// Ice density (kg m^-3).
    /// default: 917.0
    #[serde(default = "default_ice_density")]
    pub ice_density: FloatValue,

    /// Scale applied to mass in kg.
    /// default: 1e-12 (Gt)
    #[serde(default = "default_unit_scale")]
    pub unit_scale: FloatValue,

    /// Interpolation behaviour outside the model time axis.
    /// default: Nan
    #[serde(default)]
    pub extrapolation: Extrapolation,

    /// Optional Antarctic regional observation files.
    #[serde(default)]
    pub regional: RegionalObservationPaths,
}

fn default_mass_balance_column() -> String {
    DEFAULT_MASS_BALANCE_COLUMN.to_string()
}

fn default_ice_density() -> FloatValue {
    ICE_DENSITY
}

fn default_unit_scale() -> FloatValue {
    KG_TO_GT
}

impl ComparisonConfig {
    /// Configuration with default parameters for an analysis window
    pub fn new(icesheet: IceSheet, start_date: FloatValue, end_date: FloatValue) -> Self {
        Self {
            icesheet,
            start_date,
            end_date,
            mass_balance_column: default_mass_balance_column(),
            ice_density: ICE_DENSITY,
            unit_scale: KG_TO_GT,
            extrapolation: Extrapolation::default(),
            regional: RegionalObservationPaths::default(),
        }
    }

    /// Parse and validate a TOML document
    pub fn from_toml(document: &str) -> IceMassResult<Self> {
        let config: Self =
            toml::from_str(document).map_err(|e| IceMassError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> IceMassResult<String> {
        toml::to_string(self).map_err(|e| IceMassError::Config(e.to_string()))
    }

    pub fn validate(&self) -> IceMassResult<()> {
        if !(self.start_date.is_finite() && self.end_date.is_finite()) {
            return Err(IceMassError::Config(
                "start_date and end_date must be finite".to_string(),
            ));
        }
        if self.start_date >= self.end_date {
            return Err(IceMassError::Config(format!(
                "start_date ({}) must be before end_date ({})",
                self.start_date, self.end_date
            )));
        }
        if self.ice_density <= 0.0 || self.unit_scale <= 0.0 {
            return Err(IceMassError::Config(
                "ice_density and unit_scale must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn scaling(&self) -> MassScaling {
        MassScaling {
            ice_density: self.ice_density,
            unit_scale: self.unit_scale,
        }
    }
}
