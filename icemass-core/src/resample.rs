//! Resampling of gridded model output onto analysis dates
//!
//! Mass change at a date is computed against a fixed reference snapshot taken
//! at the analysis start date:
//!
//! $$\Delta M = (h(t) - h(t_0)) \times A_{cell} \times \rho_{ice} \times s$$
//!
//! where $h$ is the interpolated thickness, $A_{cell}$ the grid cell area,
//! $\rho_{ice}$ the ice density and $s$ the unit scale (1e-12 converts kg to Gt).

use crate::errors::IceMassResult;
use crate::grid::GriddedField;
use crate::interpolate::Extrapolation;
use crate::FloatValue;
use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// Density of glacial ice (kg m^-3).
pub const ICE_DENSITY: FloatValue = 917.0;

/// Conversion from kg to Gt.
pub const KG_TO_GT: FloatValue = 1e-12;

/// Conversion of a thickness change over one cell into a mass change
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MassScaling {
    /// Ice density (kg m^-3).
    /// default: 917.0
    pub ice_density: FloatValue,

    /// Scale applied to the mass in kg.
    /// default: 1e-12 (kg to Gt)
    pub unit_scale: FloatValue,
}

impl Default for MassScaling {
    fn default() -> Self {
        Self {
            ice_density: ICE_DENSITY,
            unit_scale: KG_TO_GT,
        }
    }
}

impl MassScaling {
    /// Mass per unit thickness change for a cell of `cell_area`
    pub fn factor(&self, cell_area: FloatValue) -> FloatValue {
        cell_area * self.ice_density * self.unit_scale
    }
}

/// Per-point mass change of a gridded field relative to a reference date
///
/// The reference snapshot is interpolated once on construction.
#[derive(Debug, Clone)]
pub struct ModelResampler<'a> {
    field: &'a GriddedField,
    reference_time: FloatValue,
    reference: Array1<FloatValue>,
    factor: FloatValue,
    extrapolation: Extrapolation,
}

impl<'a> ModelResampler<'a> {
    pub fn new(
        field: &'a GriddedField,
        reference_time: FloatValue,
        scaling: MassScaling,
        extrapolation: Extrapolation,
    ) -> IceMassResult<Self> {
        let reference = field.snapshot(reference_time, extrapolation)?;
        Ok(Self {
            field,
            reference_time,
            reference: field.flatten(reference.view()),
            factor: scaling.factor(field.cell_area()),
            extrapolation,
        })
    }

    pub fn reference_time(&self) -> FloatValue {
        self.reference_time
    }

    /// Flattened field values at `time`
    pub fn snapshot(&self, time: FloatValue) -> IceMassResult<Array1<FloatValue>> {
        let snapshot = self.field.snapshot(time, self.extrapolation)?;
        Ok(self.field.flatten(snapshot.view()))
    }

    /// Mass change at every grid point between the reference date and `time`
    ///
    /// Points where either snapshot is NaN contribute zero.
    pub fn mass_change(&self, time: FloatValue) -> IceMassResult<Array1<FloatValue>> {
        let mut delta = self.snapshot(time)? - &self.reference;
        delta.mapv_inplace(|d| if d.is_nan() { 0.0 } else { d * self.factor });
        Ok(delta)
    }
}
