//! Regular gridded model fields
//!
//! A [`GriddedField`] holds a time-varying scalar (typically ice thickness,
//! `lithk`) on a regular x/y grid. Spatial operations work on a flattened list
//! of grid points; [`GridPoints`] and [`GriddedField::flatten`] share a single
//! x-major ordering so that flattened values always line up with their point
//! geometries.

use crate::errors::{IceMassError, IceMassResult};
use crate::interpolate::{Extrapolation, LinearInterpolator};
use crate::FloatValue;
use geo::Point;
use ndarray::{Array1, Array2, Array3, ArrayView2, Axis};

/// Time-varying scalar field on a regular grid, stored as `(time, y, x)`
#[derive(Debug, Clone)]
pub struct GriddedField {
    values: Array3<FloatValue>,
    x: Vec<FloatValue>,
    y: Vec<FloatValue>,
    /// Time coordinate as fractional years
    time: Vec<FloatValue>,
}

impl GriddedField {
    /// Create a field after validating its coordinates
    ///
    /// Requirements:
    /// - `values` has shape `(time.len(), y.len(), x.len())`
    /// - at least two coordinates along each spatial axis, uniformly spaced
    /// - a strictly increasing time coordinate
    pub fn new(
        values: Array3<FloatValue>,
        x: Vec<FloatValue>,
        y: Vec<FloatValue>,
        time: Vec<FloatValue>,
    ) -> IceMassResult<Self> {
        let expected = [time.len(), y.len(), x.len()];
        if values.shape() != expected {
            return Err(IceMassError::ShapeMismatch {
                name: "gridded field".to_string(),
                expected: format!("{:?} (time, y, x)", expected),
                actual: format!("{:?}", values.shape()),
            });
        }
        check_uniform("x", &x)?;
        check_uniform("y", &y)?;
        if time.is_empty() || !time.windows(2).all(|w| w[0] < w[1]) {
            return Err(IceMassError::InvalidGrid(
                "time coordinate must be non-empty and strictly increasing".to_string(),
            ));
        }
        Ok(Self { values, x, y, time })
    }

    pub fn x(&self) -> &[FloatValue] {
        &self.x
    }

    pub fn y(&self) -> &[FloatValue] {
        &self.y
    }

    pub fn time(&self) -> &[FloatValue] {
        &self.time
    }

    pub fn values(&self) -> &Array3<FloatValue> {
        &self.values
    }

    /// Grid spacing along x
    pub fn x_resolution(&self) -> FloatValue {
        (self.x[1] - self.x[0]).abs()
    }

    /// Grid spacing along y
    pub fn y_resolution(&self) -> FloatValue {
        (self.y[1] - self.y[0]).abs()
    }

    /// Area of a single grid cell in squared coordinate units
    pub fn cell_area(&self) -> FloatValue {
        self.x_resolution() * self.y_resolution()
    }

    pub fn n_points(&self) -> usize {
        self.x.len() * self.y.len()
    }

    /// Spatial snapshot at `time`, linearly interpolated along the time axis
    ///
    /// A field with a single time step can only be sampled at that exact time.
    pub fn snapshot(
        &self,
        time: FloatValue,
        extrapolation: Extrapolation,
    ) -> IceMassResult<Array2<FloatValue>> {
        if self.time.len() == 1 {
            return if time == self.time[0] {
                Ok(self.values.index_axis(Axis(0), 0).to_owned())
            } else {
                Err(IceMassError::ExtrapolationNotAllowed {
                    target: time,
                    min: self.time[0],
                    max: self.time[0],
                })
            };
        }
        let interpolator = LinearInterpolator::new(&self.time, extrapolation)?;
        interpolator.interpolate_along(self.values.view(), Axis(0), time)
    }

    /// Flatten a `(y, x)` snapshot into the point order of [`GridPoints`]
    pub fn flatten(&self, snapshot: ArrayView2<'_, FloatValue>) -> Array1<FloatValue> {
        // Transposing to (x, y) before the row-major walk gives x-major order
        snapshot.t().iter().copied().collect()
    }

    /// Point geometries for every grid cell, in flattened order
    pub fn points(&self) -> GridPoints {
        GridPoints::from_coordinates(&self.x, &self.y)
    }
}

fn check_uniform(name: &str, coords: &[FloatValue]) -> IceMassResult<()> {
    if coords.len() < 2 {
        return Err(IceMassError::InvalidGrid(format!(
            "{name} coordinate needs at least 2 values to define a resolution"
        )));
    }
    let step = coords[1] - coords[0];
    if step == 0.0 || !step.is_finite() {
        return Err(IceMassError::InvalidGrid(format!(
            "{name} coordinate has zero or non-finite spacing"
        )));
    }
    let tolerance = step.abs() * 1e-6;
    if coords
        .windows(2)
        .any(|w| ((w[1] - w[0]) - step).abs() > tolerance)
    {
        return Err(IceMassError::InvalidGrid(format!(
            "{name} coordinate is not uniformly spaced"
        )));
    }
    Ok(())
}

/// Point geometries of a grid in x-major order (`for x in xs { for y in ys }`)
///
/// The grid does not change with time, so these are built once per run.
#[derive(Debug, Clone, PartialEq)]
pub struct GridPoints {
    points: Vec<Point<FloatValue>>,
}

impl GridPoints {
    pub fn from_coordinates(x: &[FloatValue], y: &[FloatValue]) -> Self {
        let points = x
            .iter()
            .flat_map(|&xi| y.iter().map(move |&yi| Point::new(xi, yi)))
            .collect();
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Point<FloatValue>> {
        self.points.iter()
    }
}
