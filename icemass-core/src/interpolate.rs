//! One-dimensional linear interpolation along a coordinate axis
//!
//! Used to resample gridded model output onto observation timestamps and to
//! evaluate mascon time series at arbitrary dates. Values are interpolated as
//! `lo + (hi - lo) * w` over the bracketing segment, so a NaN at either end of
//! the segment propagates into the result. A target on an axis node takes the
//! node's value exactly, whatever its neighbours hold.

use crate::errors::{IceMassError, IceMassResult};
use crate::FloatValue;
use ndarray::{Array, ArrayView, Axis, RemoveAxis};
use serde::{Deserialize, Serialize};

/// Behaviour for targets outside the coordinate axis
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Extrapolation {
    /// Extend the first or last segment linearly
    Linear,
    /// Return NaN outside the axis
    #[default]
    Nan,
    /// Return [`IceMassError::ExtrapolationNotAllowed`]
    Forbid,
}

/// Location of a target on the axis: segment start index and weight of the segment end
#[derive(Copy, Clone, Debug, PartialEq)]
struct Bracket {
    index: usize,
    weight: FloatValue,
}

fn blend(lo: FloatValue, hi: FloatValue, weight: FloatValue) -> FloatValue {
    if weight == 0.0 {
        lo
    } else if weight == 1.0 {
        hi
    } else {
        lo + (hi - lo) * weight
    }
}

/// Linear interpolator over a strictly increasing axis
#[derive(Debug, Clone)]
pub struct LinearInterpolator<'a> {
    axis: &'a [FloatValue],
    extrapolation: Extrapolation,
}

impl<'a> LinearInterpolator<'a> {
    pub fn new(axis: &'a [FloatValue], extrapolation: Extrapolation) -> IceMassResult<Self> {
        if axis.len() < 2 {
            return Err(IceMassError::InvalidGrid(format!(
                "interpolation requires at least 2 coordinates, got {}",
                axis.len()
            )));
        }
        if !axis.windows(2).all(|w| w[0] < w[1]) {
            return Err(IceMassError::InvalidGrid(
                "interpolation axis must be strictly increasing".to_string(),
            ));
        }
        Ok(Self {
            axis,
            extrapolation,
        })
    }

    pub fn axis(&self) -> &[FloatValue] {
        self.axis
    }

    fn bracket(&self, target: FloatValue) -> IceMassResult<Option<Bracket>> {
        if target.is_nan() {
            return Ok(None);
        }
        let n = self.axis.len();
        let (min, max) = (self.axis[0], self.axis[n - 1]);

        if target < min || target > max {
            match self.extrapolation {
                Extrapolation::Nan => return Ok(None),
                Extrapolation::Forbid => {
                    return Err(IceMassError::ExtrapolationNotAllowed { target, min, max })
                }
                Extrapolation::Linear => {}
            }
        }

        let index = self
            .axis
            .partition_point(|&a| a <= target)
            .saturating_sub(1)
            .min(n - 2);
        let weight = (target - self.axis[index]) / (self.axis[index + 1] - self.axis[index]);
        Ok(Some(Bracket { index, weight }))
    }

    /// Interpolate a series sampled on the axis at `target`
    pub fn interpolate(&self, values: &[FloatValue], target: FloatValue) -> IceMassResult<FloatValue> {
        if values.len() != self.axis.len() {
            return Err(IceMassError::ShapeMismatch {
                name: "interpolated values".to_string(),
                expected: format!("{} samples", self.axis.len()),
                actual: values.len().to_string(),
            });
        }
        Ok(match self.bracket(target)? {
            Some(Bracket { index, weight }) => blend(values[index], values[index + 1], weight),
            None => FloatValue::NAN,
        })
    }

    /// Interpolate every lane of `values` along `axis` at `target`
    ///
    /// The result has one dimension fewer than `values`.
    pub fn interpolate_along<D: RemoveAxis>(
        &self,
        values: ArrayView<'_, FloatValue, D>,
        axis: Axis,
        target: FloatValue,
    ) -> IceMassResult<Array<FloatValue, D::Smaller>> {
        if values.len_of(axis) != self.axis.len() {
            return Err(IceMassError::ShapeMismatch {
                name: "interpolated array".to_string(),
                expected: format!("{} samples along axis {}", self.axis.len(), axis.index()),
                actual: format!("{:?}", values.shape()),
            });
        }

        Ok(match self.bracket(target)? {
            Some(Bracket { index, weight }) => {
                let lo = values.index_axis(axis, index);
                let hi = values.index_axis(axis, index + 1);
                let mut out = lo.to_owned();
                out.zip_mut_with(&hi, |l, &h| *l = blend(*l, h, weight));
                out
            }
            None => {
                let template = values.index_axis(axis, 0);
                Array::from_elem(template.raw_dim(), FloatValue::NAN)
            }
        })
    }
}
