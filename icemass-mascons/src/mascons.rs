//! Mascon solution container
//!
//! A solution holds `N` cells, each with a centre, a latitude/longitude span, an
//! area, basin and location codes, and a time series of equivalent water
//! thickness (`cmwe`, cm). Reference days are counted from 2002-01-01.

use crate::errors::{MasconError, MasconResult};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use icemass_core::FloatValue;
use ndarray::{Array1, Array2, ArrayView1, ArrayView2};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Longitude convention applied to mascon centres
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LonWrap {
    /// Signed longitudes, -180 to 180
    #[default]
    Pm180,
    /// Unsigned longitudes, 0 to 360
    ZeroTo360,
}

impl LonWrap {
    pub fn apply(&self, lon: FloatValue) -> FloatValue {
        match self {
            LonWrap::Pm180 if lon > 180.0 => lon - 360.0,
            LonWrap::ZeroTo360 if lon < 0.0 => lon + 360.0,
            _ => lon,
        }
    }
}

impl fmt::Display for LonWrap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LonWrap::Pm180 => f.write_str("pm180"),
            LonWrap::ZeroTo360 => f.write_str("0to360"),
        }
    }
}

impl FromStr for LonWrap {
    type Err = MasconError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pm180" => Ok(LonWrap::Pm180),
            "0to360" => Ok(LonWrap::ZeroTo360),
            other => Err(MasconError::UnknownLonWrap(other.to_string())),
        }
    }
}

/// Raw arrays of a mascon solution, as read from the solution file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MasconArrays {
    pub lat_centers: Array1<FloatValue>,
    pub lat_spans: Array1<FloatValue>,
    pub lon_centers: Array1<FloatValue>,
    pub lon_spans: Array1<FloatValue>,
    pub locations: Array1<i32>,
    pub basins: Array1<i32>,
    /// Cell area (km^2)
    pub areas: Array1<FloatValue>,
    /// Equivalent water thickness (cm), shape `[cell, time]`
    pub cmwe: Array2<FloatValue>,
    pub days_start: Array1<FloatValue>,
    pub days_middle: Array1<FloatValue>,
    pub days_end: Array1<FloatValue>,
}

/// Validated mascon solution with derived cell bounds and timestamps
#[derive(Debug, Clone)]
pub struct MasconSet {
    lat_centers: Array1<FloatValue>,
    lat_spans: Array1<FloatValue>,
    lon_centers: Array1<FloatValue>,
    lon_spans: Array1<FloatValue>,
    locations: Array1<i32>,
    basins: Array1<i32>,
    areas: Array1<FloatValue>,
    cmwe: Array2<FloatValue>,
    days_start: Vec<FloatValue>,
    days_middle: Vec<FloatValue>,
    days_end: Vec<FloatValue>,
    times_start: Vec<NaiveDateTime>,
    times_middle: Vec<NaiveDateTime>,
    times_end: Vec<NaiveDateTime>,
    min_lats: Array1<FloatValue>,
    max_lats: Array1<FloatValue>,
    min_lons: Array1<FloatValue>,
    max_lons: Array1<FloatValue>,
    lon_wrap: LonWrap,
}

impl MasconSet {
    /// Validate the raw arrays and derive bounds and timestamps
    ///
    /// Longitude centres are rewrapped with `lon_wrap` before any bounds are
    /// derived. Latitude bounds that cross a pole are clamped to a half-degree
    /// cap at that pole.
    pub fn new(arrays: MasconArrays, lon_wrap: LonWrap) -> MasconResult<Self> {
        let n = arrays.lat_centers.len();
        let lengths = [
            ("lat_span", arrays.lat_spans.len()),
            ("lon_center", arrays.lon_centers.len()),
            ("lon_span", arrays.lon_spans.len()),
            ("location", arrays.locations.len()),
            ("basin", arrays.basins.len()),
            ("area_km2", arrays.areas.len()),
        ];
        for (name, actual) in lengths {
            if actual != n {
                return Err(MasconError::LengthMismatch {
                    name,
                    expected: n,
                    actual,
                });
            }
        }

        let n_times = arrays.days_middle.len();
        if n_times == 0 {
            return Err(MasconError::NoTimes);
        }
        for (name, actual) in [
            ("ref_days_first", arrays.days_start.len()),
            ("ref_days_last", arrays.days_end.len()),
        ] {
            if actual != n_times {
                return Err(MasconError::LengthMismatch {
                    name,
                    expected: n_times,
                    actual,
                });
            }
        }
        if arrays.cmwe.dim() != (n, n_times) {
            return Err(MasconError::CmweShape {
                cells: n,
                times: n_times,
                actual: arrays.cmwe.shape().to_vec(),
            });
        }

        let lon_centers = arrays.lon_centers.mapv(|lon| lon_wrap.apply(lon));

        let mut min_lats = &arrays.lat_centers - &(&arrays.lat_spans / 2.0);
        let mut max_lats = &arrays.lat_centers + &(&arrays.lat_spans / 2.0);
        for (min, max) in min_lats.iter_mut().zip(max_lats.iter_mut()) {
            if *min < -90.0 {
                *max = -89.5;
                *min = -90.0;
            }
            if *max > 90.0 {
                *min = 89.5;
                *max = 90.0;
            }
        }
        let min_lons = &lon_centers - &(&arrays.lon_spans / 2.0);
        let max_lons = &lon_centers + &(&arrays.lon_spans / 2.0);

        let days_start = arrays.days_start.to_vec();
        let days_middle = arrays.days_middle.to_vec();
        let days_end = arrays.days_end.to_vec();

        Ok(Self {
            times_start: reference_times(&days_start)?,
            times_middle: reference_times(&days_middle)?,
            times_end: reference_times(&days_end)?,
            lat_centers: arrays.lat_centers,
            lat_spans: arrays.lat_spans,
            lon_centers,
            lon_spans: arrays.lon_spans,
            locations: arrays.locations,
            basins: arrays.basins,
            areas: arrays.areas,
            cmwe: arrays.cmwe,
            days_start,
            days_middle,
            days_end,
            min_lats,
            max_lats,
            min_lons,
            max_lons,
            lon_wrap,
        })
    }

    pub fn n_mascons(&self) -> usize {
        self.lat_centers.len()
    }

    pub fn n_times(&self) -> usize {
        self.days_middle.len()
    }

    /// Cell labels, `0..n_mascons`
    pub fn labels(&self) -> impl Iterator<Item = usize> {
        0..self.n_mascons()
    }

    pub fn lon_wrap(&self) -> LonWrap {
        self.lon_wrap
    }

    pub fn lat_centers(&self) -> ArrayView1<'_, FloatValue> {
        self.lat_centers.view()
    }

    pub fn lat_spans(&self) -> ArrayView1<'_, FloatValue> {
        self.lat_spans.view()
    }

    /// Longitude centres after wrapping
    pub fn lon_centers(&self) -> ArrayView1<'_, FloatValue> {
        self.lon_centers.view()
    }

    pub fn lon_spans(&self) -> ArrayView1<'_, FloatValue> {
        self.lon_spans.view()
    }

    pub fn locations(&self) -> ArrayView1<'_, i32> {
        self.locations.view()
    }

    pub fn basins(&self) -> ArrayView1<'_, i32> {
        self.basins.view()
    }

    pub fn areas(&self) -> ArrayView1<'_, FloatValue> {
        self.areas.view()
    }

    pub fn cmwe(&self) -> ArrayView2<'_, FloatValue> {
        self.cmwe.view()
    }

    /// Pole-clamped latitude bounds
    pub fn min_lats(&self) -> ArrayView1<'_, FloatValue> {
        self.min_lats.view()
    }

    pub fn max_lats(&self) -> ArrayView1<'_, FloatValue> {
        self.max_lats.view()
    }

    pub fn min_lons(&self) -> ArrayView1<'_, FloatValue> {
        self.min_lons.view()
    }

    pub fn max_lons(&self) -> ArrayView1<'_, FloatValue> {
        self.max_lons.view()
    }

    pub fn days_start(&self) -> &[FloatValue] {
        &self.days_start
    }

    pub fn days_middle(&self) -> &[FloatValue] {
        &self.days_middle
    }

    pub fn days_end(&self) -> &[FloatValue] {
        &self.days_end
    }

    pub fn times_start(&self) -> &[NaiveDateTime] {
        &self.times_start
    }

    pub fn times_middle(&self) -> &[NaiveDateTime] {
        &self.times_middle
    }

    pub fn times_end(&self) -> &[NaiveDateTime] {
        &self.times_end
    }

    /// Selection mask of the cells in basin `basin`
    pub fn select_basin(&self, basin: i32) -> Vec<bool> {
        self.basins.iter().map(|&b| b == basin).collect()
    }

    /// Selection mask of the cells with location code `location`
    pub fn select_location(&self, location: i32) -> Vec<bool> {
        self.locations.iter().map(|&l| l == location).collect()
    }

    pub(crate) fn check_mask(&self, mask: &[bool]) -> MasconResult<()> {
        if mask.len() != self.n_mascons() {
            return Err(MasconError::MaskLength {
                expected: self.n_mascons(),
                actual: mask.len(),
            });
        }
        Ok(())
    }
}

/// Indices of the selected cells, in mascon order
pub(crate) fn selected_indices(mask: &[bool]) -> Vec<usize> {
    mask.iter()
        .enumerate()
        .filter_map(|(i, &selected)| selected.then_some(i))
        .collect()
}

/// Timestamps of reference days: 2002-01-01T00:00 plus the whole hours in each day count
fn reference_times(days: &[FloatValue]) -> MasconResult<Vec<NaiveDateTime>> {
    let epoch = NaiveDate::from_ymd_opt(2002, 1, 1).and_then(|d| d.and_hms_opt(0, 0, 0));
    days.iter()
        .map(|&day| {
            let hours = (day * 24.0).trunc();
            if !hours.is_finite() || hours.abs() > i64::MAX as FloatValue {
                return Err(MasconError::InvalidReferenceDay(day));
            }
            epoch
                .zip(Duration::try_hours(hours as i64))
                .and_then(|(epoch, offset)| epoch.checked_add_signed(offset))
                .ok_or(MasconError::InvalidReferenceDay(day))
        })
        .collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use ndarray::array;

    /// Three cells: two Greenland cells (basin 1) and a south pole cap (basin 2)
    ///
    /// Cell 0 stores its longitude as 310 (-50 in the signed convention), and
    /// its `cmwe` rises by one per day along `days_middle`.
    pub(crate) fn arrays() -> MasconArrays {
        MasconArrays {
            lat_centers: array![70.0, 72.0, -89.8],
            lat_spans: array![2.0, 2.0, 1.0],
            lon_centers: array![310.0, -45.0, 0.0],
            lon_spans: array![2.0, 2.0, 360.0],
            locations: array![1, 1, 2],
            basins: array![1, 1, 2],
            areas: array![1.0, 1.0, 1.0],
            cmwe: array![[0.0, 30.0, 60.0], [10.0, 10.0, 10.0], [5.0, 6.0, 7.0]],
            days_start: array![0.0, 30.0, 60.0],
            days_middle: array![15.0, 45.0, 75.0],
            days_end: array![30.0, 60.0, 90.0],
        }
    }

    pub(crate) fn mascon_set() -> MasconSet {
        MasconSet::new(arrays(), LonWrap::Pm180).unwrap()
    }

    #[test]
    fn longitudes_are_rewrapped() {
        let set = mascon_set();
        assert_eq!(set.lon_centers().to_vec(), vec![-50.0, -45.0, 0.0]);
        assert_eq!(set.min_lons()[0], -51.0);
        assert_eq!(set.max_lons()[0], -49.0);

        let set = MasconSet::new(arrays(), LonWrap::ZeroTo360).unwrap();
        assert_eq!(set.lon_centers().to_vec(), vec![310.0, 315.0, 0.0]);
    }

    #[test]
    fn lat_bounds_are_clamped_at_poles() {
        let set = mascon_set();
        assert_eq!(set.min_lats()[0], 69.0);
        assert_eq!(set.max_lats()[0], 71.0);
        assert_eq!(set.min_lats()[2], -90.0);
        assert_eq!(set.max_lats()[2], -89.5);

        let mut north = arrays();
        north.lat_centers[1] = 89.5;
        let set = MasconSet::new(north, LonWrap::Pm180).unwrap();
        assert_eq!(set.min_lats()[1], 89.5);
        assert_eq!(set.max_lats()[1], 90.0);
    }

    #[test]
    fn reference_days_become_timestamps() {
        let mut arrays = arrays();
        arrays.days_middle[0] = 15.99;
        let set = MasconSet::new(arrays, LonWrap::Pm180).unwrap();
        let expected = |d: u32, h: u32| {
            NaiveDate::from_ymd_opt(2002, 1, d)
                .unwrap()
                .and_hms_opt(h, 0, 0)
                .unwrap()
        };
        assert_eq!(set.times_start()[0], expected(1, 0));
        // Partial hours are truncated
        assert_eq!(set.times_middle()[0], expected(16, 23));
        assert_eq!(set.times_end()[0], expected(31, 0));
    }

    #[test]
    fn selection_masks() {
        let set = mascon_set();
        assert_eq!(set.select_basin(1), vec![true, true, false]);
        assert_eq!(set.select_location(2), vec![false, false, true]);
        assert_eq!(set.select_basin(7), vec![false; 3]);
        assert_eq!(set.labels().collect::<Vec<_>>(), vec![0, 1, 2]);
    }

    #[test]
    fn rejects_inconsistent_arrays() {
        let mut bad = arrays();
        bad.areas = array![1.0, 1.0];
        assert!(matches!(
            MasconSet::new(bad, LonWrap::Pm180),
            Err(MasconError::LengthMismatch { name: "area_km2", .. })
        ));

        let mut bad = arrays();
        bad.cmwe = Array2::zeros((3, 2));
        assert!(matches!(
            MasconSet::new(bad, LonWrap::Pm180),
            Err(MasconError::CmweShape { .. })
        ));

        let mut bad = arrays();
        bad.days_end = array![30.0];
        assert!(matches!(
            MasconSet::new(bad, LonWrap::Pm180),
            Err(MasconError::LengthMismatch { .. })
        ));
    }

    #[test]
    fn lon_wrap_names() {
        assert_eq!("pm180".parse::<LonWrap>().unwrap(), LonWrap::Pm180);
        assert_eq!("0to360".parse::<LonWrap>().unwrap(), LonWrap::ZeroTo360);
        assert_eq!(LonWrap::ZeroTo360.to_string(), "0to360");
        assert!("180".parse::<LonWrap>().is_err());
    }
}
