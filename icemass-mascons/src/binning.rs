//! Binning of scattered point data into mascon cells
//!
//! Each selected cell gathers the samples inside its bounding box, using
//! half-open membership `[min, max)` on both axes and the unclamped bounds
//! `centre ± span / 2`. NaN samples are discarded.
//!
//! Results are compacted: the `j`-th output belongs to the `j`-th selected cell
//! that received at least one sample, and the tail is padded with NaN. Output
//! positions therefore only line up with the selection order when every
//! selected cell is populated.

use crate::errors::{MasconError, MasconResult};
use crate::mascons::{selected_indices, MasconSet};
use icemass_core::FloatValue;
use ndarray::Array1;
use tracing::debug;

/// Plain mean of the samples in each selected cell
pub fn points_to_mascons(
    set: &MasconSet,
    mask: &[bool],
    lats: &[FloatValue],
    lons: &[FloatValue],
    values: &[FloatValue],
) -> MasconResult<Array1<FloatValue>> {
    bin_points(set, mask, lats, lons, values, |samples| {
        samples.iter().map(|s| s.value).sum::<FloatValue>() / samples.len() as FloatValue
    })
}

/// Mean of the samples in each selected cell weighted by `cos(latitude)`
pub fn points_to_mascons_cos_weighted(
    set: &MasconSet,
    mask: &[bool],
    lats: &[FloatValue],
    lons: &[FloatValue],
    values: &[FloatValue],
) -> MasconResult<Array1<FloatValue>> {
    bin_points(set, mask, lats, lons, values, |samples| {
        let (weighted, weights) = samples.iter().fold((0.0, 0.0), |(sum, total), s| {
            let weight = s.lat.to_radians().cos();
            (sum + s.value * weight, total + weight)
        });
        weighted / weights
    })
}

struct Sample {
    lat: FloatValue,
    value: FloatValue,
}

fn extent(values: &[FloatValue]) -> (FloatValue, FloatValue) {
    values
        .iter()
        .fold((FloatValue::INFINITY, FloatValue::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        })
}

fn bin_points<F>(
    set: &MasconSet,
    mask: &[bool],
    lats: &[FloatValue],
    lons: &[FloatValue],
    values: &[FloatValue],
    reduce: F,
) -> MasconResult<Array1<FloatValue>>
where
    F: Fn(&[Sample]) -> FloatValue,
{
    set.check_mask(mask)?;
    if lats.len() != lons.len() || lats.len() != values.len() {
        return Err(MasconError::PointLength {
            lats: lats.len(),
            lons: lons.len(),
            values: values.len(),
        });
    }

    let selected = selected_indices(mask);
    let mut result = Array1::from_elem(selected.len(), FloatValue::NAN);

    let (lat_lo, lat_hi) = extent(lats);
    let (lon_lo, lon_hi) = extent(lons);
    let (lat_centers, lat_spans) = (set.lat_centers(), set.lat_spans());
    let (lon_centers, lon_spans) = (set.lon_centers(), set.lon_spans());

    let mut filled = 0;
    for &i in &selected {
        let (min_lat, max_lat) = (
            lat_centers[i] - lat_spans[i] / 2.0,
            lat_centers[i] + lat_spans[i] / 2.0,
        );
        let (min_lon, max_lon) = (
            lon_centers[i] - lon_spans[i] / 2.0,
            lon_centers[i] + lon_spans[i] / 2.0,
        );
        if lat_lo > max_lat || lat_hi < min_lat || lon_lo > max_lon || lon_hi < min_lon {
            continue;
        }

        let samples: Vec<Sample> = lats
            .iter()
            .zip(lons)
            .zip(values)
            .filter(|&((&lat, &lon), &value)| {
                !value.is_nan()
                    && (min_lat..max_lat).contains(&lat)
                    && (min_lon..max_lon).contains(&lon)
            })
            .map(|((&lat, _), &value)| Sample { lat, value })
            .collect();
        if samples.is_empty() {
            continue;
        }

        result[filled] = reduce(&samples);
        filled += 1;
    }

    debug!(
        selected = selected.len(),
        filled,
        "Binned scattered points into mascons"
    );
    Ok(result)
}
