//! Change in equivalent water thickness between two dates

use crate::errors::{MasconError, MasconResult};
use crate::mascons::{selected_indices, MasconSet};
use chrono::NaiveDate;
use icemass_core::interpolate::{Extrapolation, LinearInterpolator};
use icemass_core::FloatValue;
use ndarray::{Array1, Axis};
use tracing::error;

/// Days between 2001-12-31 and a `YYYY-MM-DD` date, so 2002-01-01 is day 1
pub fn days_since_jan0_2002(date: &str) -> MasconResult<FloatValue> {
    let parsed = NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| MasconError::InvalidDate(date.to_string()))?;
    let epoch = NaiveDate::from_ymd_opt(2001, 12, 31)
        .ok_or_else(|| MasconError::InvalidDate("2001-12-31".to_string()))?;
    Ok(parsed.signed_duration_since(epoch).num_days() as FloatValue)
}

/// Change in `cmwe` of the selected cells between `start_date` and `end_date`
///
/// Each selected row is linearly interpolated along the mid-interval reference
/// days, extrapolating into the first and last half intervals. Rows keep their
/// mascon order.
///
/// Returns `Ok(None)`, after logging an error, when `start_date` precedes the
/// first record or `end_date` follows the last one.
pub fn calc_mascon_delta_cmwe(
    set: &MasconSet,
    start_date: &str,
    end_date: &str,
    mask: &[bool],
) -> MasconResult<Option<Array1<FloatValue>>> {
    set.check_mask(mask)?;
    let t0 = days_since_jan0_2002(start_date)?;
    let t1 = days_since_jan0_2002(end_date)?;

    let (first, last) = match (set.days_start().first(), set.days_end().last()) {
        (Some(&first), Some(&last)) => (first, last),
        _ => return Err(MasconError::NoTimes),
    };
    if t0 < first {
        error!(
            start_date,
            earliest = %set.times_start()[0],
            "Start date is before the earliest date in the mascon record"
        );
        return Ok(None);
    }
    if t1 > last {
        error!(
            end_date,
            latest = %set.times_end()[set.n_times() - 1],
            "End date is after the latest date in the mascon record"
        );
        return Ok(None);
    }

    let rows = set.cmwe().select(Axis(0), &selected_indices(mask));
    let interpolator = LinearInterpolator::new(set.days_middle(), Extrapolation::Linear)?;
    let start = interpolator.interpolate_along(rows.view(), Axis(1), t0)?;
    let end = interpolator.interpolate_along(rows.view(), Axis(1), t1)?;
    Ok(Some(end - start))
}
