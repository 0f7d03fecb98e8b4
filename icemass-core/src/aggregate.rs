//! Aggregation of per-point mass change into basin, region and ice-sheet totals

use crate::basins::{build_join, BasinLayer, SpatialJoinIndex};
use crate::calendar::check_datarange;
use crate::config::ComparisonConfig;
use crate::datekey::DateKey;
use crate::errors::{IceMassError, IceMassResult};
use crate::grid::GriddedField;
use crate::resample::ModelResampler;
use crate::FloatValue;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Modelled mass change (Gt) at one analysis date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MassChangeRecord {
    /// Sum over every grid point
    pub unmasked_total: FloatValue,
    /// Sum over points inside basin polygons (equal to the sum of `basins`)
    pub masked_total: FloatValue,
    /// Per-basin totals, for basins containing at least one grid point
    pub basins: BTreeMap<String, FloatValue>,
    /// Per-region totals when the ice sheet defines regions
    pub regions: Option<BTreeMap<String, FloatValue>>,
}

/// Model results keyed by analysis date
pub type ModelMassChanges = BTreeMap<DateKey, MassChangeRecord>;

/// Sum per-point mass changes by basin and region
///
/// `deltas` must be in the same point order the join was built with.
pub fn aggregate(join: &SpatialJoinIndex, deltas: &[FloatValue]) -> IceMassResult<MassChangeRecord> {
    if deltas.len() != join.n_points() {
        return Err(IceMassError::ShapeMismatch {
            name: "mass change values".to_string(),
            expected: format!("{} grid points", join.n_points()),
            actual: deltas.len().to_string(),
        });
    }

    let unmasked_total = deltas.iter().filter(|d| !d.is_nan()).sum();

    let mut basin_sums: Vec<Option<FloatValue>> = vec![None; join.basin_labels().len()];
    let mut region_sums: Option<Vec<Option<FloatValue>>> =
        join.region_labels().map(|labels| vec![None; labels.len()]);

    for entry in join.entries() {
        let value = deltas[entry.point];
        if value.is_nan() {
            continue;
        }
        *basin_sums[entry.basin].get_or_insert(0.0) += value;
        if let (Some(sums), Some(region)) = (region_sums.as_mut(), entry.region) {
            *sums[region].get_or_insert(0.0) += value;
        }
    }

    let basins = collect_sums(join.basin_labels(), &basin_sums);
    let masked_total = basins.values().sum();
    let regions = match (join.region_labels(), region_sums) {
        (Some(labels), Some(sums)) => Some(collect_sums(labels, &sums)),
        _ => None,
    };

    Ok(MassChangeRecord {
        unmasked_total,
        masked_total,
        basins,
        regions,
    })
}

fn collect_sums(labels: &[String], sums: &[Option<FloatValue>]) -> BTreeMap<String, FloatValue> {
    labels
        .iter()
        .zip(sums)
        .filter_map(|(label, sum)| sum.map(|s| (label.clone(), s)))
        .collect()
}

/// Compute modelled mass change at each date in `dates`
///
/// The analysis window is checked against the model's time coverage first; the
/// spatial join and the reference snapshot are built once and shared by every
/// date.
pub fn process_model(
    field: &GriddedField,
    layer: &BasinLayer,
    config: &ComparisonConfig,
    dates: &[FloatValue],
) -> IceMassResult<ModelMassChanges> {
    check_datarange(field.time(), config.start_date, config.end_date)?;

    let join = build_join(&field.points(), layer);
    let resampler = ModelResampler::new(
        field,
        config.start_date,
        config.scaling(),
        config.extrapolation,
    )?;

    let mut results = ModelMassChanges::new();
    for &date in dates {
        let deltas = resampler.mass_change(date)?.to_vec();
        let record = aggregate(&join, &deltas)?;
        debug!(
            date,
            masked = record.masked_total,
            unmasked = record.unmasked_total,
            "Aggregated model mass change"
        );
        results.insert(DateKey::new(date)?, record);
    }
    Ok(results)
}
