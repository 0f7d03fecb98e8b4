//! End-to-end model/observation comparison

use crate::aggregate::{process_model, ModelMassChanges};
use crate::basins::BasinLayer;
use crate::config::ComparisonConfig;
use crate::errors::IceMassResult;
use crate::grid::GriddedField;
use crate::observation::{
    difference_observations, ObservationDeltas, ObservationSource, ObservationTable,
};
use crate::report::ComparisonTable;
use crate::residual::{reconcile, Residuals};
use tracing::info;

/// Everything produced by a comparison run
#[derive(Debug, Clone)]
pub struct ComparisonOutput {
    pub observations: ObservationDeltas,
    pub model: ModelMassChanges,
    pub residuals: Residuals,
    pub table: ComparisonTable,
}

/// Run a full comparison
///
/// The model is resampled at the observed dates within the analysis window.
/// Regional observations are read through `regional_source` only when every
/// regional file configured in `config.regional` exists.
pub fn run_comparison(
    config: &ComparisonConfig,
    field: &GriddedField,
    layer: &BasinLayer,
    observations: &ObservationTable,
    regional_source: &impl ObservationSource,
) -> IceMassResult<ComparisonOutput> {
    config.validate()?;
    let layout = config.icesheet.layout();

    let observed = difference_observations(
        observations,
        &config.mass_balance_column,
        config.start_date,
        config.end_date,
    )?;
    info!(
        icesheet = %config.icesheet,
        dates = observed.rows.len(),
        "Differenced observations"
    );

    let model = process_model(field, layer, config, &observed.years())?;

    let regional = if layout.has_regions() {
        config.regional.load_if_complete(
            regional_source,
            &config.mass_balance_column,
            config.start_date,
            config.end_date,
        )?
    } else {
        None
    };

    let residuals = reconcile(&layout, &observed, &model, regional.as_ref())?;
    for (date, residual) in &residuals.totals {
        info!(
            date = %date,
            observed = residual.observed,
            residual_masked = residual.residual_masked,
            residual_unmasked = residual.residual_unmasked,
            "Mass change residual"
        );
    }

    let table = ComparisonTable::build(
        &config.mass_balance_column,
        config.start_date,
        config.end_date,
        &model,
        &residuals,
    )?;

    Ok(ComparisonOutput {
        observations: observed,
        model,
        residuals,
        table,
    })
}
