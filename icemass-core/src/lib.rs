//! Comparison of modelled and observed ice-sheet mass change
//!
//! Gridded model thickness is resampled onto observation dates, converted to
//! mass change against the analysis start, masked by drainage basin polygons
//! and compared against IMBIE cumulative mass balance.

pub mod aggregate;
pub mod basins;
pub mod calendar;
pub mod config;
pub mod datekey;
pub mod grid;
pub mod interpolate;
pub mod observation;
pub mod pipeline;
pub mod report;
pub mod resample;
pub mod residual;

pub mod errors;

pub type FloatValue = f64;
