use icemass_core::errors::IceMassError;
use thiserror::Error;

/// Error type for mascon operations.
#[derive(Error, Debug)]
pub enum MasconError {
    #[error("Mascon field '{name}' has length {actual}, expected {expected}")]
    LengthMismatch {
        name: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("cmwe has shape {actual:?}, expected [{cells}, {times}]")]
    CmweShape {
        cells: usize,
        times: usize,
        actual: Vec<usize>,
    },
    #[error("A mascon solution needs at least one time step")]
    NoTimes,
    #[error("Selection mask has length {actual}, expected one entry per mascon ({expected})")]
    MaskLength { expected: usize, actual: usize },
    #[error("Point arrays differ in length: lats={lats}, lons={lons}, values={values}")]
    PointLength {
        lats: usize,
        lons: usize,
        values: usize,
    },
    #[error("Cannot parse date '{0}'. Expected YYYY-MM-DD")]
    InvalidDate(String),
    #[error("Unknown longitude convention '{0}'. Expected 'pm180' or '0to360'")]
    UnknownLonWrap(String),
    #[error("Reference day {0} cannot be represented as a timestamp")]
    InvalidReferenceDay(f64),
    #[error(transparent)]
    Core(#[from] IceMassError),
}

/// Convenience type for `Result<T, MasconError>`.
pub type MasconResult<T> = Result<T, MasconError>;
