use thiserror::Error;

/// Error type for invalid operations.
#[derive(Error, Debug)]
pub enum IceMassError {
    #[error("{0}")]
    Error(String),
    #[error("Extrapolation is not allowed. Target={target}, interpolation range={min} to {max}")]
    ExtrapolationNotAllowed { target: f64, min: f64, max: f64 },
    #[error("The selected dates {start} or {end} are out of range. Model data time range is from {min} to {max}")]
    DateOutOfRange {
        start: f64,
        end: f64,
        min: f64,
        max: f64,
    },
    #[error("The column '{0}' does not exist in the observation table")]
    MissingColumn(String),
    #[error("No data available for the start date {0}")]
    MissingStartDate(f64),
    #[error("Invalid icesheet value '{0}'. Must be 'GIS' or 'AIS'")]
    UnknownIceSheet(String),
    #[error("Unsupported calendar '{0}'")]
    UnknownCalendar(String),
    #[error("Invalid date {year:04}-{month:02}-{day:02} in the {calendar} calendar")]
    InvalidDate {
        year: i32,
        month: u32,
        day: u32,
        calendar: String,
    },
    #[error("Cannot parse time units '{0}'. Expected '<unit> since <YYYY-MM-DD[ HH:MM:SS]>'")]
    InvalidTimeUnits(String),
    #[error("Cannot parse date key '{0}'")]
    InvalidDateKey(String),
    #[error("Invalid grid: {0}")]
    InvalidGrid(String),
    #[error("Shape mismatch for {name}: expected {expected}, got {actual}")]
    ShapeMismatch {
        name: String,
        expected: String,
        actual: String,
    },
    #[error("Basin feature {index} is missing the '{column}' attribute")]
    MissingAttribute { index: usize, column: String },
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Failed to load observations from {path}: {reason}")]
    ObservationLoad { path: String, reason: String },
}

/// Convenience type for `Result<T, IceMassError>`.
pub type IceMassResult<T> = Result<T, IceMassError>;
