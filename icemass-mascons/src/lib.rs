//! GRACE mascon solutions
//!
//! Access to irregular-grid gravimetric solutions: per-cell geometry and
//! labels, binning of scattered point data into mascon cells and changes in
//! equivalent water thickness between two dates.

pub mod binning;
pub mod delta;
pub mod mascons;

pub mod errors;
