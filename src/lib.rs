//! Ice-sheet mass-change comparison
//!
//! Re-exports the comparison core and the GRACE mascon accessor.

pub use icemass_core;
pub use icemass_mascons;

pub use icemass_core::config::ComparisonConfig;
pub use icemass_core::errors::{IceMassError, IceMassResult};
pub use icemass_core::pipeline::{run_comparison, ComparisonOutput};
pub use icemass_mascons::errors::{MasconError, MasconResult};
pub use icemass_mascons::mascons::MasconSet;
