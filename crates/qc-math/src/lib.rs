//! QC Sentinel math utilities.

pub mod math;

pub use math::nig::*;
pub use math::normal::*;
