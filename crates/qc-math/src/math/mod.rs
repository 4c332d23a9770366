//! Math module tree.

pub mod nig;
pub mod normal;
