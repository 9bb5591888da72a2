//! Eclipse account batch runner
//!
//! Input file loading and the simulated module set used by the binary.

pub mod files;
pub mod simulated;
