//! Cooling control module.
//!
//! Provides fan profile normalization for the device's six-point curves.

mod profile;

pub use profile::{normalize_profile, prepare_profile};
