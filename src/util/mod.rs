//! Shared utilities.
//!
//! Dirty-bit caching for derived matrices and angle normalization.

pub mod angle;
pub mod cached;
