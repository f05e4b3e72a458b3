//! Writing dense scalar fields to standard density-map formats.
//!
//! The engine exports per-voxel quantities as [`DensityField`]s
//! (`crate::core::grid::field`); this module serializes them for external
//! visualization tools. Only writing is supported; reading foreign maps is the
//! concern of the structure subsystem.

pub mod dx;
pub mod traits;
