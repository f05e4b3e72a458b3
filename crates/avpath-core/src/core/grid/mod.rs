//! The voxel grid underlying an accessible-volume calculation.
//!
//! A grid is a cube of voxels ("tiles") centered on the path origin. The
//! [`header`] defines the geometry and index math, [`tile`] holds the per-voxel
//! search state and named values, [`map`] owns the dense tile and occupancy
//! storage, and [`field`] is the dense scalar-field container produced when tile
//! values are exported.

pub mod field;
pub mod header;
pub mod map;
pub mod tile;
