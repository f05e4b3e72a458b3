//! # Core Module
//!
//! This module provides the fundamental building blocks for accessible-volume
//! calculations, serving as the stateless foundation of the library.
//!
//! ## Overview
//!
//! The core module implements the essential data structures and pure functions
//! required to represent a voxelized search domain around a labeling site. It
//! carries no orchestration logic; everything here is a value type or a pure
//! computation over value types.
//!
//! ## Architecture
//!
//! The module is organized into specialized submodules:
//!
//! - **Obstacle Representation** ([`models`]) - Read-only obstacle spheres supplied
//!   by an external structure subsystem
//! - **Voxel Grid** ([`grid`]) - Grid geometry, tiles, per-tile named values, and
//!   dense scalar fields
//! - **FRET Math** ([`fret`]) - Distance/efficiency conversions parameterized by the
//!   Förster radius
//! - **Volumetric I/O** ([`io`]) - Writing dense scalar fields to standard
//!   density-map formats for external visualization

pub mod fret;
pub mod grid;
pub mod io;
pub mod models;
