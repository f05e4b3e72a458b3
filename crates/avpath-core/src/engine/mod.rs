//! # Engine Module
//!
//! This module implements the accessible-volume computation pipeline, providing
//! the stateful framework that turns an obstacle field and a source coordinate
//! into reachability information and distance statistics.
//!
//! ## Overview
//!
//! The engine orchestrates the complete AV calculation. It rasterizes obstacles
//! into the grid, derives the implicit voxel graph, runs the shortest-path
//! searches, extracts per-voxel scalar fields, and reduces one or two accessible
//! volumes to distance and FRET observables.
//!
//! ## Architecture
//!
//! The module is organized into specialized submodules that handle different
//! stages of the pipeline:
//!
//! - **Configuration** ([`config`]) - AV parameters, validation, and TOML loading
//! - **Obstacle Rasterization** ([`sampler`]) - Sphere-to-voxel occupancy sampling
//! - **Voxel Graph** ([`graph`]) - Neighbor connectivity and tile classification
//! - **Path Search** ([`search`]) - Dijkstra and A* over the voxel graph, plus
//!   predecessor backtracking
//! - **Feature Extraction** ([`features`]) - Dense export of per-voxel quantities
//! - **Accessible Volume** ([`volume`]) - Orchestration of one labeling site
//! - **Distance Sampling** ([`distance`]) - Monte Carlo reductions over AV pairs
//! - **Progress Monitoring** ([`progress`]) - Callback-based progress reporting
//! - **Error Handling** ([`error`]) - Engine-specific error types

pub mod config;
pub mod distance;
pub mod error;
pub mod features;
pub mod graph;
pub mod progress;
pub mod sampler;
pub mod search;
pub mod volume;
