//! # avpath Core Library
//!
//! A high-performance library for grid-based accessible-volume (AV) calculations:
//! given an obstacle field derived from a molecular structure and a labeling-site
//! coordinate, it computes the sterically reachable volume around that site and
//! reduces it to geometric and FRET-relevant quantities.
//!
//! ## Architectural Philosophy
//!
//! The library is designed with a strict three-layer architecture to ensure a clear
//! separation of concerns, making it modular, testable, and extensible.
//!
//! - **[`core`]: The Foundation.** Contains stateless data models (obstacles, the
//!   voxel grid and its tiles), pure FRET conversion math, and volumetric I/O
//!   utilities.
//!
//! - **[`engine`]: The Logic Core.** This stateful layer orchestrates the AV
//!   computation. It includes the obstacle rasterizer, the implicit voxel graph,
//!   the shortest-path searches (Dijkstra and A*), per-voxel feature extraction,
//!   and the Monte Carlo distance sampler.
//!
//! - **[`workflows`]: The Public API.** This is the highest-level, user-facing
//!   layer. It ties the `engine` and `core` together to execute complete
//!   procedures, such as computing the dye-pair distance between two labeling
//!   sites of a structure.

pub mod core;
pub mod engine;
pub mod workflows;
