//! # Workflows Module
//!
//! The highest-level, user-facing layer of the library. Workflows tie the
//! `core` and `engine` layers together into complete procedures: given the
//! obstacle field of a structure and one or two labeling sites, they run the
//! full accessible-volume pipelines and reduce the result to the requested
//! observable, reporting progress along the way.

pub mod pair_distance;
