//! Data models for the inputs of an accessible-volume calculation.

pub mod obstacle;
