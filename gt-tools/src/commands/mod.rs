//! Command implementations for gt-tools

pub mod clip;
pub mod skeleton;
