//! Shared utilities for the gt-tools CLI

pub mod table;
pub mod tree;

pub use table::*;
pub use tree::*;
