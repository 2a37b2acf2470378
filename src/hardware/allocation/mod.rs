//! Allocation Module
//!
//! Drive group specs and their evaluation into per-role device selections.

pub mod drive_group;
pub mod evaluator;

pub use drive_group::*;
pub use evaluator::*;
