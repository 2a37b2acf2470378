//! Domain Module
//!
//! Core domain types and port traits for drive group evaluation.

pub mod ports;

pub use ports::*;
