//! Hardware Module
//!
//! Provides device selection, inventory discovery, and drive group
//! allocation.

pub mod allocation;
pub mod discovery;
pub mod selection;

pub use allocation::*;
pub use discovery::*;
pub use selection::*;
