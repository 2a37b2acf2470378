//! Discovery Module
//!
//! Turns the raw outputs of the external collaborators (device inventory,
//! host facts, drive group specs) into the inputs of device selection.

pub mod facts;
pub mod inventory;
pub mod source;

pub use facts::*;
pub use inventory::*;
pub use source::*;
