//! Selection Module
//!
//! Parses drive group filters and evaluates them against a device
//! inventory to select devices for a storage role.

pub mod extract;
pub mod filter;
pub mod matcher;
pub mod selector;
pub mod size;

pub use extract::*;
pub use filter::*;
pub use matcher::*;
pub use selector::*;
pub use size::*;
