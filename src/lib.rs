//! Drive Group Selector
//!
//! Selects the block devices of a storage host that a drive group assigns
//! to each storage role (data, write-ahead log, metadata).
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                     Drive Group Evaluator                        │
//! ├──────────────────────────────────────────────────────────────────┤
//! │  ┌──────────────┐   ┌──────────────┐   ┌──────────────────────┐  │
//! │  │  Drive Group │   │  Inventory   │   │     Host Facts       │  │
//! │  │    Source    │   │   Source     │   │  (virtualization)    │  │
//! │  └──────┬───────┘   └──────┬───────┘   └──────────┬───────────┘  │
//! │         └──────────────────┼──────────────────────┘              │
//! │                            │                                     │
//! │                ┌───────────┴───────────┐                         │
//! │                │    Device Selector    │                         │
//! │                │ filters → matchers →  │                         │
//! │                │  attribute extraction │                         │
//! │                └───────────────────────┘                         │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`hardware`]: Device selection, inventory discovery, and drive groups
//! - [`domain`]: Core domain types and collaborator ports
//! - [`error`]: Error types and handling

pub mod domain;
pub mod error;
pub mod hardware;

// Re-export commonly used types
pub use domain::ports::{
    DeviceRecord, FilterSpec, FilterValue, HostFacts, Role, Selection,
    DriveGroupSource, HostFactsSource, InventorySource,
};

pub use error::{Error, ErrorKind, Result};

pub use hardware::{
    select, DeviceSelector, SelectorConfig, Filter, FilterName, Matcher, Size, SizeRange, SizeUnit,
    DriveGroup, DriveGroupEvaluator, DriveGroupSelection, DriveGroupSpec,
    InventoryConfig, InventoryReducer,
    FileDriveGroupSource, FileHostFactsSource, FileInventorySource, StaticHostFacts,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
