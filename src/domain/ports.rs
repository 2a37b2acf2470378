//! Domain Ports - Core types and trait definitions for drive group evaluation
//!
//! The device inventory, the drive group spec and the host facts are produced
//! by external systems. These traits define the boundaries to those systems;
//! adapters implement them to provide concrete functionality.

use crate::error::Result;
use crate::hardware::allocation::DriveGroupSpec;
use async_trait::async_trait;
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

// =============================================================================
// Storage Roles
// =============================================================================

/// Storage purpose a device can be assigned to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Primary data devices
    Data,
    /// Write-ahead-log devices
    Wal,
    /// Metadata (db) devices
    Db,
}

impl Role {
    /// All roles in evaluation order
    pub const ALL: [Role; 3] = [Role::Data, Role::Wal, Role::Db];
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Data => write!(f, "data"),
            Role::Wal => write!(f, "wal"),
            Role::Db => write!(f, "db"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = crate::error::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "data" => Ok(Role::Data),
            "wal" => Ok(Role::Wal),
            "db" => Ok(Role::Db),
            other => Err(crate::error::Error::Configuration(format!(
                "unknown role: {}",
                other
            ))),
        }
    }
}

// =============================================================================
// Filter Spec
// =============================================================================

/// Reserved key capping the size of a role's selection
pub const LIMIT_KEY: &str = "limit";

/// A user supplied filter value as it appears in the drive group spec
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    Bool(bool),
    Integer(i64),
    Text(String),
}

impl FilterValue {
    /// Integer interpretation of the value, if it has one
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            FilterValue::Bool(b) => Some(i64::from(*b)),
            FilterValue::Integer(i) => Some(*i),
            FilterValue::Text(s) => s.trim().parse().ok(),
        }
    }
}

impl std::fmt::Display for FilterValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FilterValue::Bool(b) => write!(f, "{}", b),
            FilterValue::Integer(i) => write!(f, "{}", i),
            FilterValue::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<&str> for FilterValue {
    fn from(s: &str) -> Self {
        FilterValue::Text(s.to_string())
    }
}

impl From<i64> for FilterValue {
    fn from(i: i64) -> Self {
        FilterValue::Integer(i)
    }
}

impl From<bool> for FilterValue {
    fn from(b: bool) -> Self {
        FilterValue::Bool(b)
    }
}

/// Filter name to filter value for one role, in declaration order
pub type FilterSpec = IndexMap<String, FilterValue>;

// =============================================================================
// Device Records
// =============================================================================

/// Projection of one physical or logical disk from the host inventory
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceRecord {
    /// Device path (e.g., /dev/sda)
    #[serde(default, deserialize_with = "lenient_string")]
    pub path: Option<String>,
    /// Human readable size (e.g., "20.00 GB")
    #[serde(default, deserialize_with = "lenient_string")]
    pub size: Option<String>,
    /// Size in bytes
    #[serde(default, deserialize_with = "lenient_string")]
    pub bare_size: Option<String>,
    /// Vendor name
    #[serde(default, deserialize_with = "lenient_string")]
    pub vendor: Option<String>,
    /// Model name
    #[serde(default, deserialize_with = "lenient_string")]
    pub model: Option<String>,
    /// Rotational flag, "1" for spinning media
    #[serde(default, deserialize_with = "lenient_string")]
    pub rotational: Option<String>,
}

impl DeviceRecord {
    /// Create a record for the given path
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: Some(path.into()),
            ..Default::default()
        }
    }

    pub fn with_size(mut self, size: impl Into<String>) -> Self {
        self.size = Some(size.into());
        self
    }

    pub fn with_bare_size(mut self, bare_size: impl Into<String>) -> Self {
        self.bare_size = Some(bare_size.into());
        self
    }

    pub fn with_vendor(mut self, vendor: impl Into<String>) -> Self {
        self.vendor = Some(vendor.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_rotational(mut self, rotational: impl Into<String>) -> Self {
        self.rotational = Some(rotational.into());
        self
    }

    /// Non-empty device path, if any
    pub fn device_path(&self) -> Option<&str> {
        self.path.as_deref().filter(|p| !p.is_empty())
    }
}

/// Inventory tools emit the same attribute as a string, a number or a bool
/// depending on the version; keep everything as text.
fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error as _;

    match Option::<serde_json::Value>::deserialize(deserializer)? {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::String(s)) => Ok(Some(s)),
        Some(serde_json::Value::Number(n)) => Ok(Some(n.to_string())),
        Some(serde_json::Value::Bool(b)) => Ok(Some(if b { "1" } else { "0" }.to_string())),
        Some(other) => Err(D::Error::custom(format!(
            "expected a scalar device attribute, got {}",
            other
        ))),
    }
}

// =============================================================================
// Selection
// =============================================================================

/// Set of device paths selected for one role
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Selection {
    devices: BTreeSet<String>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, path: &str) -> bool {
        self.devices.insert(path.to_string())
    }

    /// Keep at most `limit` paths, in path order
    pub(crate) fn truncate(self, limit: usize) -> Self {
        Self {
            devices: self.devices.into_iter().take(limit).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.devices.contains(path)
    }

    /// Selected paths in sorted order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.devices.iter().map(String::as_str)
    }

    pub fn into_paths(self) -> Vec<String> {
        self.devices.into_iter().collect()
    }
}

impl FromIterator<String> for Selection {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self {
            devices: iter.into_iter().collect(),
        }
    }
}

// =============================================================================
// Host Facts
// =============================================================================

/// Facts reported by a host that influence evaluation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostFacts {
    /// Virtualization type ("physical", "kvm", "VirtualBox", ...)
    #[serde(rename = "virtual", default)]
    pub virtualization: Option<String>,
}

// =============================================================================
// Collaborator Ports
// =============================================================================

/// Port for retrieving a host's block device inventory
#[async_trait]
pub trait InventorySource: Send + Sync {
    /// Device inventory of the given host
    async fn inventory(&self, host: &str) -> Result<Vec<DeviceRecord>>;
}

/// Port for retrieving a host's drive group spec
#[async_trait]
pub trait DriveGroupSource: Send + Sync {
    /// Drive group spec applying to the given host
    async fn drive_group(&self, host: &str) -> Result<DriveGroupSpec>;
}

/// Port for retrieving host facts
#[async_trait]
pub trait HostFactsSource: Send + Sync {
    /// Facts for every host in scope, keyed by host name
    async fn facts(&self) -> Result<BTreeMap<String, HostFacts>>;
}

// =============================================================================
// Type Aliases for Arc'd Traits
// =============================================================================

pub type InventorySourceRef = Arc<dyn InventorySource>;
pub type DriveGroupSourceRef = Arc<dyn DriveGroupSource>;
pub type HostFactsSourceRef = Arc<dyn HostFactsSource>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_display() {
        assert_eq!(format!("{}", Role::Data), "data");
        assert_eq!(format!("{}", Role::Wal), "wal");
        assert_eq!(format!("{}", Role::Db), "db");
        assert_eq!("wal".parse::<Role>().unwrap(), Role::Wal);
        assert!("journal".parse::<Role>().is_err());
    }

    #[test]
    fn test_filter_value_from_yaml() {
        let spec: FilterSpec =
            serde_yaml::from_str("size: '10G:29G'\nrotational: 1\nall: true\nlimit: 2\n").unwrap();

        let keys: Vec<&str> = spec.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["size", "rotational", "all", "limit"]);
        assert_eq!(spec["size"], FilterValue::Text("10G:29G".into()));
        assert_eq!(spec["rotational"], FilterValue::Integer(1));
        assert_eq!(spec["all"], FilterValue::Bool(true));
        assert_eq!(spec["limit"].as_integer(), Some(2));
    }

    #[test]
    fn test_filter_value_as_integer() {
        assert_eq!(FilterValue::from("0").as_integer(), Some(0));
        assert_eq!(FilterValue::from(true).as_integer(), Some(1));
        assert_eq!(FilterValue::from("samsung").as_integer(), None);
    }

    #[test]
    fn test_device_record_accepts_mixed_scalars() {
        let record: DeviceRecord = serde_json::from_str(
            r#"{"path": "/dev/sda", "size": "20.00 GB", "bare_size": 21474836480, "rotational": true}"#,
        )
        .unwrap();

        assert_eq!(record.device_path(), Some("/dev/sda"));
        assert_eq!(record.bare_size.as_deref(), Some("21474836480"));
        assert_eq!(record.rotational.as_deref(), Some("1"));
        assert_eq!(record.model, None);
    }

    #[test]
    fn test_empty_path_is_no_path() {
        let record = DeviceRecord::new("");
        assert_eq!(record.device_path(), None);
    }

    #[test]
    fn test_selection_is_sorted() {
        let selection: Selection = ["/dev/sdc", "/dev/sda", "/dev/sdb"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        assert_eq!(
            selection.iter().collect::<Vec<_>>(),
            vec!["/dev/sda", "/dev/sdb", "/dev/sdc"]
        );
        assert_eq!(selection.clone().truncate(1).into_paths(), vec!["/dev/sda"]);
        assert_eq!(
            serde_json::to_string(&selection).unwrap(),
            r#"["/dev/sda","/dev/sdb","/dev/sdc"]"#
        );
    }
}
