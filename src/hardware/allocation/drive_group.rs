//! Drive Groups
//!
//! A drive group declares, per storage role, which devices of a host to
//! use. Evaluating it runs the device selector once per role.

use crate::domain::ports::{DeviceRecord, FilterSpec, Role, Selection};
use crate::error::Result;
use crate::hardware::selection::{filter, DeviceSelector, SelectorConfig};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

// =============================================================================
// Drive Group Spec
// =============================================================================

/// Declarative device assignment for one host
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DriveGroupSpec {
    /// Host target expression this spec applies to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,

    /// Filters for primary data devices
    #[serde(default)]
    pub data_devices: FilterSpec,

    /// Filters for write-ahead-log devices
    #[serde(default)]
    pub wal_devices: FilterSpec,

    /// Filters for metadata devices
    #[serde(default)]
    pub db_devices: FilterSpec,

    /// WAL partitions per WAL device
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wal_slots: Option<u32>,

    /// DB partitions per DB device
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db_slots: Option<u32>,

    /// Encrypt the provisioned devices
    #[serde(default)]
    pub encryption: bool,

    /// Object store backend (e.g., bluestore)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub objectstore: Option<String>,
}

impl DriveGroupSpec {
    /// Parse a spec from YAML (or JSON)
    pub fn from_yaml(raw: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(raw)?)
    }

    /// Filter map for a role
    pub fn filters(&self, role: Role) -> &FilterSpec {
        match role {
            Role::Data => &self.data_devices,
            Role::Wal => &self.wal_devices,
            Role::Db => &self.db_devices,
        }
    }

    /// Check filter names of every role
    pub fn validate(&self, accept_legacy_names: bool) -> Result<()> {
        for role in Role::ALL {
            filter::validate(self.filters(role), accept_legacy_names)?;
        }
        Ok(())
    }
}

// =============================================================================
// Drive Group Selection
// =============================================================================

/// Result of evaluating a drive group on one host
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriveGroupSelection {
    /// Host the inventory came from
    pub host: String,
    pub data_devices: Selection,
    pub wal_devices: Selection,
    pub db_devices: Selection,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wal_slots: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db_slots: Option<u32>,
    pub encryption: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub objectstore: Option<String>,
    /// Whether missing device attributes were tolerated
    pub virtual_tolerant: bool,
    /// Evaluation timestamp
    pub evaluated_at: DateTime<Utc>,
}

impl DriveGroupSelection {
    /// Devices selected for a role
    pub fn devices(&self, role: Role) -> &Selection {
        match role {
            Role::Data => &self.data_devices,
            Role::Wal => &self.wal_devices,
            Role::Db => &self.db_devices,
        }
    }
}

// =============================================================================
// Drive Group
// =============================================================================

/// Evaluates drive group specs against a device inventory
#[derive(Debug, Clone, Default)]
pub struct DriveGroup {
    selector: DeviceSelector,
}

impl DriveGroup {
    pub fn new(config: SelectorConfig) -> Self {
        Self {
            selector: DeviceSelector::new(config),
        }
    }

    pub fn config(&self) -> &SelectorConfig {
        self.selector.config()
    }

    /// Select devices for a single role
    pub fn evaluate_role(
        &self,
        host: &str,
        role: Role,
        spec: &DriveGroupSpec,
        inventory: &[DeviceRecord],
    ) -> Result<Selection> {
        info!("Scanning for {} devices on host {}", role, host);
        let selection = self.selector.select(spec.filters(role), inventory)?;
        info!(
            "Selected {} {} devices on host {}",
            selection.len(),
            role,
            host
        );
        Ok(selection)
    }

    /// Select devices for every role
    ///
    /// Filter names of all roles are validated before any role is scanned.
    pub fn evaluate(
        &self,
        host: &str,
        spec: &DriveGroupSpec,
        inventory: &[DeviceRecord],
    ) -> Result<DriveGroupSelection> {
        spec.validate(self.config().accept_legacy_names)?;

        Ok(DriveGroupSelection {
            host: host.to_string(),
            data_devices: self.evaluate_role(host, Role::Data, spec, inventory)?,
            wal_devices: self.evaluate_role(host, Role::Wal, spec, inventory)?,
            db_devices: self.evaluate_role(host, Role::Db, spec, inventory)?,
            wal_slots: spec.wal_slots,
            db_slots: spec.db_slots,
            encryption: spec.encryption,
            objectstore: spec.objectstore.clone(),
            virtual_tolerant: self.config().virtual_tolerant,
            evaluated_at: Utc::now(),
        })
    }
}
