//! Inventory Reduction
//!
//! Reduces the output of `ceph-volume inventory --format json` to the
//! device records used for selection.

use crate::domain::ports::DeviceRecord;
use crate::error::{Error, Result};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::{debug, info};

// =============================================================================
// Inventory Configuration
// =============================================================================

/// Configuration for inventory reduction
#[derive(Debug, Clone, Default)]
pub struct InventoryConfig {
    /// Keep devices that ceph-volume reports as unavailable
    pub include_unavailable: bool,
}

// =============================================================================
// Raw Inventory
// =============================================================================

/// One device as reported by ceph-volume
#[derive(Debug, Clone, Deserialize)]
struct RawDevice {
    #[serde(default)]
    available: Option<bool>,
    #[serde(default)]
    path: Option<Value>,
    #[serde(default)]
    sys_api: Map<String, Value>,
}

// =============================================================================
// Inventory Reducer
// =============================================================================

/// Turns raw ceph-volume inventory into device records
#[derive(Debug, Clone, Default)]
pub struct InventoryReducer {
    config: InventoryConfig,
}

impl InventoryReducer {
    pub fn new(config: InventoryConfig) -> Self {
        Self { config }
    }

    /// Reduce a ceph-volume inventory JSON document
    pub fn reduce(&self, raw: &str) -> Result<Vec<DeviceRecord>> {
        let devices: Vec<RawDevice> = serde_json::from_str(raw).map_err(|e| {
            Error::InventoryParse(format!("expected a ceph-volume device list: {}", e))
        })?;

        let total = devices.len();
        let mut records = Vec::with_capacity(total);

        for device in devices {
            if device.available == Some(false) && !self.config.include_unavailable {
                debug!("Skipping unavailable device {:?}", device.path);
                continue;
            }
            records.push(self.reduce_device(device)?);
        }

        info!("Reduced inventory to {} of {} devices", records.len(), total);
        Ok(records)
    }

    /// Project the attributes relevant for selection out of `sys_api`
    fn reduce_device(&self, device: RawDevice) -> Result<DeviceRecord> {
        let sys_api = &device.sys_api;
        let projected = json!({
            "path": device.path,
            "size": sys_api.get("human_readable_size"),
            "bare_size": sys_api.get("size"),
            "vendor": sys_api.get("vendor"),
            "model": sys_api.get("model"),
            "rotational": sys_api.get("rotational"),
        });

        serde_json::from_value(projected)
            .map_err(|e| Error::InventoryParse(format!("invalid device attributes: {}", e)))
    }
}
