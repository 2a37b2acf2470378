//! Device Selector
//!
//! Reduces a host's device inventory to the set of device paths matching a
//! role's filter map.
//!
//! Each filter is evaluated independently against the full inventory and
//! contributes its matches to one accumulating set, so filters within a role
//! combine by union. The optional `limit` entry caps the result afterwards.

use super::filter::{self, Filter};
use crate::domain::ports::{DeviceRecord, FilterSpec, FilterValue, Selection, LIMIT_KEY};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

// =============================================================================
// Selector Configuration
// =============================================================================

/// Configuration for the device selector
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectorConfig {
    /// Treat missing device attributes as non-matching instead of fatal.
    /// Set when the host is virtualized.
    pub virtual_tolerant: bool,
    /// Accept `rotates` as a synonym for `rotational`
    pub accept_legacy_names: bool,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            virtual_tolerant: false,
            accept_legacy_names: true,
        }
    }
}

impl SelectorConfig {
    pub fn virtual_tolerant(mut self, virtual_tolerant: bool) -> Self {
        self.virtual_tolerant = virtual_tolerant;
        self
    }

    pub fn accept_legacy_names(mut self, accept: bool) -> Self {
        self.accept_legacy_names = accept;
        self
    }
}

// =============================================================================
// Device Selector
// =============================================================================

/// Selects devices from an inventory for one role at a time
#[derive(Debug, Clone, Default)]
pub struct DeviceSelector {
    config: SelectorConfig,
}

impl DeviceSelector {
    pub fn new(config: SelectorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SelectorConfig {
        &self.config
    }

    /// Select the devices matching any filter in `spec`
    ///
    /// Fails without a partial result if a filter name is unsupported, a
    /// filter value is malformed, a scanned device has no path, or a device
    /// lacks a required attribute on a non-virtual host.
    pub fn select(&self, spec: &FilterSpec, inventory: &[DeviceRecord]) -> Result<Selection> {
        let limit = parse_limit(spec.get(LIMIT_KEY))?;
        filter::validate(spec, self.config.accept_legacy_names)?;

        let mut selection = Selection::new();

        for (name, value) in spec.iter().filter(|(name, _)| name.as_str() != LIMIT_KEY) {
            let filter = Filter::with_legacy_names(name, value, self.config.accept_legacy_names)?;
            let Some(matcher) = filter.matcher() else {
                continue;
            };

            debug!("Scanning with filter {}:{}", name, value);

            for device in inventory {
                let path = device.device_path().ok_or_else(|| Error::MissingPath {
                    device: format!("{:?}", device),
                })?;

                if matcher.matches(device, self.config.virtual_tolerant)? {
                    debug!("Found matching disk: {}", path);
                    selection.insert(path);
                }
            }
        }

        match limit {
            Some(limit) if selection.len() > limit => {
                debug!(
                    "Limiting selection of {} disks to {}",
                    selection.len(),
                    limit
                );
                Ok(selection.truncate(limit))
            }
            _ => Ok(selection),
        }
    }
}

/// Select with default settings and the given virtualization flag
pub fn select(
    spec: &FilterSpec,
    inventory: &[DeviceRecord],
    virtual_tolerant: bool,
) -> Result<Selection> {
    DeviceSelector::new(SelectorConfig::default().virtual_tolerant(virtual_tolerant))
        .select(spec, inventory)
}

/// A limit of zero is the same as no limit
fn parse_limit(value: Option<&FilterValue>) -> Result<Option<usize>> {
    let Some(value) = value else {
        return Ok(None);
    };

    let limit = match value {
        FilterValue::Integer(i) => usize::try_from(*i).ok(),
        FilterValue::Text(s) => s.trim().parse::<usize>().ok(),
        FilterValue::Bool(_) => None,
    }
    .ok_or_else(|| Error::InvalidLimit {
        value: value.to_string(),
    })?;

    Ok((limit > 0).then_some(limit))
}
