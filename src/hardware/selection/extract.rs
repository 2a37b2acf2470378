//! Attribute Extraction
//!
//! Reads a single attribute from a device record, with an optional fallback
//! attribute and tolerance for virtual hosts whose inventory leaves fields
//! unpopulated.

use crate::domain::ports::DeviceRecord;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Device attribute a matcher can compare against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Attribute {
    Path,
    Size,
    BareSize,
    Vendor,
    Model,
    Rotational,
}

impl Attribute {
    /// Attribute name as it appears in the inventory
    pub fn key(&self) -> &'static str {
        match self {
            Attribute::Path => "path",
            Attribute::Size => "size",
            Attribute::BareSize => "bare_size",
            Attribute::Vendor => "vendor",
            Attribute::Model => "model",
            Attribute::Rotational => "rotational",
        }
    }

    /// Raw value on the device; empty strings count as absent
    pub fn lookup<'a>(&self, device: &'a DeviceRecord) -> Option<&'a str> {
        let value = match self {
            Attribute::Path => &device.path,
            Attribute::Size => &device.size,
            Attribute::BareSize => &device.bare_size,
            Attribute::Vendor => &device.vendor,
            Attribute::Model => &device.model,
            Attribute::Rotational => &device.rotational,
        };
        value.as_deref().filter(|v| !v.is_empty())
    }
}

impl std::fmt::Display for Attribute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Extract `key` (or `fallback`) from a device
///
/// Returns `Ok(None)` when neither attribute is present on a virtual-tolerant
/// host; matchers treat that as a non-match. On physical hosts a missing
/// attribute is an inventory fault and fails with [`Error::MissingAttribute`].
pub fn extract<'a>(
    device: &'a DeviceRecord,
    key: Attribute,
    fallback: Option<Attribute>,
    virtual_tolerant: bool,
) -> Result<Option<&'a str>> {
    let value = key
        .lookup(device)
        .or_else(|| fallback.and_then(|fallback| fallback.lookup(device)));

    if value.is_some() {
        return Ok(value);
    }

    if virtual_tolerant {
        info!(
            "Virtual environment, not failing on missing keys: {} and {} appear not to be present",
            key,
            fallback.map(|f| f.key()).unwrap_or("None")
        );
        return Ok(None);
    }

    Err(Error::MissingAttribute {
        key: key.key().to_string(),
        fallback: fallback.map(|f| f.key().to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_key_found() {
        let device = DeviceRecord::new("/dev/vdb").with_model("samsung");
        for tolerant in [true, false] {
            assert_eq!(
                extract(&device, Attribute::Model, None, tolerant).unwrap(),
                Some("samsung")
            );
        }
    }

    #[test]
    fn test_fallback_used_when_key_missing_or_empty() {
        let device = DeviceRecord::new("/dev/vdb").with_bare_size("21474836480");
        assert_eq!(
            extract(&device, Attribute::Size, Some(Attribute::BareSize), false).unwrap(),
            Some("21474836480")
        );

        let device = device.with_size("");
        assert_eq!(
            extract(&device, Attribute::Size, Some(Attribute::BareSize), false).unwrap(),
            Some("21474836480")
        );
    }

    #[test]
    fn test_key_preferred_over_fallback() {
        let device = DeviceRecord::new("/dev/vdb")
            .with_size("20.00 GB")
            .with_bare_size("21474836480");
        assert_eq!(
            extract(&device, Attribute::Size, Some(Attribute::BareSize), false).unwrap(),
            Some("20.00 GB")
        );
    }

    #[test]
    fn test_missing_on_virtual_host_is_sentinel() {
        let device = DeviceRecord::new("/dev/vdb");
        assert_eq!(
            extract(&device, Attribute::Vendor, None, true).unwrap(),
            None
        );
    }

    #[test]
    fn test_missing_on_physical_host_fails() {
        let device = DeviceRecord::new("/dev/vdb");
        assert_matches!(
            extract(&device, Attribute::Size, Some(Attribute::BareSize), false),
            Err(Error::MissingAttribute { key, fallback })
                if key == "size" && fallback.as_deref() == Some("bare_size")
        );
        assert_matches!(
            extract(&device, Attribute::Model, None, false),
            Err(Error::MissingAttribute { fallback: None, .. })
        );
    }
}
