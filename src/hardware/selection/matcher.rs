//! Matchers
//!
//! A matcher compares one filter value against one device attribute.
//! Matchers are immutable and hold no per-device state.

use super::extract::{extract, Attribute};
use super::size::{device_size_bytes, SizeRange};
use crate::domain::ports::{DeviceRecord, FilterValue};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Comparison bound to a single filter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Matcher {
    /// Case-sensitive literal substring of the attribute
    Substring {
        value: String,
        key: Attribute,
        fallback: Option<Attribute>,
    },
    /// Integer equality with the attribute
    Equality { value: i64, key: Attribute },
    /// Attribute size falls within the range
    Size {
        range: SizeRange,
        key: Attribute,
        fallback: Option<Attribute>,
    },
    /// Matches every device
    All,
}

impl Matcher {
    pub fn substring(value: impl Into<String>, key: Attribute) -> Self {
        Matcher::Substring {
            value: value.into(),
            key,
            fallback: None,
        }
    }

    /// Integer equality; the filter value must itself be an integer
    pub fn equality(value: &FilterValue, key: Attribute) -> Result<Self> {
        let parsed = value.as_integer().ok_or_else(|| Error::InvalidFilterValue {
            filter: key.key().to_string(),
            value: value.to_string(),
            reason: "expected an integer".into(),
        })?;

        Ok(Matcher::Equality { value: parsed, key })
    }

    /// Size range over the human readable size, falling back to the bare size
    pub fn size(expression: &str) -> Result<Self> {
        Ok(Matcher::Size {
            range: SizeRange::parse(expression)?,
            key: Attribute::Size,
            fallback: Some(Attribute::BareSize),
        })
    }

    pub fn all() -> Self {
        Matcher::All
    }

    /// Check a device against this matcher
    ///
    /// A device whose attribute is absent on a virtual-tolerant host never
    /// matches.
    pub fn matches(&self, device: &DeviceRecord, virtual_tolerant: bool) -> Result<bool> {
        match self {
            Matcher::All => Ok(true),

            Matcher::Substring {
                value,
                key,
                fallback,
            } => {
                let Some(attr) = extract(device, *key, *fallback, virtual_tolerant)? else {
                    return Ok(false);
                };
                Ok(attr.contains(value.as_str()))
            }

            Matcher::Equality { value, key } => {
                let Some(attr) = extract(device, *key, None, virtual_tolerant)? else {
                    return Ok(false);
                };
                let actual: i64 =
                    attr.trim()
                        .parse()
                        .map_err(|_| Error::InvalidAttributeValue {
                            key: key.key().to_string(),
                            value: attr.to_string(),
                        })?;
                Ok(actual == *value)
            }

            Matcher::Size {
                range,
                key,
                fallback,
            } => {
                let Some(attr) = extract(device, *key, *fallback, virtual_tolerant)? else {
                    return Ok(false);
                };
                let bytes = device_size_bytes(key.key(), attr)?;
                let matched = range.contains(bytes);
                if !matched {
                    debug!("Disk size {} didn't match size filter {}", attr, range);
                }
                Ok(matched)
            }
        }
    }
}
