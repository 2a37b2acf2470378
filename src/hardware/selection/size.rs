//! Size Expressions
//!
//! Parses compound size filters and compares them against the human
//! readable sizes reported by the device inventory.
//!
//! Four shapes are supported:
//!
//! ```text
//! 10G:50G     at least 10 GB and at most 50 GB
//! 50G:        at least 50 GB
//! :50G        at most 50 GB
//! 20G         exactly 20 GB
//! ```
//!
//! Only power-of-ten units are accepted: `M`/`MB`, `G`/`GB` and `T`/`TB`.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::warn;

// =============================================================================
// Units
// =============================================================================

/// Canonical size unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SizeUnit {
    MB,
    GB,
    TB,
}

impl SizeUnit {
    /// Parse and normalize a raw unit suffix ("G" and "GB" both yield GB)
    pub fn parse(suffix: &str) -> Result<Self> {
        match suffix {
            "M" | "MB" => Ok(SizeUnit::MB),
            "G" | "GB" => Ok(SizeUnit::GB),
            "T" | "TB" => Ok(SizeUnit::TB),
            other => Err(Error::UnitNotSupported {
                unit: other.to_string(),
            }),
        }
    }

    /// Canonical spelling of this unit
    pub fn as_str(&self) -> &'static str {
        match self {
            SizeUnit::MB => "MB",
            SizeUnit::GB => "GB",
            SizeUnit::TB => "TB",
        }
    }

    /// Bytes per unit (decimal)
    pub fn multiplier(&self) -> u64 {
        match self {
            SizeUnit::MB => 1_000_000,
            SizeUnit::GB => 1_000_000_000,
            SizeUnit::TB => 1_000_000_000_000,
        }
    }
}

impl std::fmt::Display for SizeUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalize a raw unit suffix to its canonical spelling
pub fn normalize_unit(suffix: &str) -> Result<&'static str> {
    SizeUnit::parse(suffix).map(|unit| unit.as_str())
}

// =============================================================================
// Size
// =============================================================================

/// A whole number of units, as written in a size filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Size {
    pub value: u64,
    pub unit: SizeUnit,
}

impl Size {
    pub fn new(value: u64, unit: SizeUnit) -> Self {
        Self { value, unit }
    }

    /// Size in bytes
    pub fn to_bytes(&self) -> f64 {
        self.value as f64 * self.unit.multiplier() as f64
    }

    /// Parse a single `<digits><unit>` token
    fn parse_token(token: &str, expression: &str) -> Result<Self> {
        let digits_end = token
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(token.len());
        let (digits, suffix) = token.split_at(digits_end);

        let invalid = |reason: &str| Error::SizeExpression {
            expression: expression.to_string(),
            reason: reason.to_string(),
        };

        if digits.is_empty() {
            return Err(invalid("expected <digits><unit>"));
        }
        if suffix.is_empty() {
            return Err(invalid("missing unit"));
        }
        if !suffix.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(invalid("expected <digits><unit>"));
        }

        let unit = SizeUnit::parse(suffix)?;
        let value = digits
            .parse()
            .map_err(|_| invalid("number out of range"))?;

        Ok(Size::new(value, unit))
    }
}

impl std::fmt::Display for Size {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.value, self.unit)
    }
}

// =============================================================================
// Size Range
// =============================================================================

/// Parsed size filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SizeRange {
    /// Exactly this size
    Exact(Size),
    /// This size or larger
    AtLeast(Size),
    /// This size or smaller
    AtMost(Size),
    /// Inclusive on both ends
    Between { low: Size, high: Size },
}

impl SizeRange {
    /// Parse a size filter expression
    pub fn parse(expression: &str) -> Result<Self> {
        let expr = expression.trim();
        if expr.is_empty() {
            return Err(Error::SizeExpression {
                expression: expression.to_string(),
                reason: "empty expression".into(),
            });
        }

        match expr.split_once(':') {
            Some((low, high)) => {
                if high.contains(':') {
                    return Err(Error::SizeExpression {
                        expression: expression.to_string(),
                        reason: "more than one ':'".into(),
                    });
                }

                let low = Self::parse_bound(low, expression)?;
                let high = Self::parse_bound(high, expression)?;
                if low.is_none() && high.is_none() {
                    return Err(Error::SizeExpression {
                        expression: expression.to_string(),
                        reason: "expected a size on at least one side of ':'".into(),
                    });
                }

                Self::from_bounds(low, high, None)
            }
            None => Self::from_bounds(None, None, Some(Size::parse_token(expr, expression)?)),
        }
    }

    fn parse_bound(token: &str, expression: &str) -> Result<Option<Size>> {
        if token.is_empty() {
            Ok(None)
        } else {
            Size::parse_token(token, expression).map(Some)
        }
    }

    /// Build a range from whichever bounds are set
    ///
    /// Exactly one shape must result: an exact size on its own, or a low
    /// and/or high bound.
    pub fn from_bounds(low: Option<Size>, high: Option<Size>, exact: Option<Size>) -> Result<Self> {
        match (low, high, exact) {
            (None, None, None) => Err(Error::NoRangeConfigured),
            (None, None, Some(exact)) => Ok(SizeRange::Exact(exact)),
            (Some(low), None, None) => Ok(SizeRange::AtLeast(low)),
            (None, Some(high), None) => Ok(SizeRange::AtMost(high)),
            (Some(low), Some(high), None) => {
                if low.to_bytes() > high.to_bytes() {
                    warn!("Size range {}:{} is empty, no disk will match", low, high);
                }
                Ok(SizeRange::Between { low, high })
            }
            (_, _, Some(exact)) => Err(Error::SizeExpression {
                expression: exact.to_string(),
                reason: "exact size cannot be combined with a low or high bound".into(),
            }),
        }
    }

    pub fn low(&self) -> Option<Size> {
        match self {
            SizeRange::AtLeast(low) | SizeRange::Between { low, .. } => Some(*low),
            _ => None,
        }
    }

    pub fn high(&self) -> Option<Size> {
        match self {
            SizeRange::AtMost(high) | SizeRange::Between { high, .. } => Some(*high),
            _ => None,
        }
    }

    pub fn exact(&self) -> Option<Size> {
        match self {
            SizeRange::Exact(exact) => Some(*exact),
            _ => None,
        }
    }

    /// Check whether a byte count falls within this range
    pub fn contains(&self, bytes: f64) -> bool {
        match self {
            SizeRange::Exact(exact) => bytes == exact.to_bytes(),
            SizeRange::AtLeast(low) => bytes >= low.to_bytes(),
            SizeRange::AtMost(high) => bytes <= high.to_bytes(),
            SizeRange::Between { low, high } => {
                low.to_bytes() <= bytes && bytes <= high.to_bytes()
            }
        }
    }
}

impl FromStr for SizeRange {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        SizeRange::parse(s)
    }
}

impl std::fmt::Display for SizeRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SizeRange::Exact(exact) => write!(f, "{}", exact),
            SizeRange::AtLeast(low) => write!(f, "{}:", low),
            SizeRange::AtMost(high) => write!(f, ":{}", high),
            SizeRange::Between { low, high } => write!(f, "{}:{}", low, high),
        }
    }
}

// =============================================================================
// Device Sizes
// =============================================================================

/// Convert a size reported by the inventory to bytes
///
/// Accepts `"<float> <unit>"` (e.g. "20.00 GB", "20.00GB") or a plain byte
/// count as found in the bare size attribute.
pub fn device_size_bytes(key: &str, value: &str) -> Result<f64> {
    let trimmed = value.trim();
    let number_end = trimmed
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(trimmed.len());
    let (number, suffix) = trimmed.split_at(number_end);

    let number: f64 = number.parse().map_err(|_| Error::InvalidAttributeValue {
        key: key.to_string(),
        value: value.to_string(),
    })?;

    let suffix = suffix.trim();
    if suffix.is_empty() {
        return Ok(number);
    }

    Ok(number * SizeUnit::parse(suffix)?.multiplier() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn gb(value: u64) -> Size {
        Size::new(value, SizeUnit::GB)
    }

    #[test]
    fn test_normalize_unit() {
        for (raw, canonical) in [
            ("G", "GB"),
            ("GB", "GB"),
            ("T", "TB"),
            ("TB", "TB"),
            ("M", "MB"),
            ("MB", "MB"),
        ] {
            assert_eq!(normalize_unit(raw).unwrap(), canonical);
            // normalizing twice changes nothing
            assert_eq!(normalize_unit(normalize_unit(raw).unwrap()).unwrap(), canonical);
        }
    }

    #[test]
    fn test_normalize_unit_rejects_unknown() {
        assert_matches!(normalize_unit("P"), Err(Error::UnitNotSupported { unit }) if unit == "P");
        assert_matches!(normalize_unit("g"), Err(Error::UnitNotSupported { .. }));
        assert_matches!(normalize_unit("GiB"), Err(Error::UnitNotSupported { .. }));
    }

    #[test]
    fn test_to_bytes() {
        assert_eq!(Size::new(10, SizeUnit::MB).to_bytes(), 10.0 * 1e6);
        assert_eq!(Size::new(10, SizeUnit::GB).to_bytes(), 10.0 * 1e9);
        assert_eq!(Size::new(10, SizeUnit::TB).to_bytes(), 10.0 * 1e12);
    }

    #[test]
    fn test_to_bytes_is_monotonic() {
        for unit in [SizeUnit::MB, SizeUnit::GB, SizeUnit::TB] {
            let mut previous = Size::new(0, unit).to_bytes();
            for value in 1..200 {
                let current = Size::new(value, unit).to_bytes();
                assert!(current > previous);
                previous = current;
            }
        }
    }

    #[test]
    fn test_parse_exact() {
        assert_eq!(SizeRange::parse("20G").unwrap(), SizeRange::Exact(gb(20)));
        assert_eq!(SizeRange::parse("20GB").unwrap(), SizeRange::Exact(gb(20)));
        assert_eq!(SizeRange::parse(" 20GB ").unwrap().exact(), Some(gb(20)));
    }

    #[test]
    fn test_parse_low_high() {
        let range = SizeRange::parse("20G:50G").unwrap();
        assert_eq!(range.low(), Some(gb(20)));
        assert_eq!(range.high(), Some(gb(50)));
        assert_eq!(range.exact(), None);

        let range = SizeRange::parse("500M:1T").unwrap();
        assert_eq!(range.low(), Some(Size::new(500, SizeUnit::MB)));
        assert_eq!(range.high(), Some(Size::new(1, SizeUnit::TB)));
    }

    #[test]
    fn test_parse_high_only() {
        let range = SizeRange::parse(":50G").unwrap();
        assert_eq!(range, SizeRange::AtMost(gb(50)));
        assert_eq!(range.low(), None);
    }

    #[test]
    fn test_parse_low_only() {
        let range = SizeRange::parse("50G:").unwrap();
        assert_eq!(range, SizeRange::AtLeast(gb(50)));
        assert_eq!(range.high(), None);
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for expr in ["None", "", ":", "10", "G", "10.5G", "10G:20G:30G", "10 G", "abc:10G", "10G-20G"] {
            assert_matches!(
                SizeRange::parse(expr),
                Err(Error::SizeExpression { .. }),
                "expression {:?}",
                expr
            );
        }
    }

    #[test]
    fn test_parse_rejects_unknown_unit() {
        assert_matches!(SizeRange::parse("10P"), Err(Error::UnitNotSupported { unit }) if unit == "P");
        assert_matches!(SizeRange::parse("10G:1PB"), Err(Error::UnitNotSupported { unit }) if unit == "PB");
    }

    #[test]
    fn test_parse_rejects_overflow() {
        assert_matches!(
            SizeRange::parse("99999999999999999999999G"),
            Err(Error::SizeExpression { .. })
        );
    }

    #[test]
    fn test_display_round_trips_canonical_form() {
        assert_eq!(SizeRange::parse("10G:50G").unwrap().to_string(), "10GB:50GB");
        assert_eq!(SizeRange::parse(":1T").unwrap().to_string(), ":1TB");
        assert_eq!(SizeRange::parse("5M:").unwrap().to_string(), "5MB:");
    }

    #[test]
    fn test_from_bounds() {
        assert_matches!(SizeRange::from_bounds(None, None, None), Err(Error::NoRangeConfigured));
        assert_matches!(
            SizeRange::from_bounds(Some(gb(1)), None, Some(gb(2))),
            Err(Error::SizeExpression { .. })
        );
        assert_eq!(
            SizeRange::from_bounds(Some(gb(1)), Some(gb(2)), None).unwrap(),
            SizeRange::Between { low: gb(1), high: gb(2) }
        );
    }

    #[test]
    fn test_between_is_inclusive() {
        let range = SizeRange::parse("20GB:100GB").unwrap();
        assert!(!range.contains(1e9));
        assert!(range.contains(20e9));
        assert!(range.contains(50e9));
        assert!(range.contains(100e9));
        assert!(!range.contains(101e9));
    }

    #[test]
    fn test_inverted_range_matches_nothing() {
        let range = SizeRange::parse("50G:10G").unwrap();
        assert!(!range.contains(10e9));
        assert!(!range.contains(30e9));
        assert!(!range.contains(50e9));
    }

    #[test]
    fn test_device_size_bytes() {
        assert_eq!(device_size_bytes("size", "20.00 GB").unwrap(), 20e9);
        assert_eq!(device_size_bytes("size", "10.00GB").unwrap(), 10e9);
        assert_eq!(device_size_bytes("size", "1.50 TB").unwrap(), 1.5e12);
        assert_eq!(device_size_bytes("size", "512 MB").unwrap(), 512e6);
        assert_eq!(device_size_bytes("bare_size", "10474836480.0").unwrap(), 10474836480.0);
    }

    #[test]
    fn test_device_size_bytes_errors() {
        assert_matches!(
            device_size_bytes("size", "unknown"),
            Err(Error::InvalidAttributeValue { key, .. }) if key == "size"
        );
        assert_matches!(
            device_size_bytes("size", "3.00 PB"),
            Err(Error::UnitNotSupported { .. })
        );
    }
}
