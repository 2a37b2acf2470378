//! Filters
//!
//! Binds a declared `(name, value)` pair from a drive group spec to the
//! matcher that evaluates it, and validates filter names for a role.

use super::extract::Attribute;
use super::matcher::Matcher;
use crate::domain::ports::{FilterSpec, FilterValue, LIMIT_KEY};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

// =============================================================================
// Filter Names
// =============================================================================

/// Recognized filter names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterName {
    Size,
    Model,
    Vendor,
    Rotational,
    All,
}

impl FilterName {
    pub const SUPPORTED: [FilterName; 5] = [
        FilterName::Size,
        FilterName::Model,
        FilterName::Vendor,
        FilterName::Rotational,
        FilterName::All,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FilterName::Size => "size",
            FilterName::Model => "model",
            FilterName::Vendor => "vendor",
            FilterName::Rotational => "rotational",
            FilterName::All => "all",
        }
    }

    /// Look up a filter name, optionally admitting `rotates` for `rotational`
    pub fn lookup(name: &str, accept_legacy: bool) -> Option<Self> {
        match name {
            "size" => Some(FilterName::Size),
            "model" => Some(FilterName::Model),
            "vendor" => Some(FilterName::Vendor),
            "rotational" => Some(FilterName::Rotational),
            "rotates" if accept_legacy => Some(FilterName::Rotational),
            "all" => Some(FilterName::All),
            _ => None,
        }
    }
}

impl FromStr for FilterName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        FilterName::lookup(s, true).ok_or_else(|| Error::FilterNotSupported {
            filter: s.to_string(),
        })
    }
}

impl std::fmt::Display for FilterName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Filter
// =============================================================================

/// A declared filter and the matcher it resolved to
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Filter {
    name: String,
    value: FilterValue,
    matcher: Option<Matcher>,
}

impl Filter {
    /// Build a filter, admitting legacy filter names
    pub fn new(name: &str, value: &FilterValue) -> Result<Self> {
        Self::with_legacy_names(name, value, true)
    }

    /// Build a filter
    ///
    /// An unrecognized name yields a filter that is not matchable; a
    /// recognized name with a malformed value is an error.
    pub fn with_legacy_names(name: &str, value: &FilterValue, accept_legacy: bool) -> Result<Self> {
        let matcher = match FilterName::lookup(name, accept_legacy) {
            Some(FilterName::Size) => Some(Matcher::size(&value.to_string())?),
            Some(FilterName::Model) => Some(Matcher::substring(value.to_string(), Attribute::Model)),
            Some(FilterName::Vendor) => {
                Some(Matcher::substring(value.to_string(), Attribute::Vendor))
            }
            Some(FilterName::Rotational) => Some(Matcher::equality(value, Attribute::Rotational)?),
            Some(FilterName::All) => Some(Matcher::all()),
            None => None,
        };

        Ok(Self {
            name: name.to_string(),
            value: value.clone(),
            matcher,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &FilterValue {
        &self.value
    }

    pub fn matcher(&self) -> Option<&Matcher> {
        self.matcher.as_ref()
    }

    /// Whether this filter contributes to selection
    pub fn is_matchable(&self) -> bool {
        self.matcher.is_some()
    }
}

// =============================================================================
// Validation
// =============================================================================

/// Reject the first unsupported filter name in a role's filter map
///
/// The reserved `limit` key is not a filter and is skipped.
pub fn validate(spec: &FilterSpec, accept_legacy: bool) -> Result<()> {
    for name in spec.keys().filter(|name| name.as_str() != LIMIT_KEY) {
        if FilterName::lookup(name, accept_legacy).is_none() {
            return Err(Error::FilterNotSupported {
                filter: name.clone(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_unknown_name_is_not_matchable() {
        let filter = Filter::new("colour", &FilterValue::from("blue")).unwrap();
        assert!(!filter.is_matchable());
        assert!(filter.matcher().is_none());
    }

    #[test]
    fn test_all_matches_regardless_of_value() {
        for value in [FilterValue::from("True"), FilterValue::from("False"), FilterValue::Bool(false)] {
            let filter = Filter::new("all", &value).unwrap();
            assert_eq!(filter.matcher(), Some(&Matcher::All));
            assert!(filter.is_matchable());
        }
    }

    #[test]
    fn test_dispatch() {
        let filter = Filter::new("size", &FilterValue::from("10G")).unwrap();
        assert_matches!(filter.matcher(), Some(Matcher::Size { .. }));

        let filter = Filter::new("model", &FilterValue::from("abc123")).unwrap();
        assert_matches!(
            filter.matcher(),
            Some(Matcher::Substring { key: Attribute::Model, .. })
        );

        let filter = Filter::new("vendor", &FilterValue::from("samsung")).unwrap();
        assert_matches!(
            filter.matcher(),
            Some(Matcher::Substring { key: Attribute::Vendor, .. })
        );

        let filter = Filter::new("rotational", &FilterValue::from("0")).unwrap();
        assert_matches!(
            filter.matcher(),
            Some(Matcher::Equality { value: 0, key: Attribute::Rotational })
        );
    }

    #[test]
    fn test_legacy_rotates_name() {
        let filter = Filter::new("rotates", &FilterValue::Integer(1)).unwrap();
        assert_matches!(filter.matcher(), Some(Matcher::Equality { value: 1, .. }));

        let filter =
            Filter::with_legacy_names("rotates", &FilterValue::Integer(1), false).unwrap();
        assert!(!filter.is_matchable());
    }

    #[test]
    fn test_malformed_value_fails() {
        assert_matches!(
            Filter::new("size", &FilterValue::Integer(20)),
            Err(Error::SizeExpression { .. })
        );
        assert_matches!(
            Filter::new("rotational", &FilterValue::from("spinning")),
            Err(Error::InvalidFilterValue { .. })
        );
    }

    #[test]
    fn test_validate_accepts_supported_names_and_limit() {
        let mut spec = FilterSpec::new();
        for name in FilterName::SUPPORTED {
            spec.insert(name.to_string(), FilterValue::from("1"));
        }
        spec.insert(LIMIT_KEY.to_string(), FilterValue::Integer(1));

        assert!(validate(&spec, false).is_ok());
    }

    #[test]
    fn test_validate_rejects_unknown() {
        let mut spec = FilterSpec::new();
        spec.insert("model".into(), FilterValue::from("foo"));
        spec.insert("unknown".into(), FilterValue::from("foo"));
        spec.insert("other".into(), FilterValue::from("foo"));

        assert_matches!(
            validate(&spec, true),
            Err(Error::FilterNotSupported { filter }) if filter == "unknown"
        );
    }

    #[test]
    fn test_validate_legacy_names() {
        let mut spec = FilterSpec::new();
        spec.insert("rotates".into(), FilterValue::Integer(0));

        assert!(validate(&spec, true).is_ok());
        assert_matches!(validate(&spec, false), Err(Error::FilterNotSupported { .. }));
    }

    #[test]
    fn test_filter_name_from_str() {
        assert_eq!("vendor".parse::<FilterName>().unwrap(), FilterName::Vendor);
        assert_matches!(
            "limit".parse::<FilterName>(),
            Err(Error::FilterNotSupported { .. })
        );
    }
}
