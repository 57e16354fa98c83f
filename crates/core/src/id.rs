//! Tenant identifiers and the sanitization boundary for untrusted text.
//!
//! Route parameters, query strings and persisted values routinely carry
//! serialization artifacts such as `"undefined"` or `"[object Object]"`. Every
//! identifier newtype here can only be built from raw text through
//! [`sanitize_identifier`], so an artifact never reaches a lookup.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Literal values that are treated as "no identifier".
const NULLISH_LITERALS: &[&str] = &["undefined", "null"];

/// Returns the trimmed identifier, or `None` when it is empty or an artifact.
pub fn sanitize_identifier(raw: &str) -> Option<&str> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if NULLISH_LITERALS
        .iter()
        .any(|lit| trimmed.eq_ignore_ascii_case(lit))
    {
        return None;
    }
    // Stringified objects: "[object Object]", "[object Undefined]", ...
    if trimmed.starts_with("[object ") && trimmed.ends_with(']') {
        return None;
    }
    Some(trimmed)
}

/// Identifier of an organization (top-level tenant).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrganizationId(String);

/// Reference to a business unit: its slug when it has one, otherwise its id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BusinessUnitRef(String);

/// Identifier of an outlet (a physical or virtual point of sale within a unit).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OutletId(String);

macro_rules! impl_string_id {
    ($t:ty, $name:literal) => {
        impl $t {
            /// Build from untrusted text, returning `None` for empty values and artifacts.
            pub fn parse(raw: &str) -> Option<Self> {
                sanitize_identifier(raw).map(|s| Self(s.to_string()))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl FromStr for $t {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s).ok_or_else(|| DomainError::invalid_id(format!("{}: {:?}", $name, s)))
            }
        }

        impl AsRef<str> for $t {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

impl_string_id!(OrganizationId, "OrganizationId");
impl_string_id!(BusinessUnitRef, "BusinessUnitRef");
impl_string_id!(OutletId, "OutletId");

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn artifacts_are_absent() {
        for raw in ["", "   ", "undefined", "null", "NULL", "[object Object]", "[object Undefined]"] {
            assert_eq!(sanitize_identifier(raw), None, "{raw:?} should be absent");
        }
    }

    #[test]
    fn real_identifiers_are_trimmed() {
        assert_eq!(sanitize_identifier("  acme-shop "), Some("acme-shop"));
        assert_eq!(sanitize_identifier("nullable-unit"), Some("nullable-unit"));
        assert_eq!(sanitize_identifier("[object"), Some("[object"));
    }

    #[test]
    fn from_str_reports_invalid_id() {
        let err = "undefined".parse::<OutletId>().unwrap_err();
        assert!(matches!(err, DomainError::InvalidId(msg) if msg.contains("OutletId")));

        let id: OrganizationId = "org-1".parse().unwrap();
        assert_eq!(id.as_str(), "org-1");
    }

    #[test]
    fn serde_is_transparent() {
        let unit = BusinessUnitRef::parse("acme-shop").unwrap();
        assert_eq!(serde_json::to_string(&unit).unwrap(), "\"acme-shop\"");
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 512,
            ..ProptestConfig::default()
        })]

        /// Property: sanitizing an already sanitized identifier is a no-op.
        #[test]
        fn sanitize_is_idempotent(raw in "\\PC{0,16}") {
            if let Some(clean) = sanitize_identifier(&raw) {
                prop_assert_eq!(sanitize_identifier(clean), Some(clean));
                prop_assert_eq!(clean.trim(), clean);
            }
        }
    }
}
