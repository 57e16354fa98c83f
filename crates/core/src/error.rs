//! Domain error model.

use thiserror::Error;

/// Result type used across the policy layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Only ingestion boundaries (identifier parsing, permission entry parsing)
/// produce these. The filtering and resolution stages convert them into
/// "absent" or "no match" and keep going.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (e.g. malformed input).
    #[error("validation failed: {0}")]
    Validation(String),

    /// An identifier was empty or a serialization artifact (`"undefined"`, `"null"`, ...).
    #[error("invalid identifier: {0}")]
    InvalidId(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_failed_boundary() {
        assert_eq!(
            DomainError::validation("unknown permission shape").to_string(),
            "validation failed: unknown permission shape"
        );
        assert_eq!(DomainError::invalid_id("OutletId: \"null\"").to_string(), "invalid identifier: OutletId: \"null\"");
    }
}
