//! Unified error type for the composition toolkit
//!
//! Every failure the toolkit can report is local and synchronous, so a single
//! enum carries enough context (keys, operation names, identities) for the
//! caller to decide on recovery. Nothing is retried internally.

use serde::{Deserialize, Serialize};

/// Result alias used across the toolkit
pub type CompositionResult<T> = Result<T, CompositionError>;

/// Errors raised by registries, resolvers, composers and capabilities
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
pub enum CompositionError {
    /// Re-registration of an existing key while the registry is strict
    #[error("Variant '{key}' is already registered")]
    DuplicateKey {
        /// The key that was registered twice
        key: String,
    },

    /// `create` was asked for a key no factory is registered under
    #[error("Unknown variant '{key}' (known variants: {known:?})")]
    UnknownVariant {
        /// The requested key
        key: String,
        /// Registered keys in registration order
        known: Vec<String>,
    },

    /// A delegate lookup found the name on neither side of the view
    #[error("Capability '{operation}' is missing from '{primary}' and its fallback '{fallback}'")]
    MissingCapability {
        /// The name that was looked up
        operation: String,
        /// Identity of the primary surface (diagnostics only)
        primary: String,
        /// Identity of the fallback surface (diagnostics only)
        fallback: String,
    },

    /// Neither the base nor any extension exposes a capability
    #[error("Composition would expose no capabilities")]
    EmptyComposition,

    /// A direct lookup on a single surface found nothing
    #[error("Capability '{name}' not found on '{identity}'")]
    CapabilityNotFound {
        /// The name that was looked up
        name: String,
        /// Identity of the surface that was searched
        identity: String,
    },

    /// An operation rejected its arguments
    #[error("Invalid argument for '{operation}': {message}")]
    InvalidArgument {
        /// Operation that rejected the call
        operation: String,
        /// Description of what was wrong
        message: String,
    },

    /// An interceptor guard refused the call
    #[error("Call to '{operation}' denied: {reason}")]
    Denied {
        /// Guarded operation
        operation: String,
        /// Reason reported by the guard
        reason: String,
    },

    /// Configuration could not be loaded or failed validation
    #[error("Configuration error: {message}")]
    Config {
        /// Error message describing the configuration problem
        message: String,
    },
}

impl CompositionError {
    /// Create an unknown variant error
    pub fn unknown_variant(key: impl Into<String>, known: Vec<String>) -> Self {
        Self::UnknownVariant {
            key: key.into(),
            known,
        }
    }

    /// Create a missing capability error for a delegate lookup
    pub fn missing_capability(
        operation: impl Into<String>,
        primary: impl Into<String>,
        fallback: impl Into<String>,
    ) -> Self {
        Self::MissingCapability {
            operation: operation.into(),
            primary: primary.into(),
            fallback: fallback.into(),
        }
    }

    /// Create a not found error for a single-surface lookup
    pub fn not_found(name: impl Into<String>, identity: impl Into<String>) -> Self {
        Self::CapabilityNotFound {
            name: name.into(),
            identity: identity.into(),
        }
    }

    /// Create an invalid argument error
    pub fn invalid_argument(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Create a denied error
    pub fn denied(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Denied {
            operation: operation.into(),
            reason: reason.into(),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Whether the error names a lookup that found nothing
    pub fn is_lookup_failure(&self) -> bool {
        matches!(
            self,
            Self::UnknownVariant { .. }
                | Self::MissingCapability { .. }
                | Self::CapabilityNotFound { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_variant_lists_known_keys() {
        let err = CompositionError::unknown_variant("bus", vec!["car".into(), "truck".into()]);
        let message = err.to_string();
        assert!(message.contains("bus"));
        assert!(message.contains("\"car\", \"truck\""));
        assert!(err.is_lookup_failure());
    }

    #[test]
    fn test_missing_capability_names_both_sources() {
        let err = CompositionError::missing_capability("fly", "bug", "enemy");
        assert_eq!(
            err.to_string(),
            "Capability 'fly' is missing from 'bug' and its fallback 'enemy'"
        );
    }

    #[test]
    fn test_denied_is_not_a_lookup_failure() {
        assert!(!CompositionError::denied("get_job", "no token").is_lookup_failure());
        assert!(!CompositionError::EmptyComposition.is_lookup_failure());
    }

    #[test]
    fn test_errors_round_trip_through_json() {
        let errors = vec![
            CompositionError::unknown_variant("bus", vec!["car".into(), "truck".into()]),
            CompositionError::missing_capability("fly", "bug", "enemy"),
            CompositionError::denied("find_job", "invalid token"),
            CompositionError::EmptyComposition,
        ];
        for err in errors {
            let json = serde_json::to_string(&err).unwrap();
            let back: CompositionError = serde_json::from_str(&json).unwrap();
            assert_eq!(back, err);
        }
    }
}
