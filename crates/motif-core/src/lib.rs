//! Motif Core
//!
//! Shared vocabulary of the Motif composition toolkit: dynamically typed
//! [`Value`]s, [`Capability`] entries (properties and operations), immutable
//! [`Instance`]s, the [`CapabilitySurface`] trait every composite implements,
//! the unified [`CompositionError`], and toolkit configuration.
//!
//! # Design Principles
//!
//! - Instances have no mutation API; extension always produces a new value
//! - Operations receive the surface they were resolved through as receiver
//! - Identities are for diagnostics only, never for equality

#![forbid(unsafe_code)]

/// Capabilities, capability sets and the surface trait
pub mod capability;

/// Toolkit configuration loading and validation
pub mod config;

/// Unified error type
pub mod errors;

/// Immutable instances and their builder
pub mod instance;

/// Dynamically typed values
pub mod value;

pub use capability::{
    invoke, text_property, Capability, CapabilityKind, CapabilitySet, CapabilitySurface,
    Operation, OperationFn,
};
pub use config::{LoggingConfig, MotifConfig, RegistryConfig, RegistryMode, ToolkitConfig};
pub use errors::{CompositionError, CompositionResult};
pub use instance::{Instance, InstanceBuilder};
pub use value::Value;
