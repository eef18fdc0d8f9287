//! Motif Composition
//!
//! Composition layer of the Motif toolkit. Three cooperating components turn
//! immutable [`Instance`]s into richer surfaces without ever mutating them:
//!
//! - [`VariantRegistry`] - key to factory mapping; `create` builds variants
//! - [`DelegateView`] - read-through lookup from a primary to a fallback
//! - [`compose`] / [`Composer`] - base plus ordered extensions, last wins
//!
//! Typical flow: ask the registry for a variant, pass it through the composer
//! to attach capabilities, then layer read-through defaults with a delegate
//! view.
//!
//! Only registration mutates state (the registry mapping). Resolution and
//! composition are pure and take no locks.

#![forbid(unsafe_code)]

/// Ready-made adapter and interceptor extensions
pub mod adapters;

/// Base plus extensions composition
pub mod composite;

/// Primary/fallback delegation
pub mod delegate;

/// Variant registry
pub mod registry;

pub use composite::{
    compose, extension, ComposedInstance, Composer, Extension, FnExtension, Layer, Provenance,
};
pub use delegate::{resolve, Bound, DelegateSource, DelegateView};
pub use registry::{Factory, FactoryFn, VariantDescriptor, VariantKeys, VariantKeysIter, VariantRegistry};

// Re-export core types
pub use motif_core::{
    invoke, Capability, CapabilityKind, CapabilitySet, CapabilitySurface, CompositionError,
    CompositionResult, Instance, InstanceBuilder, Operation, RegistryConfig, RegistryMode, Value,
};
