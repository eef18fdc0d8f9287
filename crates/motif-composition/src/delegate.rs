//! Read-through delegation between two surfaces
//!
//! A [`DelegateView`] pairs a primary surface with a fallback. Lookups try the
//! primary first and fall back to the second surface; neither side is touched.
//! The view borrows both sides, so it cannot outlive the call site that built
//! it and can never be stored back onto either of them.

use indexmap::IndexSet;
use motif_core::{Capability, CapabilitySurface, CompositionError, CompositionResult, Value};
use std::fmt;
use tracing::trace;

/// Side of a view that satisfied a lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DelegateSource {
    /// Found on the primary surface
    Primary,
    /// Found on the fallback surface
    Fallback,
}

/// Borrowed primary/fallback pairing
#[derive(Clone, Copy)]
pub struct DelegateView<'a> {
    primary: &'a dyn CapabilitySurface,
    fallback: &'a dyn CapabilitySurface,
}

impl<'a> DelegateView<'a> {
    /// Pair `primary` with `fallback`
    pub fn new(primary: &'a dyn CapabilitySurface, fallback: &'a dyn CapabilitySurface) -> Self {
        Self { primary, fallback }
    }

    /// The surface consulted first
    pub fn primary(&self) -> &'a dyn CapabilitySurface {
        self.primary
    }

    /// The surface consulted when the primary lacks a name
    pub fn fallback(&self) -> &'a dyn CapabilitySurface {
        self.fallback
    }

    /// Resolve `name` against the primary, then the fallback.
    ///
    /// The result is bound to whichever side defined the name.
    ///
    /// # Errors
    ///
    /// Returns `MissingCapability` naming both identities if neither side
    /// defines `name`.
    pub fn resolve(&self, name: &str) -> CompositionResult<Bound<'a>> {
        if let Some(capability) = self.primary.lookup(name) {
            return Ok(Bound {
                capability,
                receiver: self.primary,
                source: DelegateSource::Primary,
            });
        }
        if let Some(capability) = self.fallback.lookup(name) {
            trace!(
                operation = %name,
                primary = %self.primary.identity(),
                fallback = %self.fallback.identity(),
                "Resolved through fallback"
            );
            return Ok(Bound {
                capability,
                receiver: self.fallback,
                source: DelegateSource::Fallback,
            });
        }
        Err(CompositionError::missing_capability(
            name,
            self.primary.identity(),
            self.fallback.identity(),
        ))
    }

    /// Resolve `name` and evaluate it against its bound side
    pub fn call(&self, name: &str, args: &[Value]) -> CompositionResult<Value> {
        self.resolve(name)?.invoke(args)
    }
}

/// Resolve `name` on `view`; see [`DelegateView::resolve`]
pub fn resolve<'a>(view: &DelegateView<'a>, name: &str) -> CompositionResult<Bound<'a>> {
    view.resolve(name)
}

impl fmt::Debug for DelegateView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DelegateView")
            .field("primary", &self.primary.identity())
            .field("fallback", &self.fallback.identity())
            .finish()
    }
}

/// Viewed as a surface, the view answers every name either side defines.
///
/// Capabilities evaluated through [`motif_core::invoke`] on the view receive
/// the whole view as receiver, so fallback operations can read primary
/// properties. [`DelegateView::resolve`] binds to the defining side instead.
impl CapabilitySurface for DelegateView<'_> {
    fn identity(&self) -> &str {
        self.primary.identity()
    }

    fn lookup(&self, name: &str) -> Option<&Capability> {
        self.primary
            .lookup(name)
            .or_else(|| self.fallback.lookup(name))
    }

    fn capability_names(&self) -> Vec<String> {
        let names: IndexSet<String> = self
            .primary
            .capability_names()
            .into_iter()
            .chain(self.fallback.capability_names())
            .collect();
        names.into_iter().collect()
    }
}

/// A capability bound to the surface it was found on
#[derive(Clone, Copy)]
pub struct Bound<'a> {
    capability: &'a Capability,
    receiver: &'a dyn CapabilitySurface,
    source: DelegateSource,
}

impl<'a> Bound<'a> {
    /// Evaluate the capability against its bound receiver
    pub fn invoke(&self, args: &[Value]) -> CompositionResult<Value> {
        self.capability.invoke(self.receiver, args)
    }

    /// The resolved capability
    pub fn capability(&self) -> &'a Capability {
        self.capability
    }

    /// Identity of the receiver the capability is bound to
    pub fn receiver_identity(&self) -> &'a str {
        self.receiver.identity()
    }

    /// Which side of the view satisfied the lookup
    pub fn source(&self) -> DelegateSource {
        self.source
    }
}

impl fmt::Debug for Bound<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bound")
            .field("capability", &self.capability.kind())
            .field("receiver", &self.receiver.identity())
            .field("source", &self.source)
            .finish()
    }
}
