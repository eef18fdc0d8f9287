//! Composition of a base instance with ordered extensions
//!
//! The composer wraps a base [`Instance`] with extensions. Each extension sees
//! only the original base (never the partially composed result) and returns
//! the capabilities it contributes. The composed surface exposes, for every
//! name, the implementation from the last layer that defines it, falling back
//! to the base.
//!
//! Because extensions only see the base, composition is order independent
//! except where names collide. Composed operations run with the composed
//! instance as their receiver, so a decorator can read properties of the base
//! (or of other extensions) without copying them.

use indexmap::IndexSet;
use motif_core::{
    invoke, Capability, CapabilitySet, CapabilitySurface, CompositionError, CompositionResult,
    Instance, Value,
};
use std::sync::Arc;
use tracing::debug;

/// Contributes capabilities on top of a base instance.
///
/// Implementations must not rely on other extensions: `extend` only ever
/// receives the original base.
pub trait Extension: Send + Sync {
    /// Label used in composed identities and logs
    fn name(&self) -> &str {
        "extension"
    }

    /// Capabilities contributed on top of `base`
    fn extend(&self, base: &Instance) -> CapabilitySet;
}

/// A fixed capability set is an extension that ignores the base
impl Extension for CapabilitySet {
    fn name(&self) -> &str {
        "capabilities"
    }

    fn extend(&self, _base: &Instance) -> CapabilitySet {
        self.clone()
    }
}

impl<E: Extension + ?Sized> Extension for Arc<E> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn extend(&self, base: &Instance) -> CapabilitySet {
        (**self).extend(base)
    }
}

/// Extension backed by a closure
pub struct FnExtension<F> {
    name: String,
    body: F,
}

impl<F> Extension for FnExtension<F>
where
    F: Fn(&Instance) -> CapabilitySet + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn extend(&self, base: &Instance) -> CapabilitySet {
        (self.body)(base)
    }
}

/// Create a named extension from a closure
pub fn extension<F>(name: impl Into<String>, body: F) -> FnExtension<F>
where
    F: Fn(&Instance) -> CapabilitySet + Send + Sync,
{
    FnExtension {
        name: name.into(),
        body,
    }
}

/// Capabilities contributed by one extension
#[derive(Debug, Clone)]
pub struct Layer {
    name: String,
    capabilities: CapabilitySet,
}

impl Layer {
    /// Name of the extension that produced the layer
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Contributed capabilities
    pub fn capabilities(&self) -> &CapabilitySet {
        &self.capabilities
    }
}

/// Where the winning implementation of a name lives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provenance {
    /// Defined by the base and not shadowed
    Base,
    /// Defined by the extension at this index
    Extension(usize),
}

/// A base instance with extension layers on top
#[derive(Debug, Clone)]
pub struct ComposedInstance {
    identity: String,
    base: Instance,
    layers: Vec<Layer>,
}

impl ComposedInstance {
    /// The untouched base
    pub fn base(&self) -> &Instance {
        &self.base
    }

    /// Extension layers, in application order
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Which layer provides the visible implementation of `name`
    pub fn provenance(&self, name: &str) -> Option<Provenance> {
        if let Some(index) = self
            .layers
            .iter()
            .rposition(|layer| layer.capabilities.contains(name))
        {
            return Some(Provenance::Extension(index));
        }
        self.base
            .capabilities()
            .contains(name)
            .then_some(Provenance::Base)
    }

    /// Evaluate a capability with the composed instance as receiver
    pub fn call(&self, name: &str, args: &[Value]) -> CompositionResult<Value> {
        invoke(self, name, args)
    }

    /// Flatten into a plain instance with the same visible capabilities
    pub fn into_instance(self) -> Instance {
        let mut capabilities = self.base.capabilities().clone();
        for layer in &self.layers {
            capabilities.overlay(&layer.capabilities);
        }
        Instance::from_capabilities(self.identity, capabilities)
    }
}

impl CapabilitySurface for ComposedInstance {
    fn identity(&self) -> &str {
        &self.identity
    }

    fn lookup(&self, name: &str) -> Option<&Capability> {
        self.layers
            .iter()
            .rev()
            .find_map(|layer| layer.capabilities.get(name))
            .or_else(|| self.base.lookup(name))
    }

    fn capability_names(&self) -> Vec<String> {
        let names: IndexSet<String> = self
            .base
            .capabilities()
            .names()
            .chain(self.layers.iter().flat_map(|layer| layer.capabilities.names()))
            .map(str::to_string)
            .collect();
        names.into_iter().collect()
    }
}

/// Compose `base` with `extensions`, last extension winning on collisions.
///
/// # Errors
///
/// Returns `EmptyComposition` if neither the base nor any extension exposes a
/// capability. Otherwise composition always succeeds.
pub fn compose(base: Instance, extensions: &[&dyn Extension]) -> CompositionResult<ComposedInstance> {
    let layers: Vec<Layer> = extensions
        .iter()
        .map(|extension| Layer {
            name: extension.name().to_string(),
            capabilities: extension.extend(&base),
        })
        .collect();

    if base.is_empty() && layers.iter().all(|layer| layer.capabilities.is_empty()) {
        debug!(base = %base.identity(), extensions = layers.len(), "Nothing to compose");
        return Err(CompositionError::EmptyComposition);
    }

    let identity = std::iter::once(base.identity())
        .chain(layers.iter().map(|layer| layer.name.as_str()))
        .collect::<Vec<_>>()
        .join("+");
    debug!(identity = %identity, extensions = layers.len(), "Composed instance");

    Ok(ComposedInstance {
        identity,
        base,
        layers,
    })
}

/// Builder that accumulates extensions before composing
#[derive(Clone, Default)]
pub struct Composer {
    extensions: Vec<Arc<dyn Extension>>,
}

impl Composer {
    /// Create a composer with no extensions
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an extension; later extensions win on collisions
    pub fn with(mut self, extension: impl Extension + 'static) -> Self {
        self.extensions.push(Arc::new(extension));
        self
    }

    /// Append a shared extension
    pub fn with_shared(mut self, extension: Arc<dyn Extension>) -> Self {
        self.extensions.push(extension);
        self
    }

    /// Number of queued extensions
    pub fn len(&self) -> usize {
        self.extensions.len()
    }

    /// Whether no extension is queued
    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }

    /// Compose `base` with the queued extensions
    pub fn compose(&self, base: Instance) -> CompositionResult<ComposedInstance> {
        let extensions: Vec<&dyn Extension> = self
            .extensions
            .iter()
            .map(|extension| extension.as_ref())
            .collect();
        compose(base, &extensions)
    }
}

impl std::fmt::Debug for Composer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Composer")
            .field(
                "extensions",
                &self.extensions.iter().map(|e| e.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use motif_core::text_property;

    fn user(name: &str) -> Instance {
        Instance::builder("user")
            .property("name", name)
            .operation("say", |receiver, _| {
                let name = text_property(receiver, "say", "name")?;
                Ok(Value::from(format!("User: {name}")))
            })
            .build()
    }

    fn address(street: &'static str, city: &'static str) -> FnExtension<impl Fn(&Instance) -> CapabilitySet + Send + Sync> {
        extension("address", move |_base: &Instance| {
            CapabilitySet::new()
                .with_property("street", street)
                .with_property("city", city)
                .with_operation("say", |receiver, _| {
                    let name = text_property(receiver, "say", "name")?;
                    let street = text_property(receiver, "say", "street")?;
                    let city = text_property(receiver, "say", "city")?;
                    Ok(Value::from(format!("Decorated User: {name}, {street}, {city}")))
                })
        })
    }

    #[test]
    fn test_decorator_reads_base_through_receiver() {
        let kelly = user("Kelly");
        let decorated = compose(kelly.clone(), &[&address("Broadway", "New York")]).unwrap();

        assert_eq!(
            decorated.call("say", &[]).unwrap(),
            Value::from("Decorated User: Kelly, Broadway, New York")
        );
        assert_eq!(kelly.call("say", &[]).unwrap(), Value::from("User: Kelly"));
        assert_eq!(decorated.identity(), "user+address");
    }

    #[test]
    fn test_last_extension_wins() {
        let first = CapabilitySet::new().with_property("x", 1);
        let second = CapabilitySet::new().with_property("x", 2);
        let composed = compose(Instance::empty("base"), &[&first, &second]).unwrap();

        assert_eq!(composed.call("x", &[]).unwrap(), Value::Int(2));
        assert_eq!(composed.provenance("x"), Some(Provenance::Extension(1)));
    }

    #[test]
    fn test_extensions_see_only_the_base() {
        let adds_fly = CapabilitySet::new().with_operation("fly", |_, _| Ok(Value::Unit));
        let inspects = extension("inspect", |base: &Instance| {
            CapabilitySet::new().with_property("saw_fly", base.has_capability("fly"))
        });
        let composed = compose(user("Kelly"), &[&adds_fly, &inspects]).unwrap();

        assert_eq!(composed.call("saw_fly", &[]).unwrap(), Value::Bool(false));
        assert!(composed.has_capability("fly"));
    }

    #[test]
    fn test_no_extensions_matches_base() {
        let base = user("Kelly");
        let composed = compose(base.clone(), &[]).unwrap();

        for name in base.capability_names() {
            assert_eq!(composed.call(&name, &[]).unwrap(), base.call(&name, &[]).unwrap());
            assert_eq!(composed.provenance(&name), Some(Provenance::Base));
        }
        assert_eq!(composed.capability_names(), base.capability_names());
    }

    #[test]
    fn test_empty_composition() {
        let nothing = CapabilitySet::new();
        let err = compose(Instance::empty("void"), &[&nothing]).unwrap_err();
        assert_eq!(err, CompositionError::EmptyComposition);

        assert!(compose(Instance::empty("void"), &[]).is_err());
        let something = CapabilitySet::new().with_property("a", 1);
        assert!(compose(Instance::empty("void"), &[&something]).is_ok());
    }

    #[test]
    fn test_into_instance_keeps_visible_surface() {
        let composed = compose(user("Kelly"), &[&address("Broadway", "New York")]).unwrap();
        let names = composed.capability_names();
        let flat = composed.into_instance();

        assert_eq!(flat.capability_names(), names);
        assert_eq!(
            flat.call("say", &[]).unwrap(),
            Value::from("Decorated User: Kelly, Broadway, New York")
        );
    }

    #[test]
    fn test_composer_builder() {
        let composer = Composer::new()
            .with(address("Broadway", "New York"))
            .with(CapabilitySet::new().with_property("city", "Boston"));
        assert_eq!(composer.len(), 2);

        let composed = composer.compose(user("Kelly")).unwrap();
        assert_eq!(
            composed.call("say", &[]).unwrap(),
            Value::from("Decorated User: Kelly, Broadway, Boston")
        );
        assert_eq!(format!("{composer:?}"), "Composer { extensions: [\"address\", \"capabilities\"] }");
    }

    #[test]
    fn test_base_only_names_have_no_provenance_when_absent() {
        let composed = compose(user("Kelly"), &[]).unwrap();
        assert_eq!(composed.provenance("fly"), None);
    }
}
