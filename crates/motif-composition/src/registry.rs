//! Variant registry for key-based construction
//!
//! The registry maps a discriminant key to a factory and builds fresh
//! instances on demand. The set of valid variants is introspectable through
//! [`VariantRegistry::keys`] instead of being hidden in branching logic.
//!
//! Writers are serialized by a lock around a copy-on-write snapshot of the
//! mapping. Readers clone the published snapshot and release the lock before
//! any factory runs, so a slow factory never blocks registration.

use indexmap::IndexMap;
use motif_core::{
    CompositionError, CompositionResult, Instance, RegistryConfig, RegistryMode, Value,
};
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Signature of a variant factory
pub type FactoryFn = dyn Fn(&[Value]) -> Instance + Send + Sync;

/// A shared variant factory
#[derive(Clone)]
pub struct Factory {
    body: Arc<FactoryFn>,
}

impl Factory {
    /// Wrap a closure as a factory
    pub fn new<F>(body: F) -> Self
    where
        F: Fn(&[Value]) -> Instance + Send + Sync + 'static,
    {
        Self {
            body: Arc::new(body),
        }
    }

    /// Factory handing out clones of a prepared instance
    pub fn prototype(instance: Instance) -> Self {
        Self::new(move |_| instance.clone())
    }

    /// Build an instance
    pub fn build(&self, args: &[Value]) -> Instance {
        (self.body)(args)
    }
}

impl fmt::Debug for Factory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Factory(..)")
    }
}

/// A key paired with the factory registered under it
#[derive(Debug, Clone)]
pub struct VariantDescriptor {
    /// Discriminant key
    pub key: String,
    /// Factory invoked by `create`
    pub factory: Factory,
}

impl VariantDescriptor {
    /// Create a descriptor from a closure
    pub fn new<F>(key: impl Into<String>, factory: F) -> Self
    where
        F: Fn(&[Value]) -> Instance + Send + Sync + 'static,
    {
        Self {
            key: key.into(),
            factory: Factory::new(factory),
        }
    }
}

type Mapping = IndexMap<Arc<str>, Factory>;

/// Registry of variant factories
pub struct VariantRegistry {
    /// Published mapping; replaced wholesale on write
    factories: RwLock<Arc<Mapping>>,
    /// Re-registration policy
    mode: RegistryMode,
}

impl fmt::Debug for VariantRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VariantRegistry")
            .field("keys", &self.keys().to_vec())
            .field("mode", &self.mode)
            .finish()
    }
}

impl Default for VariantRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl VariantRegistry {
    /// Create an empty permissive registry
    pub fn new() -> Self {
        Self::with_mode(RegistryMode::Permissive)
    }

    /// Create an empty registry with the given re-registration policy
    pub fn with_mode(mode: RegistryMode) -> Self {
        Self {
            factories: RwLock::new(Arc::new(Mapping::new())),
            mode,
        }
    }

    /// Create an empty registry from configuration
    pub fn from_config(config: &RegistryConfig) -> Self {
        Self::with_mode(config.mode)
    }

    /// Re-registration policy of this registry
    pub fn mode(&self) -> RegistryMode {
        self.mode
    }

    /// Register a factory under `key`.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateKey` if the key exists and the registry is strict.
    /// Permissive registries overwrite the factory and keep the key's
    /// original position in [`keys`](Self::keys).
    pub fn register<F>(&self, key: impl Into<String>, factory: F) -> CompositionResult<()>
    where
        F: Fn(&[Value]) -> Instance + Send + Sync + 'static,
    {
        self.register_descriptor(VariantDescriptor {
            key: key.into(),
            factory: Factory::new(factory),
        })
    }

    /// Register a prepared descriptor
    pub fn register_descriptor(&self, descriptor: VariantDescriptor) -> CompositionResult<()> {
        self.register_all(std::iter::once(descriptor))
    }

    /// Register several descriptors atomically.
    ///
    /// In strict mode the whole batch is rejected if any key is already
    /// registered or repeats within the batch; nothing is published then.
    pub fn register_all<I>(&self, descriptors: I) -> CompositionResult<()>
    where
        I: IntoIterator<Item = VariantDescriptor>,
    {
        let descriptors: Vec<VariantDescriptor> = descriptors.into_iter().collect();
        let mut guard = self.factories.write();

        if self.mode == RegistryMode::Strict {
            for (index, descriptor) in descriptors.iter().enumerate() {
                let repeated = descriptors[..index]
                    .iter()
                    .any(|earlier| earlier.key == descriptor.key);
                if repeated || guard.contains_key(descriptor.key.as_str()) {
                    debug!(key = %descriptor.key, "Rejecting duplicate variant in strict registry");
                    return Err(CompositionError::DuplicateKey {
                        key: descriptor.key.clone(),
                    });
                }
            }
        }

        let mapping = Arc::make_mut(&mut guard);
        for VariantDescriptor { key, factory } in descriptors {
            if mapping.contains_key(key.as_str()) {
                warn!(key = %key, "Overwriting registered variant; last registration wins");
            } else {
                debug!(key = %key, "Registered variant");
            }
            mapping.insert(Arc::from(key), factory);
        }
        Ok(())
    }

    /// Build a fresh instance of the variant registered under `key`.
    ///
    /// # Errors
    ///
    /// Returns `UnknownVariant`, listing the registered keys in registration
    /// order, if nothing is registered under `key`.
    pub fn create(&self, key: &str, args: &[Value]) -> CompositionResult<Instance> {
        let snapshot = self.snapshot();
        let Some(factory) = snapshot.get(key) else {
            debug!(key = %key, known = snapshot.len(), "Unknown variant requested");
            return Err(CompositionError::unknown_variant(
                key,
                snapshot.keys().map(|k| k.to_string()).collect(),
            ));
        };
        trace!(key = %key, args = args.len(), "Creating variant");
        Ok(factory.build(args))
    }

    /// Registered keys in registration order.
    ///
    /// The returned handle is a snapshot: it can be iterated any number of
    /// times and does not observe later registrations.
    pub fn keys(&self) -> VariantKeys {
        VariantKeys {
            snapshot: self.snapshot(),
        }
    }

    /// Whether a factory is registered under `key`
    pub fn contains(&self, key: &str) -> bool {
        self.factories.read().contains_key(key)
    }

    /// Number of registered variants
    pub fn len(&self) -> usize {
        self.factories.read().len()
    }

    /// Whether nothing is registered
    pub fn is_empty(&self) -> bool {
        self.factories.read().is_empty()
    }

    fn snapshot(&self) -> Arc<Mapping> {
        Arc::clone(&self.factories.read())
    }
}

/// Restartable view of registered keys
#[derive(Clone)]
pub struct VariantKeys {
    snapshot: Arc<Mapping>,
}

impl VariantKeys {
    /// Iterate keys in registration order
    pub fn iter(&self) -> VariantKeysIter<'_> {
        VariantKeysIter {
            inner: self.snapshot.keys(),
        }
    }

    /// Number of keys in the snapshot
    pub fn len(&self) -> usize {
        self.snapshot.len()
    }

    /// Whether the snapshot is empty
    pub fn is_empty(&self) -> bool {
        self.snapshot.is_empty()
    }

    /// Whether the snapshot contains `key`
    pub fn contains(&self, key: &str) -> bool {
        self.snapshot.contains_key(key)
    }

    /// Owned copy of the keys
    pub fn to_vec(&self) -> Vec<String> {
        self.iter().map(str::to_string).collect()
    }
}

impl fmt::Debug for VariantKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<'a> IntoIterator for &'a VariantKeys {
    type Item = &'a str;
    type IntoIter = VariantKeysIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over a [`VariantKeys`] snapshot
pub struct VariantKeysIter<'a> {
    inner: indexmap::map::Keys<'a, Arc<str>, Factory>,
}

impl<'a> Iterator for VariantKeysIter<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|key| &**key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for VariantKeysIter<'_> {}
