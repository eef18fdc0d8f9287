//! Capabilities and the surfaces that expose them
//!
//! A capability is a named entry on an object: either a plain property or an
//! operation. Operations are shared, immutable callables that receive the
//! surface they were resolved through as their receiver, which is how a
//! decorator operation can read properties of the object it decorates.

use crate::errors::{CompositionError, CompositionResult};
use crate::value::Value;
use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;

/// Signature of an operation body
pub type OperationFn =
    dyn Fn(&dyn CapabilitySurface, &[Value]) -> CompositionResult<Value> + Send + Sync;

/// A shared callable capability
#[derive(Clone)]
pub struct Operation {
    body: Arc<OperationFn>,
}

impl Operation {
    /// Wrap a closure as an operation
    pub fn new<F>(body: F) -> Self
    where
        F: Fn(&dyn CapabilitySurface, &[Value]) -> CompositionResult<Value> + Send + Sync + 'static,
    {
        Self {
            body: Arc::new(body),
        }
    }

    /// Operation that ignores its receiver and arguments
    pub fn constant(value: impl Into<Value>) -> Self {
        let value = value.into();
        Self::new(move |_, _| Ok(value.clone()))
    }

    /// Invoke the operation against a receiver
    pub fn call(&self, receiver: &dyn CapabilitySurface, args: &[Value]) -> CompositionResult<Value> {
        (self.body)(receiver, args)
    }

    /// Whether two handles share the same body
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.body, &other.body)
    }
}

impl fmt::Debug for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Operation(..)")
    }
}

/// Kind of a capability, for listings and diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CapabilityKind {
    /// Plain value
    Property,
    /// Callable
    Operation,
}

/// A named entry exposed by a surface
#[derive(Debug, Clone)]
pub enum Capability {
    /// A value returned as-is
    Property(Value),
    /// A callable invoked with the bound receiver
    Operation(Operation),
}

impl Capability {
    /// Create a property capability
    pub fn property(value: impl Into<Value>) -> Self {
        Self::Property(value.into())
    }

    /// Create an operation capability from a closure
    pub fn operation<F>(body: F) -> Self
    where
        F: Fn(&dyn CapabilitySurface, &[Value]) -> CompositionResult<Value> + Send + Sync + 'static,
    {
        Self::Operation(Operation::new(body))
    }

    /// Kind of this capability
    pub fn kind(&self) -> CapabilityKind {
        match self {
            Capability::Property(_) => CapabilityKind::Property,
            Capability::Operation(_) => CapabilityKind::Operation,
        }
    }

    /// Property value, if this is a property
    pub fn as_property(&self) -> Option<&Value> {
        match self {
            Capability::Property(value) => Some(value),
            Capability::Operation(_) => None,
        }
    }

    /// Operation handle, if this is an operation
    pub fn as_operation(&self) -> Option<&Operation> {
        match self {
            Capability::Operation(operation) => Some(operation),
            Capability::Property(_) => None,
        }
    }

    /// Evaluate the capability.
    ///
    /// Properties return a copy of their value and ignore `args`; operations
    /// run with `receiver` bound.
    pub fn invoke(
        &self,
        receiver: &dyn CapabilitySurface,
        args: &[Value],
    ) -> CompositionResult<Value> {
        match self {
            Capability::Property(value) => Ok(value.clone()),
            Capability::Operation(operation) => operation.call(receiver, args),
        }
    }
}

impl From<Value> for Capability {
    fn from(value: Value) -> Self {
        Capability::Property(value)
    }
}

impl From<Operation> for Capability {
    fn from(operation: Operation) -> Self {
        Capability::Operation(operation)
    }
}

/// Ordered name to capability mapping.
///
/// Insertion order is kept; inserting an existing name replaces the entry in
/// place.
#[derive(Debug, Clone, Default)]
pub struct CapabilitySet {
    entries: IndexMap<String, Capability>,
}

impl CapabilitySet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a property, builder style
    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, Capability::property(value));
        self
    }

    /// Add an operation, builder style
    pub fn with_operation<F>(mut self, name: impl Into<String>, body: F) -> Self
    where
        F: Fn(&dyn CapabilitySurface, &[Value]) -> CompositionResult<Value> + Send + Sync + 'static,
    {
        self.insert(name, Capability::operation(body));
        self
    }

    /// Insert or replace a capability, returning the replaced entry
    pub fn insert(&mut self, name: impl Into<String>, capability: Capability) -> Option<Capability> {
        self.entries.insert(name.into(), capability)
    }

    /// Look up a capability by name
    pub fn get(&self, name: &str) -> Option<&Capability> {
        self.entries.get(name)
    }

    /// Whether the set defines `name`
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Names in insertion order
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.keys().map(String::as_str)
    }

    /// Entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Capability)> + '_ {
        self.entries.iter().map(|(name, cap)| (name.as_str(), cap))
    }

    /// Number of capabilities
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the set is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Copy every entry of `other` over this set (later wins)
    pub fn overlay(&mut self, other: &CapabilitySet) {
        for (name, capability) in &other.entries {
            self.entries.insert(name.clone(), capability.clone());
        }
    }
}

impl<N: Into<String>> FromIterator<(N, Capability)> for CapabilitySet {
    fn from_iter<I: IntoIterator<Item = (N, Capability)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(name, capability)| (name.into(), capability))
                .collect(),
        }
    }
}

impl IntoIterator for CapabilitySet {
    type Item = (String, Capability);
    type IntoIter = indexmap::map::IntoIter<String, Capability>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Anything that exposes named capabilities.
///
/// Instances, composed instances and delegate views all implement this, so
/// they can be nested freely.
pub trait CapabilitySurface: Send + Sync {
    /// Human-readable label used in diagnostics, never for equality
    fn identity(&self) -> &str;

    /// Find the capability visible under `name`
    fn lookup(&self, name: &str) -> Option<&Capability>;

    /// Every visible name, without duplicates
    fn capability_names(&self) -> Vec<String>;

    /// Whether `name` is visible on this surface
    fn has_capability(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    /// Value of a visible property
    fn property_value(&self, name: &str) -> Option<&Value> {
        self.lookup(name).and_then(Capability::as_property)
    }
}

/// Look up `name` on `surface` and evaluate it with `surface` as receiver
pub fn invoke(
    surface: &dyn CapabilitySurface,
    name: &str,
    args: &[Value],
) -> CompositionResult<Value> {
    let capability = surface
        .lookup(name)
        .ok_or_else(|| CompositionError::not_found(name, surface.identity()))?;
    capability.invoke(surface, args)
}

/// Fetch a required text property from a receiver inside an operation body
pub fn text_property<'a>(
    receiver: &'a dyn CapabilitySurface,
    operation: &str,
    name: &str,
) -> CompositionResult<&'a str> {
    receiver
        .property_value(name)
        .and_then(Value::as_text)
        .ok_or_else(|| {
            CompositionError::invalid_argument(
                operation,
                format!("receiver '{}' has no text property '{name}'", receiver.identity()),
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed {
        set: CapabilitySet,
    }

    impl CapabilitySurface for Fixed {
        fn identity(&self) -> &str {
            "fixed"
        }

        fn lookup(&self, name: &str) -> Option<&Capability> {
            self.set.get(name)
        }

        fn capability_names(&self) -> Vec<String> {
            self.set.names().map(str::to_string).collect()
        }
    }

    #[test]
    fn test_insert_replaces_in_place() {
        let mut set = CapabilitySet::new()
            .with_property("name", "Car")
            .with_property("wheels", 4);
        let replaced = set.insert("name", Capability::property("Truck"));

        assert_eq!(replaced.and_then(|c| c.as_property().cloned()), Some(Value::from("Car")));
        assert_eq!(set.names().collect::<Vec<_>>(), vec!["name", "wheels"]);
    }

    #[test]
    fn test_overlay_is_last_wins() {
        let mut base = CapabilitySet::new().with_property("x", 1).with_property("y", 2);
        let top = CapabilitySet::new().with_property("y", 20).with_property("z", 30);
        base.overlay(&top);

        assert_eq!(base.get("y").and_then(Capability::as_property), Some(&Value::Int(20)));
        assert_eq!(base.names().collect::<Vec<_>>(), vec!["x", "y", "z"]);
    }

    #[test]
    fn test_invoke_binds_receiver() {
        let surface = Fixed {
            set: CapabilitySet::new()
                .with_property("phrase", "I'm Ali the alien!")
                .with_operation("say_phrase", |receiver, _| {
                    text_property(receiver, "say_phrase", "phrase").map(Value::from)
                }),
        };

        assert_eq!(
            invoke(&surface, "say_phrase", &[]).unwrap(),
            Value::from("I'm Ali the alien!")
        );
    }

    #[test]
    fn test_invoke_missing_name() {
        let surface = Fixed {
            set: CapabilitySet::new(),
        };
        let err = invoke(&surface, "fly", &[]).unwrap_err();
        assert_eq!(err, CompositionError::not_found("fly", "fixed"));
    }

    #[test]
    fn test_property_ignores_arguments() {
        let capability = Capability::property(8);
        let surface = Fixed {
            set: CapabilitySet::new(),
        };
        assert_eq!(capability.invoke(&surface, &[Value::from("ignored")]).unwrap(), Value::Int(8));
        assert_eq!(capability.kind(), CapabilityKind::Property);
    }

    #[test]
    fn test_constant_operation_shares_body_on_clone() {
        let operation = Operation::constant("Pim Pam Pum!");
        let clone = operation.clone();
        assert!(operation.ptr_eq(&clone));
        assert!(!operation.ptr_eq(&Operation::constant("Pim Pam Pum!")));
    }
}
