//! Immutable instances
//!
//! An [`Instance`] has no mutation API. It is assembled once through
//! [`InstanceBuilder`] (or from a configuration table) and shared cheaply
//! afterwards; extending it means composing a new value around it.

use crate::capability::{invoke, Capability, CapabilitySet, CapabilitySurface};
use crate::errors::{CompositionError, CompositionResult};
use crate::value::Value;
use std::sync::Arc;

/// An object exposing a fixed capability surface
#[derive(Debug, Clone)]
pub struct Instance {
    identity: Arc<str>,
    capabilities: Arc<CapabilitySet>,
}

impl Instance {
    /// Start building an instance
    pub fn builder(identity: impl Into<String>) -> InstanceBuilder {
        InstanceBuilder::new(identity)
    }

    /// Instance exposing nothing
    pub fn empty(identity: impl Into<String>) -> Self {
        Self::from_capabilities(identity, CapabilitySet::new())
    }

    /// Freeze an existing capability set into an instance
    pub fn from_capabilities(identity: impl Into<String>, capabilities: CapabilitySet) -> Self {
        Self {
            identity: Arc::from(identity.into()),
            capabilities: Arc::new(capabilities),
        }
    }

    /// Build a property-only instance from a JSON object.
    ///
    /// Each top-level key becomes a property. Nested objects are rejected so
    /// the result is fully frozen at construction.
    pub fn from_table(
        identity: impl Into<String>,
        table: &serde_json::Map<String, serde_json::Value>,
    ) -> CompositionResult<Self> {
        let identity = identity.into();
        let mut capabilities = CapabilitySet::new();
        for (key, value) in table {
            let value = Value::try_from(value.clone())
                .map_err(|e| property_error(&identity, key, e))?;
            capabilities.insert(key.clone(), Capability::Property(value));
        }
        Ok(Self::from_capabilities(identity, capabilities))
    }

    /// Build a property-only instance from a TOML table.
    ///
    /// Datetimes become text properties; nested tables are rejected.
    pub fn from_toml_table(identity: impl Into<String>, table: &toml::Table) -> CompositionResult<Self> {
        let identity = identity.into();
        let mut capabilities = CapabilitySet::new();
        for (key, item) in table {
            let value = Value::try_from(item.clone())
                .map_err(|e| property_error(&identity, key, e))?;
            capabilities.insert(key.clone(), Capability::Property(value));
        }
        Ok(Self::from_capabilities(identity, capabilities))
    }

    /// Capabilities defined directly on this instance
    pub fn capabilities(&self) -> &CapabilitySet {
        &self.capabilities
    }

    /// Value of a property
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.capabilities.get(name).and_then(Capability::as_property)
    }

    /// Evaluate a capability with this instance as receiver
    pub fn call(&self, name: &str, args: &[Value]) -> CompositionResult<Value> {
        invoke(self, name, args)
    }

    /// Whether the instance exposes nothing
    pub fn is_empty(&self) -> bool {
        self.capabilities.is_empty()
    }

    /// Whether two handles share the same capability storage
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.capabilities, &other.capabilities)
    }
}

/// Attach the offending property to a conversion error
fn property_error(identity: &str, key: &str, error: CompositionError) -> CompositionError {
    let detail = match error {
        CompositionError::Config { message } => message,
        other => other.to_string(),
    };
    CompositionError::config(format!("property '{key}' of '{identity}': {detail}"))
}

impl CapabilitySurface for Instance {
    fn identity(&self) -> &str {
        &self.identity
    }

    fn lookup(&self, name: &str) -> Option<&Capability> {
        self.capabilities.get(name)
    }

    fn capability_names(&self) -> Vec<String> {
        self.capabilities.names().map(str::to_string).collect()
    }
}

/// Step-by-step construction of an [`Instance`]
#[derive(Debug, Clone)]
pub struct InstanceBuilder {
    identity: String,
    capabilities: CapabilitySet,
}

impl InstanceBuilder {
    /// Create a builder for an instance with the given identity
    pub fn new(identity: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            capabilities: CapabilitySet::new(),
        }
    }

    /// Add a property
    pub fn property(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.capabilities.insert(name, Capability::property(value));
        self
    }

    /// Add an operation
    pub fn operation<F>(mut self, name: impl Into<String>, body: F) -> Self
    where
        F: Fn(&dyn CapabilitySurface, &[Value]) -> CompositionResult<Value> + Send + Sync + 'static,
    {
        self.capabilities.insert(name, Capability::operation(body));
        self
    }

    /// Add a prepared capability
    pub fn capability(mut self, name: impl Into<String>, capability: Capability) -> Self {
        self.capabilities.insert(name, capability);
        self
    }

    /// Add every entry of a capability set
    pub fn capabilities(mut self, set: &CapabilitySet) -> Self {
        self.capabilities.overlay(set);
        self
    }

    /// Freeze the instance
    pub fn build(self) -> Instance {
        Instance::from_capabilities(self.identity, self.capabilities)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::text_property;
    use serde_json::json;

    fn alien(name: &str, phrase: &str) -> Instance {
        Instance::builder("alien")
            .property("name", name)
            .property("phrase", phrase)
            .property("species", "alien")
            .operation("fly", |_, _| Ok(Value::from("Zzzzzziiiiiinnnnnggggg!!")))
            .operation("say_phrase", |receiver, _| {
                text_property(receiver, "say_phrase", "phrase").map(Value::from)
            })
            .build()
    }

    #[test]
    fn test_builder_exposes_properties_and_operations() {
        let ali = alien("Ali", "I'm Ali the alien!");

        assert_eq!(ali.get("name"), Some(&Value::from("Ali")));
        assert_eq!(ali.call("say_phrase", &[]).unwrap(), Value::from("I'm Ali the alien!"));
        assert_eq!(
            ali.capability_names(),
            vec!["name", "phrase", "species", "fly", "say_phrase"]
        );
    }

    #[test]
    fn test_clone_shares_storage() {
        let ali = alien("Ali", "hi");
        let other = ali.clone();
        assert!(ali.ptr_eq(&other));
        assert!(!ali.ptr_eq(&alien("Ali", "hi")));
    }

    #[test]
    fn test_call_unknown_name() {
        let err = alien("Ali", "hi").call("swim", &[]).unwrap_err();
        assert_eq!(err, CompositionError::not_found("swim", "alien"));
    }

    #[test]
    fn test_from_table_freezes_properties() {
        let table = json!({"start": "App has started", "update": "App has updated"});
        let config = Instance::from_table("config", table.as_object().unwrap()).unwrap();

        assert_eq!(config.get("start"), Some(&Value::from("App has started")));
        assert_eq!(config.capabilities().len(), 2);
    }

    #[test]
    fn test_from_table_rejects_nested_tables() {
        let table = json!({"nested": {"a": 1}});
        let err = Instance::from_table("config", table.as_object().unwrap()).unwrap_err();
        assert!(matches!(err, CompositionError::Config { ref message } if message.contains("nested")));
    }

    #[test]
    fn test_from_toml_table() {
        let table: toml::Table = toml::from_str("name = \"Robert\"\nage = 3").unwrap();
        let instance = Instance::from_toml_table("person", &table).unwrap();
        assert_eq!(instance.get("name"), Some(&Value::from("Robert")));
        assert_eq!(instance.get("age"), Some(&Value::Int(3)));
    }

    #[test]
    fn test_from_toml_table_keeps_datetimes() {
        let table: toml::Table = toml::from_str("started = 1979-05-27T07:32:00Z").unwrap();
        let instance = Instance::from_toml_table("cfg", &table).unwrap();
        assert_eq!(instance.get("started"), Some(&Value::from("1979-05-27T07:32:00Z")));
    }

    #[test]
    fn test_from_toml_table_rejects_nested_tables_once() {
        let table: toml::Table = toml::from_str("[inner]\na = 1").unwrap();
        let err = Instance::from_toml_table("cfg", &table).unwrap_err();
        assert_eq!(
            err,
            CompositionError::config(
                "property 'inner' of 'cfg': nested tables cannot be used as capability values"
            )
        );
        assert_eq!(err.to_string().matches("Configuration error").count(), 1);
    }
}
