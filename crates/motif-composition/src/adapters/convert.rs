//! Property conversion and aliasing adapters

use crate::adapters::skip;
use crate::composite::Extension;
use motif_core::{Capability, CapabilitySet, CapabilitySurface, Instance, Value};

/// Re-exposes a base property after converting it
pub struct PropertyAdapter<F> {
    property: String,
    convert: F,
}

/// Convert the base property `property` with `convert`.
///
/// The converted value shadows the original on the composed surface; the
/// base keeps its value. If the base lacks the property, or `convert`
/// returns `None`, the adapter contributes nothing.
pub fn convert_property<F>(property: impl Into<String>, convert: F) -> PropertyAdapter<F>
where
    F: Fn(&Value) -> Option<Value> + Send + Sync,
{
    PropertyAdapter {
        property: property.into(),
        convert,
    }
}

impl<F> Extension for PropertyAdapter<F>
where
    F: Fn(&Value) -> Option<Value> + Send + Sync,
{
    fn name(&self) -> &str {
        "convert"
    }

    fn extend(&self, base: &Instance) -> CapabilitySet {
        let Some(original) = base.get(&self.property) else {
            return skip("convert", &self.property, base);
        };
        match (self.convert)(original) {
            Some(converted) => CapabilitySet::new().with_property(self.property.clone(), converted),
            None => skip("convert", &self.property, base),
        }
    }
}

/// Exposes an existing base capability under another name
#[derive(Debug, Clone)]
pub struct AliasAdapter {
    target: String,
    alias: String,
}

/// Expose the base capability `target` under `alias` as well
pub fn alias_capability(target: impl Into<String>, alias: impl Into<String>) -> AliasAdapter {
    AliasAdapter {
        target: target.into(),
        alias: alias.into(),
    }
}

impl Extension for AliasAdapter {
    fn name(&self) -> &str {
        "alias"
    }

    fn extend(&self, base: &Instance) -> CapabilitySet {
        match base.lookup(&self.target) {
            Some(capability) => {
                let mut set = CapabilitySet::new();
                set.insert(self.alias.clone(), Capability::clone(capability));
                set
            }
            None => skip("alias", &self.target, base),
        }
    }
}
