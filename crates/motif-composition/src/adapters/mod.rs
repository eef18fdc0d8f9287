//! Ready-made extensions for the composer
//!
//! This module provides extensions that adapt or guard an existing base
//! instead of contributing new behavior: property conversion and aliasing
//! (adapter) and guarded operations (proxy).

mod convert;
mod intercept;

pub use convert::{alias_capability, convert_property, AliasAdapter, PropertyAdapter};
pub use intercept::{GuardDecision, GuardFn, Interceptor};

use motif_core::{CapabilitySet, Instance};
use tracing::debug;

/// Empty contribution for an adapter whose target is missing on the base
pub(crate) fn skip(adapter: &str, target: &str, base: &Instance) -> CapabilitySet {
    debug!(
        adapter = adapter,
        target = target,
        base = %motif_core::CapabilitySurface::identity(base),
        "Adapter target missing on base; contributing nothing"
    );
    CapabilitySet::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composite::{compose, Provenance};
    use motif_core::{CapabilitySurface, Value};

    #[test]
    fn test_adapters_stack_in_order() {
        let city = Instance::builder("buenos_aires")
            .property("city", "Buenos Aires")
            .property("habitants", 3_100_000)
            .build();
        let millions = convert_property("habitants", |value| {
            value.as_float().map(|n| Value::Float((n / 100_000.0).round() / 10.0))
        });
        let alias = alias_capability("habitants", "population");
        let guarded = Interceptor::new("population").guard("non_negative", |receiver, _| {
            match receiver.property_value("habitants").and_then(Value::as_float) {
                Some(n) if n >= 0.0 => GuardDecision::Allow,
                _ => GuardDecision::deny("negative population"),
            }
        });

        // Every adapter sees the original base: the alias re-exposes the raw
        // count and the interceptor finds no `population` to guard
        let composed = compose(city, &[&millions, &alias, &guarded]).unwrap();
        assert_eq!(composed.call("habitants", &[]).unwrap(), Value::Float(3.1));
        assert_eq!(composed.call("population", &[]).unwrap(), Value::Int(3_100_000));
        assert_eq!(composed.provenance("population"), Some(Provenance::Extension(1)));
        assert!(composed.layers()[2].capabilities().is_empty());
        assert_eq!(composed.base().get("habitants"), Some(&Value::Int(3_100_000)));
        assert!(composed.has_capability("population"));
    }
}
