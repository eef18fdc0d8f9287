//! Guarded operations
//!
//! An [`Interceptor`] places an ordered chain of guards in front of one base
//! capability. Each guard inspects the receiver and arguments and either lets
//! the call through to the next guard or denies it; the first denial ends the
//! chain and the wrapped capability never runs.

use crate::adapters::skip;
use crate::composite::Extension;
use motif_core::{
    CapabilitySet, CapabilitySurface, CompositionError, Instance, Value,
};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Verdict of a single guard
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// Continue with the next guard
    Allow,
    /// Stop and reject the call with a reason
    Deny(String),
}

impl GuardDecision {
    /// Create a denial
    pub fn deny(reason: impl Into<String>) -> Self {
        Self::Deny(reason.into())
    }
}

/// Signature of a guard
pub type GuardFn = dyn Fn(&dyn CapabilitySurface, &[Value]) -> GuardDecision + Send + Sync;

/// Extension wrapping one base capability with a guard chain
#[derive(Clone)]
pub struct Interceptor {
    operation: String,
    guards: Vec<(String, Arc<GuardFn>)>,
}

impl Interceptor {
    /// Intercept calls to the base capability `operation`
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            guards: Vec::new(),
        }
    }

    /// Append a guard; guards run in the order they were added
    pub fn guard<G>(mut self, name: impl Into<String>, guard: G) -> Self
    where
        G: Fn(&dyn CapabilitySurface, &[Value]) -> GuardDecision + Send + Sync + 'static,
    {
        self.guards.push((name.into(), Arc::new(guard)));
        self
    }

    /// Name of the intercepted capability
    pub fn operation(&self) -> &str {
        &self.operation
    }

    /// Number of guards in the chain
    pub fn guard_count(&self) -> usize {
        self.guards.len()
    }
}

impl fmt::Debug for Interceptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Interceptor")
            .field("operation", &self.operation)
            .field(
                "guards",
                &self.guards.iter().map(|(name, _)| name.as_str()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl Extension for Interceptor {
    fn name(&self) -> &str {
        "intercept"
    }

    fn extend(&self, base: &Instance) -> CapabilitySet {
        let Some(target) = base.lookup(&self.operation).cloned() else {
            return skip("intercept", &self.operation, base);
        };
        let operation = self.operation.clone();
        let guards = self.guards.clone();

        CapabilitySet::new().with_operation(self.operation.clone(), move |receiver, args| {
            for (guard_name, guard) in &guards {
                if let GuardDecision::Deny(reason) = guard(receiver, args) {
                    debug!(
                        operation = %operation,
                        guard = %guard_name,
                        reason = %reason,
                        "Guard denied call"
                    );
                    return Err(CompositionError::denied(operation.as_str(), reason));
                }
            }
            target.invoke(receiver, args)
        })
    }
}
