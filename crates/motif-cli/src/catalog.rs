//! Built-in variant catalog
//!
//! Vehicles and aliens registered under stable keys, plus the helpers the
//! handlers share for turning command-line text into values.

use motif_composition::{
    CompositionResult, Instance, RegistryConfig, Value, VariantDescriptor, VariantRegistry,
};
use motif_core::text_property;

/// A vehicle with a fixed wheel count and engine sound
fn vehicle(name: &str, wheels: i64, sound: &'static str) -> Instance {
    Instance::builder(name.to_lowercase())
        .property("name", name)
        .property("wheels", wheels)
        .operation("turn_on", move |_, _| Ok(Value::from(sound)))
        .build()
}

/// An alien built from `[name, phrase]` arguments
pub fn alien(args: &[Value]) -> Instance {
    let name = args.first().and_then(Value::as_text).unwrap_or("Nameless");
    let phrase = args.get(1).and_then(Value::as_text).unwrap_or("...");
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

/// Descriptors for every catalog entry, in listing order
pub fn descriptors() -> Vec<VariantDescriptor> {
    vec![
        VariantDescriptor::new("car", |_| vehicle("Car", 4, "Chacabum!!")),
        VariantDescriptor::new("truck", |_| {
            vehicle("Truck", 8, "RRRRRRRRUUUUUUUUUMMMMMMMMMM!!")
        }),
        VariantDescriptor::new("motorcycle", |_| {
            vehicle("Motorcycle", 2, "sssssssssshhhhhhhhham!!")
        }),
        VariantDescriptor::new("alien", alien),
    ]
}

/// Registry holding the whole catalog
pub fn registry(config: &RegistryConfig) -> CompositionResult<VariantRegistry> {
    let registry = VariantRegistry::from_config(config);
    registry.register_all(descriptors())?;
    Ok(registry)
}

/// Interpret a command-line argument as the narrowest matching value
pub fn parse_arg(raw: &str) -> Value {
    if let Ok(int) = raw.parse::<i64>() {
        return Value::Int(int);
    }
    if let Ok(float) = raw.parse::<f64>() {
        if float.is_finite() {
            return Value::Float(float);
        }
    }
    match raw {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => Value::from(raw),
    }
}

/// Scale an integer head count down to millions with one decimal
pub fn to_millions(value: &Value) -> Option<Value> {
    let count = value.as_int()?;
    Some(Value::Float((count as f64 / 100_000.0).round() / 10.0))
}
