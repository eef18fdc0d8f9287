//! End-to-end scenarios across registry, composer and delegate views

use assert_matches::assert_matches;
use motif_composition::{
    adapters::{convert_property, GuardDecision, Interceptor},
    compose, resolve, CapabilitySet, CapabilitySurface, Composer, CompositionError, DelegateSource,
    DelegateView, Instance, RegistryMode, Value, VariantRegistry,
};
use motif_core::text_property;

fn vehicle(name: &str, wheels: i64, sound: &'static str) -> Instance {
    Instance::builder(name.to_lowercase())
        .property("name", name)
        .property("wheels", wheels)
        .operation("turn_on", move |_, _| Ok(Value::from(sound)))
        .build()
}

#[test]
fn test_car_and_truck_variants() {
    let registry = VariantRegistry::new();
    registry
        .register("car", |_| vehicle("Car", 4, "Chacabum!!"))
        .unwrap();
    registry
        .register("truck", |_| vehicle("Truck", 8, "RRRRUUUUMMMM!!"))
        .unwrap();

    let car = registry.create("car", &[]).unwrap();
    let truck = registry.create("truck", &[]).unwrap();
    assert_eq!(car.get("wheels"), Some(&Value::Int(4)));
    assert_eq!(truck.get("wheels"), Some(&Value::Int(8)));

    let err = registry.create("bus", &[]).unwrap_err();
    assert_matches!(
        err,
        CompositionError::UnknownVariant { key, known }
            if key == "bus" && known == vec!["car".to_string(), "truck".to_string()]
    );
}

#[test]
fn test_decorated_say_leaves_base_untouched() {
    let base = Instance::builder("base")
        .operation("say", |_, _| Ok(Value::from("base")))
        .build();
    let decoration = CapabilitySet::new().with_operation("say", |_, _| Ok(Value::from("decorated")));

    let composed = compose(base.clone(), &[&decoration]).unwrap();
    assert_eq!(composed.call("say", &[]).unwrap(), Value::from("decorated"));
    assert_eq!(base.call("say", &[]).unwrap(), Value::from("base"));
}

#[test]
fn test_prototype_style_delegation() {
    let enemy = Instance::builder("enemy")
        .operation("attack", |_, _| Ok(Value::from("Pim Pam Pum!")))
        .operation("fly_away", |_, _| Ok(Value::from("Flyyyy like an eagle!")))
        .build();
    let bug = Instance::builder("bug")
        .property("name", "Buggy McFly")
        .property("phrase", "Your debugger doesn't work with me!")
        .build();

    let view = DelegateView::new(&bug, &enemy);
    assert_eq!(
        view.call("phrase", &[]).unwrap(),
        Value::from("Your debugger doesn't work with me!")
    );
    let attack = resolve(&view, "attack").unwrap();
    assert_eq!(attack.source(), DelegateSource::Fallback);
    assert_eq!(attack.invoke(&[]).unwrap(), Value::from("Pim Pam Pum!"));
    assert!(!bug.has_capability("attack"));
}

#[test]
fn test_registry_then_composer_then_delegate() {
    let registry = VariantRegistry::with_mode(RegistryMode::Strict);
    registry
        .register("alien", |args| {
            let name = args.first().and_then(Value::as_text).unwrap_or("Nameless");
            let phrase = args.get(1).and_then(Value::as_text).unwrap_or("...");
            Instance::builder("alien")
                .property("name", name)
                .property("phrase", phrase)
                .property("species", "alien")
                .build()
        })
        .unwrap();

    let ali = registry
        .create("alien", &[Value::from("Ali"), Value::from("I'm Ali the alien!")])
        .unwrap();

    let flying = CapabilitySet::new().with_operation("fly", |receiver, _| {
        let name = text_property(receiver, "fly", "name")?;
        Ok(Value::from(format!("Now {name} can fly!")))
    });
    let composed = Composer::new().with(flying).compose(ali).unwrap();

    let defaults = Instance::builder("defaults")
        .property("lives", 3)
        .property("species", "unknown")
        .build();
    let view = DelegateView::new(&composed, &defaults);

    assert_eq!(view.call("fly", &[]).unwrap(), Value::from("Now Ali can fly!"));
    assert_eq!(view.call("lives", &[]).unwrap(), Value::Int(3));
    assert_eq!(view.call("species", &[]).unwrap(), Value::from("alien"));
}

#[test]
fn test_composed_variant_can_be_registered_again() {
    let registry = VariantRegistry::new();
    let base = vehicle("Motorcycle", 2, "sssshhhham!!");
    let loud = CapabilitySet::new().with_operation("turn_on", |_, _| Ok(Value::from("VROOOM")));
    let flattened = compose(base, &[&loud]).unwrap().into_instance();

    registry
        .register("loud_motorcycle", move |_| flattened.clone())
        .unwrap();
    let created = registry.create("loud_motorcycle", &[]).unwrap();
    assert_eq!(created.call("turn_on", &[]).unwrap(), Value::from("VROOOM"));
    assert_eq!(created.get("wheels"), Some(&Value::Int(2)));
}

#[test]
fn test_adapter_and_proxy_together() {
    let city = Instance::builder("buenos_aires")
        .property("city", "Buenos Aires")
        .property("habitants", 3_100_000)
        .operation("report", |receiver, _| {
            let city = text_property(receiver, "report", "city")?;
            let habitants = receiver
                .property_value("habitants")
                .cloned()
                .unwrap_or_default();
            Ok(Value::from(format!("{city}: {habitants}")))
        })
        .build();

    let millions = convert_property("habitants", |value| {
        value
            .as_int()
            .map(|n| Value::Float((n as f64 / 100_000.0).round() / 10.0))
    });
    let guarded = Interceptor::new("report").guard("token", |_, args| {
        if args.first().and_then(Value::as_text) == Some("secret") {
            GuardDecision::Allow
        } else {
            GuardDecision::deny("bad token")
        }
    });
    let composed = compose(city, &[&millions, &guarded]).unwrap();

    assert_eq!(
        composed.call("report", &[Value::from("secret")]).unwrap(),
        Value::from("Buenos Aires: 3.1")
    );
    assert_matches!(
        composed.call("report", &[]),
        Err(CompositionError::Denied { operation, .. }) if operation == "report"
    );
}
