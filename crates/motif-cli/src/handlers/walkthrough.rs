//! Walkthrough command handler
//!
//! Runs one short demonstration per composition pattern and prints what each
//! step produced. Failures that a demonstration expects (an unknown variant,
//! a denied call) are printed, not propagated.

use crate::catalog;
use crate::handlers::write_surface;
use anyhow::{Context, Result};
use motif_composition::{
    adapters::{convert_property, GuardDecision, Interceptor},
    compose, extension, CapabilitySet, CapabilitySurface, Composer, DelegateView, Instance, Value,
};
use motif_core::{text_property, ToolkitConfig};
use std::io::Write;

/// Run every demonstration in order
pub fn handle_walkthrough(config: &ToolkitConfig, out: &mut impl Write) -> Result<()> {
    singleton(out)?;
    factory(config, out)?;
    builder(out)?;
    prototype(out)?;
    adapter(out)?;
    decorator(out)?;
    proxy(out)?;
    Ok(())
}

fn heading(out: &mut impl Write, title: &str) -> std::io::Result<()> {
    writeln!(out, "== {title} ==")
}

fn singleton(out: &mut impl Write) -> Result<()> {
    heading(out, "Singleton")?;
    let table = serde_json::json!({ "app": "motif", "started": true, "retries": 3 });
    let table = table
        .as_object()
        .context("singleton table is not an object")?;
    let settings = Instance::from_table("settings", table)?;
    write_surface(out, &settings)?;

    let shared = settings.clone();
    writeln!(out, "clone shares storage: {}", shared.ptr_eq(&settings))?;

    let named = compose(
        settings.clone(),
        &[&CapabilitySet::new().with_property("name", "Robert")],
    )?;
    writeln!(
        out,
        "settings still without name: {}",
        !settings.has_capability("name")
    )?;
    writeln!(out, "extended copy: {}", named.identity())?;
    Ok(())
}

fn factory(config: &ToolkitConfig, out: &mut impl Write) -> Result<()> {
    heading(out, "Factory")?;
    let registry = catalog::registry(&config.registry)?;
    for key in ["car", "truck", "motorcycle"] {
        let vehicle = registry.create(key, &[])?;
        writeln!(
            out,
            "{} has {} wheels: {}",
            vehicle.call("name", &[])?,
            vehicle.call("wheels", &[])?,
            vehicle.call("turn_on", &[])?
        )?;
    }

    let ali = registry.create(
        "alien",
        &[Value::from("Ali"), Value::from("I'm Ali the alien!")],
    )?;
    writeln!(out, "{} says: {}", ali.call("name", &[])?, ali.call("say_phrase", &[])?)?;

    match registry.create("bus", &[]) {
        Ok(_) => writeln!(out, "bus unexpectedly created")?,
        Err(err) => writeln!(out, "bus: {err}")?,
    }
    Ok(())
}

fn bug(name: &str, phrase: &str) -> Instance {
    Instance::builder("bug")
        .property("name", name)
        .property("phrase", phrase)
        .build()
}

fn builder(out: &mut impl Write) -> Result<()> {
    heading(out, "Builder")?;
    let flying = extension("flying", |_base: &Instance| {
        CapabilitySet::new().with_operation("fly", |receiver, _| {
            let name = text_property(receiver, "fly", "name")?;
            Ok(Value::from(format!("Now {name} can fly!")))
        })
    });
    let speech = extension("speech", |_base: &Instance| {
        CapabilitySet::new().with_operation("say_something", |receiver, _| {
            let name = text_property(receiver, "say_something", "name")?;
            Ok(Value::from(format!("{name} walks the walk and talks the talk!")))
        })
    });

    let bug1 = Composer::new()
        .with(flying)
        .compose(bug("Buggy McFly", "Your debugger doesn't work with me!"))?;
    let bug2 = Composer::new()
        .with(speech)
        .compose(bug("Martiniano Buggland", "Can't touch this! Na na na na..."))?;
    writeln!(out, "{}", bug1.call("fly", &[])?)?;
    writeln!(out, "{}", bug2.call("say_something", &[])?)?;
    Ok(())
}

fn prototype(out: &mut impl Write) -> Result<()> {
    heading(out, "Prototype")?;
    let enemy = Instance::builder("enemy")
        .operation("attack", |_, _| Ok(Value::from("Pim Pam Pum!")))
        .operation("fly_away", |_, _| Ok(Value::from("Flyyyy like an eagle!")))
        .build();
    let bug = bug("Buggy McFly", "Your debugger doesn't work with me!");
    let view = DelegateView::new(&bug, &enemy);

    writeln!(out, "{}", view.call("phrase", &[])?)?;
    for name in ["attack", "fly_away"] {
        let bound = view.resolve(name)?;
        writeln!(out, "{} (from {}): {}", name, bound.receiver_identity(), bound.invoke(&[])?)?;
    }
    writeln!(out, "bug itself can attack: {}", bug.has_capability("attack"))?;
    Ok(())
}

fn adapter(out: &mut impl Write) -> Result<()> {
    heading(out, "Adapter")?;
    let mut cities: Vec<Instance> = [("London", 8.9), ("Rome", 2.8), ("New york", 8.8), ("Paris", 2.1)]
        .into_iter()
        .map(|(city, habitants)| {
            Instance::builder(city.to_lowercase())
                .property("city", city)
                .property("habitants", habitants)
                .build()
        })
        .collect();

    let buenos_aires = Instance::builder("buenos_aires")
        .property("city", "Buenos Aires")
        .property("habitants", 3_100_000)
        .build();
    let adapted = compose(
        buenos_aires.clone(),
        &[&convert_property("habitants", catalog::to_millions)],
    )?;
    writeln!(
        out,
        "Buenos Aires: {} -> {} million",
        buenos_aires.call("habitants", &[])?,
        adapted.call("habitants", &[])?
    )?;
    cities.push(adapted.into_instance());

    let most = cities
        .iter()
        .filter_map(|city| city.get("habitants").and_then(Value::as_float))
        .fold(f64::MIN, f64::max);
    writeln!(out, "most habitants: {most} million")?;
    Ok(())
}

fn decorator(out: &mut impl Write) -> Result<()> {
    heading(out, "Decorator")?;
    let user = Instance::builder("user")
        .property("name", "Kelly")
        .operation("say", |receiver, _| {
            let name = text_property(receiver, "say", "name")?;
            Ok(Value::from(format!("User: {name}")))
        })
        .build();
    let address = CapabilitySet::new()
        .with_property("street", "Broadway")
        .with_property("city", "New York")
        .with_operation("say", |receiver, _| {
            let name = text_property(receiver, "say", "name")?;
            let street = text_property(receiver, "say", "street")?;
            let city = text_property(receiver, "say", "city")?;
            Ok(Value::from(format!("Decorated User: {name}, {street}, {city}")))
        });

    let decorated = compose(user.clone(), &[&address])?;
    writeln!(out, "{}", user.call("say", &[])?)?;
    writeln!(out, "{}", decorated.call("say", &[])?)?;
    Ok(())
}

fn proxy(out: &mut impl Write) -> Result<()> {
    heading(out, "Proxy")?;
    let job_records = Instance::builder("job_records")
        .operation("find_job", |_, args| {
            let id = args.first().cloned().unwrap_or_default();
            Ok(Value::from(format!("job record {id}")))
        })
        .build();
    let authenticated = Interceptor::new("find_job").guard("authenticate_token", |_, args| {
        match args.get(1).and_then(Value::as_text) {
            Some("valid-token") => GuardDecision::Allow,
            Some(_) => GuardDecision::deny("invalid token"),
            None => GuardDecision::deny("missing token"),
        }
    });
    let guarded = compose(job_records, &[&authenticated])?;

    for token in ["valid-token", "forged"] {
        match guarded.call("find_job", &[Value::from("42"), Value::from(token)]) {
            Ok(job) => writeln!(out, "{token}: {job}")?,
            Err(err) => writeln!(out, "{token}: {err}")?,
        }
    }
    Ok(())
}
