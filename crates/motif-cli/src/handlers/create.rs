//! Create command handler

use crate::catalog;
use crate::handlers::write_surface;
use anyhow::Result;
use motif_composition::Value;
use motif_core::ToolkitConfig;
use std::io::Write;

/// Create the variant `key` from raw arguments, print it, and optionally
/// invoke one of its capabilities
pub fn handle_create(
    config: &ToolkitConfig,
    key: &str,
    raw_args: &[String],
    call: Option<&str>,
    out: &mut impl Write,
) -> Result<()> {
    let registry = catalog::registry(&config.registry)?;
    let args: Vec<Value> = raw_args.iter().map(|raw| catalog::parse_arg(raw)).collect();
    let instance = registry.create(key, &args)?;
    tracing::debug!(key = %key, args = args.len(), "Created variant");

    write_surface(out, &instance)?;
    if let Some(name) = call {
        let result = instance.call(name, &[])?;
        writeln!(out, "{name}() -> {result}")?;
    }
    Ok(())
}
