//! Variants command handler

use crate::catalog;
use anyhow::Result;
use motif_core::ToolkitConfig;
use std::io::Write;

/// List catalog keys in registration order
pub fn handle_variants(config: &ToolkitConfig, out: &mut impl Write) -> Result<()> {
    let registry = catalog::registry(&config.registry)?;
    for key in &registry.keys() {
        writeln!(out, "{key}")?;
    }
    Ok(())
}
