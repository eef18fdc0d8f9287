//! CLI command handlers
//!
//! Each handler writes its report to the supplied writer so the binary can
//! hand it stdout and tests can hand it a buffer.

use motif_composition::{Capability, CapabilitySurface};
use std::io::{self, Write};

pub mod create;
pub mod variants;
pub mod walkthrough;

/// Print every visible capability of `surface`, one per line
pub(crate) fn write_surface(out: &mut impl Write, surface: &dyn CapabilitySurface) -> io::Result<()> {
    writeln!(out, "{}", surface.identity())?;
    for name in surface.capability_names() {
        match surface.lookup(&name) {
            Some(Capability::Property(value)) => writeln!(out, "  {name} = {value}")?,
            Some(Capability::Operation(_)) => writeln!(out, "  {name}()")?,
            None => {}
        }
    }
    Ok(())
}
