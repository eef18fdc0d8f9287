//! Motif demo CLI
//!
//! Command-line front end for the Motif composition toolkit. Lists the
//! built-in variant catalog, creates variants on demand, and walks through
//! the composition patterns end to end.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use motif_core::{MotifConfig, ToolkitConfig};
use std::io::Write;
use std::path::{Path, PathBuf};

mod catalog;
mod handlers;

#[derive(Parser)]
#[command(name = "motif")]
#[command(about = "Motif - capability composition toolkit demo", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file path (ignored when missing)
    #[arg(short, long, global = true, default_value = "motif.toml")]
    config: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// List the variant keys of the built-in catalog
    Variants,

    /// Create a variant and print its surface
    Create {
        /// Variant key
        key: String,

        /// Constructor arguments; numbers and booleans are parsed, the rest is text
        args: Vec<String>,

        /// Capability to invoke on the created instance
        #[arg(long)]
        call: Option<String>,
    },

    /// Run every pattern demonstration in order
    Walkthrough,
}

/// Load the config file if present, then apply environment overrides
fn load_config(path: &Path) -> Result<ToolkitConfig> {
    let mut config = if path.exists() {
        ToolkitConfig::load_from_file(path)
            .with_context(|| format!("loading {}", path.display()))?
    } else {
        ToolkitConfig::default()
    };
    config.merge_with_env()?;
    config.validate()?;
    Ok(config)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli.config)?;

    // Initialize logging
    let log_filter = if cli.verbose {
        "debug"
    } else {
        config.logging.filter.as_str()
    };
    tracing_subscriber::fmt()
        .with_env_filter(log_filter)
        .with_writer(std::io::stderr)
        .init();
    tracing::debug!(mode = %config.registry.mode, "Configuration loaded");

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Commands::Variants => handlers::variants::handle_variants(&config, &mut out)?,
        Commands::Create { key, args, call } => {
            handlers::create::handle_create(&config, &key, &args, call.as_deref(), &mut out)?
        }
        Commands::Walkthrough => handlers::walkthrough::handle_walkthrough(&config, &mut out)?,
    }

    out.flush()?;
    Ok(())
}
