use blazebridge_config::ConfigLoader;
use clap::Parser;
use std::path::PathBuf;

mod commands;
mod execute;

use commands::Commands;

#[derive(Parser)]
#[command(name = "blazebridge")]
#[command(about = "Read Build Event Protocol output and locate test results", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file to use instead of the discovered one
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

fn main() -> eyre::Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    let mut loader = ConfigLoader::new();
    if let Some(path) = &cli.config {
        loader = loader.file(path);
    }
    let loaded = loader.load()?;

    let filter = if cli.verbose {
        Some("debug")
    } else {
        loaded.config.log_filter.as_deref()
    };
    if let Err(e) = blazebridge_utils::tracing::init(filter) {
        eprintln!("Warning: failed to initialise logging: {e}");
    }
    tracing::debug!(sources = ?loaded.sources, "configuration loaded");

    cli.command.execute(&loaded.config)
}
