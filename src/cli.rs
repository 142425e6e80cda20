use std::path::PathBuf;

use clap::Parser;

/// Replays a connectivity scenario through the controller.
///
/// If no --scenario or --preset is given, the storymode preset is used.
#[derive(Debug, Parser)]
#[command(name = "connectivity-ctl", version)]
pub struct CliArgs {
    /// Load scenario from TOML config file
    #[arg(long, conflicts_with = "preset")]
    pub scenario: Option<PathBuf>,

    /// Use a built-in preset (storymode, disconnected)
    #[arg(long)]
    pub preset: Option<String>,

    /// Override the replay end time
    #[arg(long)]
    pub end: Option<u64>,

    /// Export step records to CSV
    #[arg(long)]
    pub telemetry_out: Option<PathBuf>,
}
