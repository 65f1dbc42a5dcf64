use super::app_config::{LogLevel, OutputFormat};
use crate::application::selectors::AutocloseStrategy;
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "chanview",
    version,
    about = "Prints the channel sidebar and unread counts of a chat state snapshot",
    long_about = None
)]
pub struct CliArgs {
    /// State snapshot (JSON) to read.
    #[arg(value_name = "SNAPSHOT")]
    pub snapshot: PathBuf,

    /// Configuration file path.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log file path.
    #[arg(long, value_name = "PATH")]
    pub log_path: Option<PathBuf>,

    /// Log verbosity level.
    #[arg(long, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Team to report on instead of the snapshot's current team.
    #[arg(long, value_name = "TEAM_ID")]
    pub team: Option<String>,

    /// Force the legacy grouped sidebar on or off.
    #[arg(long)]
    pub legacy: Option<bool>,

    /// Autoclose rule for direct messages.
    #[arg(long, value_enum)]
    pub autoclose: Option<AutocloseStrategy>,

    /// Output format.
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,
}
