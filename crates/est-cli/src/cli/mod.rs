use clap::Parser;

pub mod global;
pub mod root_commands;

pub use global::{GlobalFlags, OutputFormat};
pub use root_commands::Commands;

/// Top-level CLI parser for the `est` binary.
#[derive(Debug, Parser)]
#[command(
    name = "est",
    version,
    about = "Turn software requirements into task estimates, data models and diagrams"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format: summary, json
    #[arg(short, long, global = true, default_value = "summary")]
    pub format: OutputFormat,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

impl Cli {
    #[must_use]
    pub fn global_flags(&self) -> GlobalFlags {
        GlobalFlags {
            format: self.format,
        }
    }
}
