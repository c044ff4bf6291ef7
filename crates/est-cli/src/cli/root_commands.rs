use std::path::PathBuf;

use clap::{ArgGroup, Args, Subcommand};

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Analyze a requirement into tasks, entities, endpoints and risks.
    Analyze(AnalyzeArgs),
    /// Analyze a stored requirement again, producing its next report version.
    Reanalyze(ReanalyzeArgs),
    /// Show a report by report id, or the latest report of a requirement.
    Show(ShowArgs),
    /// List the report versions of a requirement, newest first.
    Versions(VersionsArgs),
    /// Remove a requirement's similarity records so it is no longer retrieved as context.
    Purge(PurgeArgs),
}

#[derive(Clone, Debug, Args)]
#[command(group(ArgGroup::new("source").required(true).args(["text", "file"])))]
pub struct AnalyzeArgs {
    /// Requirement text.
    #[arg(long)]
    pub text: Option<String>,

    /// Markdown file(s) with requirements; repeat to merge several files.
    #[arg(long, num_args = 1..)]
    pub file: Vec<PathBuf>,
}

#[derive(Clone, Debug, Args)]
pub struct ReanalyzeArgs {
    /// Requirement id (`req-...`).
    pub requirement_id: String,
}

#[derive(Clone, Debug, Args)]
pub struct ShowArgs {
    /// Report id (`rpt-...`) or requirement id (`req-...`).
    pub id: String,

    /// Report version to show when `id` is a requirement id (defaults to latest).
    #[arg(long)]
    pub at: Option<u32>,

    /// Print only the Mermaid diagrams.
    #[arg(long)]
    pub diagrams: bool,
}

#[derive(Clone, Debug, Args)]
pub struct VersionsArgs {
    /// Requirement id (`req-...`).
    pub requirement_id: String,
}

#[derive(Clone, Debug, Args)]
pub struct PurgeArgs {
    /// Requirement id (`req-...`).
    pub requirement_id: String,
}
