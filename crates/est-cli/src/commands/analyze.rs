use crate::cli::GlobalFlags;
use crate::cli::root_commands::AnalyzeArgs;
use crate::context::AppContext;
use crate::ingest;
use crate::output::{output, summary};

pub async fn run(args: &AnalyzeArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let requirement = ingest::load_requirement(args.text.as_deref(), &args.file)?;
    let engine = ctx.engine().await?;
    let report = engine.analyze(requirement).await?;
    output(&report, flags.format, summary::report)
}
