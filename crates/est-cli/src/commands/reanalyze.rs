use crate::cli::GlobalFlags;
use crate::context::AppContext;
use crate::output::{output, summary};

pub async fn run(requirement_id: &str, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let engine = ctx.engine().await?;
    let report = engine.reanalyze(requirement_id).await?;
    output(&report, flags.format, summary::report)
}
