use crate::cli::GlobalFlags;
use crate::context::AppContext;
use crate::output::{output, summary};

pub async fn run(requirement_id: &str, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let versions = ctx.store.list_versions(requirement_id).await?;
    output(&versions, flags.format, |v| summary::versions(v))
}
