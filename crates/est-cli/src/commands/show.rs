use anyhow::Context;
use est_core::entities::Report;
use est_core::ids::{PREFIX_REPORT, has_prefix};

use crate::cli::GlobalFlags;
use crate::cli::root_commands::ShowArgs;
use crate::context::AppContext;
use crate::output::{output, summary};

pub async fn run(args: &ShowArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let report = load(args, ctx).await?;
    if args.diagrams {
        output(&report, flags.format, summary::diagrams)
    } else {
        output(&report, flags.format, summary::report)
    }
}

async fn load(args: &ShowArgs, ctx: &AppContext) -> anyhow::Result<Report> {
    if has_prefix(&args.id, PREFIX_REPORT) {
        if args.at.is_some() {
            anyhow::bail!("--at applies to requirement ids, not report ids");
        }
        return ctx
            .store
            .get(&args.id)
            .await
            .with_context(|| format!("cannot show report '{}'", args.id));
    }

    match args.at {
        Some(version) => ctx
            .store
            .get_version(&args.id, version)
            .await
            .with_context(|| format!("cannot show version {version} of '{}'", args.id)),
        None => ctx
            .store
            .latest(&args.id)
            .await
            .with_context(|| format!("cannot show latest report of '{}'", args.id)),
    }
}
