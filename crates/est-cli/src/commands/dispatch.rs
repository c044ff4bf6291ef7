use crate::cli::{Commands, GlobalFlags};
use crate::commands;
use crate::context::AppContext;

pub async fn dispatch(command: Commands, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    match command {
        Commands::Analyze(args) => commands::analyze::run(&args, ctx, flags).await,
        Commands::Reanalyze(args) => commands::reanalyze::run(&args.requirement_id, ctx, flags).await,
        Commands::Show(args) => commands::show::run(&args, ctx, flags).await,
        Commands::Versions(args) => commands::versions::run(&args.requirement_id, ctx, flags).await,
        Commands::Purge(args) => commands::purge::run(&args.requirement_id, ctx, flags).await,
    }
}
