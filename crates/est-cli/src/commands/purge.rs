use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::context::AppContext;
use crate::output::output;

#[derive(Debug, Serialize)]
struct PurgeResponse<'a> {
    requirement_id: &'a str,
    removed: usize,
}

pub async fn run(requirement_id: &str, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let removed = ctx.store.purge_similarity(requirement_id).await?;
    tracing::info!(requirement_id, removed, "similarity records purged");
    let response = PurgeResponse {
        requirement_id,
        removed,
    };
    output(&response, flags.format, |r| {
        format!(
            "Removed {} similarity record(s) for {}",
            r.removed, r.requirement_id
        )
    })
}
