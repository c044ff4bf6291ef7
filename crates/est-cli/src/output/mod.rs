use serde::Serialize;

use crate::cli::OutputFormat;

pub mod summary;

/// Print `value` as JSON, or `summary` for the human-readable format.
pub fn output<T: Serialize>(value: &T, format: OutputFormat, summary: impl FnOnce(&T) -> String) -> anyhow::Result<()> {
    let rendered = match format {
        OutputFormat::Json => serde_json::to_string_pretty(value)?,
        OutputFormat::Summary => summary(value),
    };
    println!("{rendered}");
    Ok(())
}
