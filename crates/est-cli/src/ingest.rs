//! Requirement ingestion from text and markdown files.

use std::path::{Path, PathBuf};

use anyhow::Context;
use est_core::entities::RequirementDocument;
use est_core::enums::SourceKind;

const FILE_SEPARATOR: &str = "\n\n---\n\n";

/// Split markdown into heading-delimited sections.
///
/// A heading line (`#` to `######` followed by whitespace) starts a new
/// section whose first line is the heading text. Blank sections are dropped;
/// a document with no content yields an empty list.
pub fn extract_sections(markdown: &str) -> Vec<String> {
    let mut sections = Vec::new();
    let mut current = String::new();

    for line in markdown.lines() {
        if let Some(title) = heading_text(line) {
            push_section(&mut sections, &current);
            current = format!("{title}\n");
        } else {
            current.push_str(line);
            current.push('\n');
        }
    }
    push_section(&mut sections, &current);
    sections
}

fn heading_text(line: &str) -> Option<&str> {
    let hashes = line.chars().take_while(|c| *c == '#').count();
    if !(1..=6).contains(&hashes) {
        return None;
    }
    let rest = &line[hashes..];
    if rest.starts_with(char::is_whitespace) {
        Some(rest.trim_start())
    } else {
        None
    }
}

fn push_section(sections: &mut Vec<String>, text: &str) {
    let trimmed = text.trim();
    if !trimmed.is_empty() {
        sections.push(trimmed.to_string());
    }
}

/// Requirement text from one markdown document.
pub fn markdown_requirement(markdown: &str) -> String {
    extract_sections(markdown).join("\n\n")
}

/// Merge several markdown documents, each under a `# From <name>:` header.
pub fn merge_documents(documents: &[(String, String)]) -> String {
    documents
        .iter()
        .map(|(name, markdown)| {
            let mut lines = vec![format!("# From {name}:"), String::new()];
            lines.extend(extract_sections(markdown));
            lines.join("\n")
        })
        .collect::<Vec<_>>()
        .join(FILE_SEPARATOR)
}

/// Build a requirement from either inline text or markdown files.
pub fn load_requirement(text: Option<&str>, files: &[PathBuf]) -> anyhow::Result<RequirementDocument> {
    let (raw_text, kind) = match (text, files) {
        (Some(text), _) => (text.trim().to_string(), SourceKind::Text),
        (None, [single]) => (markdown_requirement(&read_file(single)?), SourceKind::Markdown),
        (None, []) => anyhow::bail!("no requirement given; pass --text or --file"),
        (None, many) => {
            let documents = many
                .iter()
                .map(|path| Ok((display_name(path), read_file(path)?)))
                .collect::<anyhow::Result<Vec<_>>>()?;
            (merge_documents(&documents), SourceKind::Markdown)
        }
    };

    if raw_text.trim().is_empty() {
        anyhow::bail!("requirement text is empty");
    }
    tracing::debug!(kind = %kind, chars = raw_text.len(), files = files.len(), "requirement ingested");
    Ok(RequirementDocument::new(raw_text, kind))
}

fn read_file(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path)
        .with_context(|| format!("failed to read requirement file {}", path.display()))
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned())
}
