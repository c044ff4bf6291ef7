//! ID prefixes and formatting helpers.
//!
//! Report IDs are random (`rpt-a3f8b2c1`, minted by the store). Requirement IDs
//! are content-derived so that re-analysing the same text links the new report
//! version to the existing requirement.

use sha2::{Digest, Sha256};

pub const PREFIX_REQUIREMENT: &str = "req";
pub const PREFIX_REPORT: &str = "rpt";
pub const PREFIX_RELATIONSHIP: &str = "rel";

/// Number of hex characters kept from the content digest.
const REQUIREMENT_DIGEST_LEN: usize = 16;

/// Derive the requirement ID for a piece of requirement text.
///
/// Leading and trailing whitespace does not affect the ID.
#[must_use]
pub fn requirement_id(raw_text: &str) -> String {
    let digest = Sha256::digest(raw_text.trim().as_bytes());
    let hex = hex::encode(digest);
    format!("{PREFIX_REQUIREMENT}-{}", &hex[..REQUIREMENT_DIGEST_LEN])
}

/// Synthesized relationship ID for the record at `position` (1-based).
#[must_use]
pub fn relationship_id(position: usize) -> String {
    format!("{PREFIX_RELATIONSHIP}-{position}")
}

/// Check whether `id` carries the given prefix (`"{prefix}-..."`).
#[must_use]
pub fn has_prefix(id: &str, prefix: &str) -> bool {
    id.strip_prefix(prefix)
        .is_some_and(|rest| rest.starts_with('-') && rest.len() > 1)
}
