use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::{RiskKind, Severity};

/// A risk note attached to a report.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Risk {
    pub description: String,
    pub severity: Severity,
    pub kind: RiskKind,
}

impl Risk {
    #[must_use]
    pub fn new(kind: RiskKind, severity: Severity, description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            severity,
            kind,
        }
    }
}
