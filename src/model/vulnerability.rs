use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::Ecosystem;

/// Upper bound on the stored `details` text, in bytes.
pub const MAX_DETAILS_BYTES: usize = 800;

/// A single advisory, copied from OSV.dev.
///
/// `severity` and `references` are kept as opaque JSON; the scorer only
/// looks at whether `severity` is empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VulnerabilityRecord {
    pub id: String,
    pub summary: Option<String>,
    pub details: Option<String>,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub severity: Vec<Value>,
    #[serde(default)]
    pub references: Vec<Value>,
}

impl VulnerabilityRecord {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            summary: None,
            details: None,
            aliases: Vec::new(),
            severity: Vec::new(),
            references: Vec::new(),
        }
    }

    pub fn has_severity(&self) -> bool {
        !self.severity.is_empty()
    }
}

/// Lookup outcome for one package.
///
/// Built through [`PackageResult::found`] or [`PackageResult::failed`] so that
/// an error never coexists with vulnerability data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackageResult {
    pub package: String,
    pub ecosystem: Ecosystem,
    pub vuln_count: usize,
    pub vulnerabilities: Vec<VulnerabilityRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PackageResult {
    pub fn found(
        package: impl Into<String>,
        ecosystem: Ecosystem,
        vulnerabilities: Vec<VulnerabilityRecord>,
    ) -> Self {
        Self {
            package: package.into(),
            ecosystem,
            vuln_count: vulnerabilities.len(),
            vulnerabilities,
            error: None,
        }
    }

    pub fn failed(package: impl Into<String>, ecosystem: Ecosystem, error: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            ecosystem,
            vuln_count: 0,
            vulnerabilities: Vec::new(),
            error: Some(error.into()),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Cuts `text` to at most `max_bytes` without splitting a character.
pub fn truncate_utf8(text: &str, max_bytes: usize) -> &str {
    if text.len() <= max_bytes {
        return text;
    }
    let mut end = max_bytes;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}
