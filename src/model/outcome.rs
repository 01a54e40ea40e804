use serde::{Deserialize, Serialize};

use super::{Ecosystem, ManifestKind, PackageResult};
use crate::error::ScanError;

/// Body returned when a manifest is rejected before querying.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanFailure {
    pub ok: bool,
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supported: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl From<&ScanError> for ScanFailure {
    fn from(err: &ScanError) -> Self {
        let (supported, hint) = match err {
            ScanError::UnsupportedFormat { .. } => {
                let names = ManifestKind::supported();
                let hint = format!(
                    "Upload {}, {}, or {}",
                    names[0], names[1], names[2]
                );
                (
                    Some(names.into_iter().map(String::from).collect()),
                    Some(hint),
                )
            }
            _ => (None, None),
        };

        Self {
            ok: false,
            error: err.to_string(),
            supported,
            hint,
        }
    }
}

/// Body returned for a completed scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanReport {
    pub ok: bool,
    pub filename: String,
    #[serde(rename = "type")]
    pub manifest: ManifestKind,
    pub ecosystem: Ecosystem,
    pub packages_scanned: usize,
    pub risk_score: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub executive_brief: Option<String>,
    pub results: Vec<PackageResult>,
}

impl ScanReport {
    pub fn total_vulnerabilities(&self) -> usize {
        self.results.iter().map(|r| r.vuln_count).sum()
    }

    pub fn failed_lookups(&self) -> usize {
        self.results.iter().filter(|r| r.is_error()).count()
    }
}

/// Result of scanning one manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScanOutcome {
    Success(ScanReport),
    Failure(ScanFailure),
}

impl ScanOutcome {
    pub fn is_ok(&self) -> bool {
        matches!(self, ScanOutcome::Success(_))
    }
}

impl From<ScanError> for ScanOutcome {
    fn from(err: ScanError) -> Self {
        ScanOutcome::Failure(ScanFailure::from(&err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_failure_lists_dialects() {
        let outcome = ScanOutcome::from(ScanError::UnsupportedFormat {
            filename: "notes.md".to_owned(),
        });
        let json = serde_json::to_value(&outcome).unwrap();

        assert_eq!(json["ok"], false);
        assert_eq!(json["error"], "Unsupported file type.");
        assert_eq!(
            json["supported"],
            serde_json::json!(["requirements.txt", "pyproject.toml", "package-lock.json"])
        );
        assert_eq!(
            json["hint"],
            "Upload requirements.txt, pyproject.toml, or package-lock.json"
        );
    }

    #[test]
    fn test_empty_failure_has_no_hint() {
        let outcome = ScanOutcome::from(ScanError::EmptyManifest {
            kind: ManifestKind::RequirementsTxt,
        });
        let json = serde_json::to_value(&outcome).unwrap();

        assert_eq!(json["error"], "No packages detected in requirements.txt.");
        assert!(json.get("supported").is_none());
        assert!(json.get("hint").is_none());
    }

    #[test]
    fn test_report_shape() {
        let report = ScanReport {
            ok: true,
            filename: "requirements.txt".to_owned(),
            manifest: ManifestKind::RequirementsTxt,
            ecosystem: Ecosystem::pypi(),
            packages_scanned: 2,
            risk_score: 11,
            executive_brief: None,
            results: vec![
                PackageResult::found("flask", Ecosystem::pypi(), Vec::new()),
                PackageResult::failed("requests", Ecosystem::pypi(), "boom"),
            ],
        };
        assert_eq!(report.failed_lookups(), 1);
        assert_eq!(report.total_vulnerabilities(), 0);

        let json = serde_json::to_value(ScanOutcome::Success(report)).unwrap();
        assert_eq!(json["ok"], true);
        assert_eq!(json["type"], "requirements.txt");
        assert_eq!(json["ecosystem"], "PyPI");
        assert_eq!(json["packages_scanned"], 2);
        assert_eq!(json["risk_score"], 11);
        assert!(json.get("executive_brief").is_none());
        assert_eq!(json["results"].as_array().unwrap().len(), 2);
    }
}
