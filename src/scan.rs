//! End-to-end scan of one uploaded manifest.
//!
//! ```text
//! filename + bytes -> parser -> checker -> score -> [brief] -> ScanOutcome
//! ```
//!
//! # Example
//!
//! ```no_run
//! use depbrief::{Config, ScanPipeline};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load()?;
//!     let pipeline = ScanPipeline::from_config(&config)?;
//!
//!     let outcome = pipeline.scan("requirements.txt", b"flask==2.0\n").await;
//!     println!("{}", serde_json::to_string_pretty(&outcome)?);
//!     Ok(())
//! }
//! ```

use tracing::{info, warn};

use crate::brief::BriefGenerator;
use crate::checker::{query_bulk, OsvClient, VulnerabilitySource};
use crate::config::Config;
use crate::error::QueryError;
use crate::model::{ScanOutcome, ScanReport};
use crate::parser::detect_and_extract;
use crate::score::score;

/// Runs scans against one vulnerability source.
pub struct ScanPipeline {
    source: Box<dyn VulnerabilitySource>,
    max_concurrent: usize,
}

impl ScanPipeline {
    pub fn new(source: Box<dyn VulnerabilitySource>, max_concurrent: usize) -> Self {
        Self {
            source,
            max_concurrent,
        }
    }

    /// Builds a pipeline backed by OSV.dev.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialised.
    pub fn from_config(config: &Config) -> Result<Self, QueryError> {
        let client = OsvClient::new(&config.osv)?;
        Ok(Self::new(
            Box::new(client),
            config.osv.max_concurrent_queries,
        ))
    }

    /// Parses, queries and scores a manifest.
    pub async fn scan(&self, filename: &str, content: &[u8]) -> ScanOutcome {
        match self.run(filename, content).await {
            Ok(report) => ScanOutcome::Success(report),
            Err(outcome) => outcome,
        }
    }

    /// Like [`scan`](Self::scan), then attaches an executive brief.
    ///
    /// Rejected manifests are returned without calling the brief backend.
    pub async fn scan_with_brief(
        &self,
        filename: &str,
        content: &[u8],
        brief: &BriefGenerator,
    ) -> ScanOutcome {
        let mut report = match self.run(filename, content).await {
            Ok(report) => report,
            Err(outcome) => return outcome,
        };

        let text = brief.generate(&report.results, report.risk_score).await;
        report.executive_brief = Some(text);
        ScanOutcome::Success(report)
    }

    async fn run(&self, filename: &str, content: &[u8]) -> Result<ScanReport, ScanOutcome> {
        let parsed = detect_and_extract(filename, content).map_err(|e| {
            warn!(filename, error = %e, "manifest rejected");
            ScanOutcome::from(e)
        })?;

        let packages = parsed.package_list();
        info!(
            filename,
            manifest = %parsed.kind,
            ecosystem = %parsed.ecosystem,
            packages = packages.len(),
            "scanning manifest"
        );

        let results = query_bulk(
            self.source.as_ref(),
            &packages,
            &parsed.ecosystem,
            self.max_concurrent,
        )
        .await;
        let risk_score = score(&results);

        info!(
            filename,
            risk_score,
            failed = results.iter().filter(|r| r.is_error()).count(),
            "scan complete"
        );

        Ok(ScanReport {
            ok: true,
            filename: filename.to_owned(),
            manifest: parsed.kind,
            ecosystem: parsed.ecosystem,
            packages_scanned: packages.len(),
            risk_score,
            executive_brief: None,
            results,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brief::{BriefBackend, BriefRequest};
    use crate::error::BriefError;
    use crate::model::{Ecosystem, ManifestKind, VulnerabilityRecord};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Every package gets one rated advisory except `broken`, which fails.
    struct StubSource {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl VulnerabilitySource for StubSource {
        fn name(&self) -> &'static str {
            "stub"
        }

        async fn query(
            &self,
            package: &str,
            _ecosystem: &Ecosystem,
        ) -> Result<Vec<VulnerabilityRecord>, QueryError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if package == "broken" {
                return Err(QueryError::Status {
                    status: 500,
                    body: "internal error".to_string(),
                });
            }
            let mut vuln = VulnerabilityRecord::new(format!("OSV-{package}"));
            vuln.severity.push(serde_json::json!({"type": "CVSS_V3"}));
            Ok(vec![vuln])
        }
    }

    fn pipeline() -> (ScanPipeline, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let source = StubSource {
            calls: calls.clone(),
        };
        (ScanPipeline::new(Box::new(source), 4), calls)
    }

    struct EchoBackend;

    #[async_trait]
    impl BriefBackend for EchoBackend {
        fn name(&self) -> &'static str {
            "Echo"
        }

        async fn generate(&self, request: &BriefRequest) -> Result<String, BriefError> {
            Ok(format!(
                "score {} across {} packages",
                request.risk_score,
                request.findings.len()
            ))
        }
    }

    #[tokio::test]
    async fn test_scan_requirements() {
        let (pipeline, calls) = pipeline();

        let outcome = pipeline
            .scan("requirements.txt", b"requests>=2.25\nbroken==1\nflask==2.0\n")
            .await;

        let ScanOutcome::Success(report) = outcome else {
            panic!("expected success");
        };
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(report.manifest, ManifestKind::RequirementsTxt);
        assert_eq!(report.ecosystem, Ecosystem::pypi());
        assert_eq!(report.packages_scanned, 3);

        let order: Vec<_> = report.results.iter().map(|r| r.package.as_str()).collect();
        assert_eq!(order, vec!["broken", "flask", "requests"]);
        assert!(report.results[0].is_error());
        assert_eq!(report.risk_score, 22);
        assert!(report.executive_brief.is_none());
    }

    #[tokio::test]
    async fn test_unsupported_file_is_not_queried() {
        let (pipeline, calls) = pipeline();

        let outcome = pipeline.scan("notes.md", b"flask==2.0\n").await;

        assert!(!outcome.is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["supported"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_malformed_lockfile_is_not_queried() {
        let (pipeline, calls) = pipeline();

        let outcome = pipeline.scan("package-lock.json", b"{oops").await;

        assert!(!outcome.is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_scan_with_brief() {
        let (pipeline, _) = pipeline();
        let brief = BriefGenerator::new(Box::new(EchoBackend), 25);

        let outcome = pipeline
            .scan_with_brief(
                "package-lock.json",
                br#"{"dependencies": {"lodash": {}, "left-pad": {}}}"#,
                &brief,
            )
            .await;

        let ScanOutcome::Success(report) = outcome else {
            panic!("expected success");
        };
        assert_eq!(report.ecosystem, Ecosystem::npm());
        assert_eq!(report.risk_score, 22);
        assert_eq!(
            report.executive_brief.as_deref(),
            Some("score 22 across 2 packages")
        );

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["executive_brief"], "score 22 across 2 packages");
    }

    #[tokio::test]
    async fn test_brief_skipped_for_empty_manifest() {
        let (pipeline, _) = pipeline();
        let brief = BriefGenerator::new(Box::new(EchoBackend), 25);

        let outcome = pipeline
            .scan_with_brief("pyproject.toml", b"[project]\n", &brief)
            .await;

        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["ok"], false);
        assert_eq!(json["error"], "No packages detected in pyproject.toml.");
        assert!(json.get("executive_brief").is_none());
    }
}
