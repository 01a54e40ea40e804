use crate::model::{ScanFailure, ScanOutcome, ScanReport};
use anyhow::Result;
use std::fmt::Write as _;
use tabled::{settings::Style, Table, Tabled};

#[derive(Tabled)]
struct PackageRow {
    #[tabled(rename = "Package")]
    package: String,
    #[tabled(rename = "Vulns")]
    vulns: String,
    #[tabled(rename = "Status")]
    status: String,
}

#[derive(Tabled)]
struct VulnRow {
    #[tabled(rename = "Package")]
    package: String,
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Aliases")]
    aliases: String,
    #[tabled(rename = "Summary")]
    summary: String,
    #[tabled(rename = "Rated")]
    rated: String,
}

pub fn print_cli_table(outcome: &ScanOutcome) -> Result<()> {
    print!("{}", render(outcome));
    Ok(())
}

pub(super) fn render(outcome: &ScanOutcome) -> String {
    match outcome {
        ScanOutcome::Success(report) => render_report(report),
        ScanOutcome::Failure(failure) => render_failure(failure),
    }
}

fn render_failure(failure: &ScanFailure) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Error: {}", failure.error);
    if let Some(supported) = &failure.supported {
        let _ = writeln!(out, "Supported: {}", supported.join(", "));
    }
    if let Some(hint) = &failure.hint {
        let _ = writeln!(out, "Hint: {}", hint);
    }
    out
}

fn render_report(report: &ScanReport) -> String {
    let mut out = String::new();

    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "Scan completed at: {}",
        chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
    );
    let _ = writeln!(
        out,
        "Scanned {} {} packages from {} ({})",
        report.packages_scanned, report.ecosystem, report.filename, report.manifest
    );
    let _ = writeln!(out);

    let rows: Vec<PackageRow> = report
        .results
        .iter()
        .map(|r| PackageRow {
            package: truncate(&r.package, 40),
            vulns: if r.is_error() {
                "-".to_string()
            } else {
                r.vuln_count.to_string()
            },
            status: match &r.error {
                Some(e) => format!("\x1b[33mlookup failed\x1b[0m: {}", truncate(e, 50)),
                None if r.vuln_count > 0 => "\x1b[31mvulnerable\x1b[0m".to_string(),
                None => "\x1b[32mok\x1b[0m".to_string(),
            },
        })
        .collect();
    let _ = writeln!(out, "{}", Table::new(rows).with(Style::rounded()));

    let vuln_rows: Vec<VulnRow> = report
        .results
        .iter()
        .flat_map(|r| {
            r.vulnerabilities.iter().map(move |v| VulnRow {
                package: truncate(&r.package, 30),
                id: v.id.clone(),
                aliases: if v.aliases.is_empty() {
                    "-".to_string()
                } else {
                    truncate(&v.aliases.join(", "), 30)
                },
                summary: truncate(v.summary.as_deref().unwrap_or("-"), 50),
                rated: if v.has_severity() { "yes" } else { "-" }.to_string(),
            })
        })
        .collect();

    if !vuln_rows.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Found {} vulnerabilities:", vuln_rows.len());
        let _ = writeln!(out);
        let _ = writeln!(out, "{}", Table::new(vuln_rows).with(Style::rounded()));
    }

    if let Some(brief) = &report.executive_brief {
        let _ = writeln!(out);
        let _ = writeln!(out, "Executive brief:");
        let _ = writeln!(out);
        for line in brief.lines() {
            let _ = writeln!(out, "  {}", line);
        }
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "Summary:");
    let _ = writeln!(out, "  Total vulnerabilities: {}", report.total_vulnerabilities());
    let failed = report.failed_lookups();
    if failed > 0 {
        let _ = writeln!(out, "  Failed lookups: {}", failed);
    }
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "Risk Score: {}/100 {}",
        report.risk_score,
        risk_indicator(report.risk_score)
    );

    out
}

fn risk_indicator(score: u8) -> &'static str {
    match score {
        0 => "[None]",
        1..=24 => "[Low]",
        25..=49 => "[Moderate]",
        50..=74 => "[High]",
        _ => "[Critical]",
    }
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ScanError;
    use crate::model::{Ecosystem, ManifestKind, PackageResult, VulnerabilityRecord};

    fn report() -> ScanReport {
        let mut vuln = VulnerabilityRecord::new("GHSA-jfh8-c2jp-5v3q");
        vuln.summary = Some("Prototype pollution in lodash".to_string());
        vuln.aliases = vec!["CVE-2020-8203".to_string()];

        ScanReport {
            ok: true,
            filename: "package-lock.json".to_string(),
            manifest: ManifestKind::PackageLockJson,
            ecosystem: Ecosystem::npm(),
            packages_scanned: 2,
            risk_score: 8,
            executive_brief: Some("- Upgrade lodash\n- Re-scan".to_string()),
            results: vec![
                PackageResult::failed("left-pad", Ecosystem::npm(), "timed out"),
                PackageResult::found("lodash", Ecosystem::npm(), vec![vuln]),
            ],
        }
    }

    #[test]
    fn test_render_report() {
        let text = render(&ScanOutcome::Success(report()));

        assert!(text.contains("Scanned 2 npm packages from package-lock.json (package-lock.json)"));
        assert!(text.contains("GHSA-jfh8-c2jp-5v3q"));
        assert!(text.contains("CVE-2020-8203"));
        assert!(text.contains("lookup failed"));
        assert!(text.contains("  - Upgrade lodash\n  - Re-scan"));
        assert!(text.contains("Failed lookups: 1"));
        assert!(text.contains("Risk Score: 8/100 [Low]"));
    }

    #[test]
    fn test_render_failure() {
        let outcome = ScanOutcome::from(ScanError::UnsupportedFormat {
            filename: "notes.md".to_string(),
        });
        let text = render(&outcome);

        assert!(text.starts_with("Error: Unsupported file type."));
        assert!(text.contains("Supported: requirements.txt, pyproject.toml, package-lock.json"));
        assert!(text.contains("Hint: Upload"));
    }

    #[test]
    fn test_risk_indicator() {
        assert_eq!(risk_indicator(0), "[None]");
        assert_eq!(risk_indicator(11), "[Low]");
        assert_eq!(risk_indicator(30), "[Moderate]");
        assert_eq!(risk_indicator(60), "[High]");
        assert_eq!(risk_indicator(100), "[Critical]");
    }

    #[test]
    fn test_truncate_is_char_safe() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghij", 6), "abc...");
        assert_eq!(truncate("ééééééé", 5), "éé...");
    }
}
