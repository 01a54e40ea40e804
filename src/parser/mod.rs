//! Manifest dialect detection and package extraction.
//!
//! | Dialect | Suffix | Ecosystem |
//! |---------|--------|-----------|
//! | [`ManifestKind::RequirementsTxt`] | `requirements.txt` | PyPI |
//! | [`ManifestKind::PackageLockJson`] | `package-lock.json` | npm |
//! | [`ManifestKind::PyprojectToml`] | `pyproject.toml` | PyPI |
//!
//! # Example
//!
//! ```
//! use depbrief::parser::detect_and_extract;
//!
//! let parsed = detect_and_extract("requirements.txt", b"flask==2.0\nrequests>=2.25\n").unwrap();
//! assert_eq!(parsed.ecosystem.as_str(), "PyPI");
//! assert_eq!(parsed.packages.len(), 2);
//! ```

mod lockfile;
mod pyproject;
mod requirements;

pub use lockfile::parse_package_lock;
pub use pyproject::parse_pyproject;
pub use requirements::parse_requirements;

use std::collections::BTreeSet;

use tracing::debug;

use crate::error::ScanError;
use crate::model::{Ecosystem, ManifestKind};

/// Characters that end a package name in a requirement specifier.
pub(crate) const VERSION_OPERATORS: [char; 5] = ['<', '>', '=', '!', '~'];

/// Characters treated as line ends in manifest text, including lone `\r`.
const LINE_BREAKS: [char; 10] = [
    '\n', '\r', '\x0b', '\x0c', '\x1c', '\x1d', '\x1e', '\u{85}', '\u{2028}', '\u{2029}',
];

/// Package names extracted from one manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedManifest {
    pub kind: ManifestKind,
    pub ecosystem: Ecosystem,
    /// Unique names in lexicographic order.
    pub packages: BTreeSet<String>,
}

impl ParsedManifest {
    pub fn package_list(&self) -> Vec<String> {
        self.packages.iter().cloned().collect()
    }
}

/// Detects the dialect from `filename` and extracts its package names.
///
/// Only the file name selects the dialect. Content is decoded lossily, so
/// invalid UTF-8 never fails on its own.
///
/// # Errors
///
/// - [`ScanError::UnsupportedFormat`] when no dialect suffix matches
/// - [`ScanError::MalformedManifest`] when a lockfile is not valid JSON
/// - [`ScanError::EmptyManifest`] when no package names were found
pub fn detect_and_extract(filename: &str, content: &[u8]) -> Result<ParsedManifest, ScanError> {
    let kind = ManifestKind::detect(filename).ok_or_else(|| ScanError::UnsupportedFormat {
        filename: filename.to_owned(),
    })?;

    let text = String::from_utf8_lossy(content);

    let packages = match kind {
        ManifestKind::RequirementsTxt => parse_requirements(&text),
        ManifestKind::PackageLockJson => parse_package_lock(&text)?,
        ManifestKind::PyprojectToml => parse_pyproject(&text),
    };

    debug!(%kind, packages = packages.len(), "parsed manifest");

    if packages.is_empty() {
        return Err(ScanError::EmptyManifest { kind });
    }

    Ok(ParsedManifest {
        kind,
        ecosystem: kind.ecosystem(),
        packages,
    })
}

/// Splits manifest text into lines on any [`LINE_BREAKS`] character.
///
/// A `\r\n` pair yields an extra empty line, which both line parsers skip.
pub(crate) fn manifest_lines(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| LINE_BREAKS.contains(&c))
}

/// Returns the part of `requirement` before the first version operator.
pub(crate) fn name_before_operator(requirement: &str) -> &str {
    match requirement.find(&VERSION_OPERATORS[..]) {
        Some(pos) => &requirement[..pos],
        None => requirement,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(parsed: &ParsedManifest) -> Vec<&str> {
        parsed.packages.iter().map(String::as_str).collect()
    }

    #[test]
    fn test_requirements_scenario() {
        let parsed = detect_and_extract(
            "requirements.txt",
            b"flask==2.0\n# comment\n\nrequests>=2.25\n",
        )
        .unwrap();

        assert_eq!(parsed.kind, ManifestKind::RequirementsTxt);
        assert_eq!(parsed.ecosystem, Ecosystem::pypi());
        assert_eq!(names(&parsed), vec!["flask", "requests"]);
    }

    #[test]
    fn test_package_lock_scenario() {
        let parsed = detect_and_extract(
            "package-lock.json",
            br#"{"dependencies": {"lodash": {}, "left-pad": {}}}"#,
        )
        .unwrap();

        assert_eq!(parsed.kind, ManifestKind::PackageLockJson);
        assert_eq!(parsed.ecosystem, Ecosystem::npm());
        assert_eq!(names(&parsed), vec!["left-pad", "lodash"]);
    }

    #[test]
    fn test_pyproject_dispatch() {
        let parsed =
            detect_and_extract("pyproject.toml", b"[project]\ndependencies = [\n  \"httpx>=0.27\",\n]\n")
                .unwrap();

        assert_eq!(parsed.kind, ManifestKind::PyprojectToml);
        assert_eq!(parsed.ecosystem, Ecosystem::pypi());
        assert!(parsed.packages.contains("httpx"));
    }

    #[test]
    fn test_unsupported_ignores_content() {
        let contents: [&[u8]; 3] = [b"", b"flask==2.0\n", br#"{"dependencies": {"a": {}}}"#];
        for content in contents {
            let err = detect_and_extract("notes.md", content).unwrap_err();
            assert!(matches!(err, ScanError::UnsupportedFormat { .. }));
        }
    }

    #[test]
    fn test_uppercase_filename() {
        let parsed = detect_and_extract("REQUIREMENTS.TXT", b"Django\n").unwrap();
        assert_eq!(names(&parsed), vec!["Django"]);
    }

    #[test]
    fn test_empty_manifest() {
        let err = detect_and_extract("requirements.txt", b"# nothing here\n\n").unwrap_err();
        assert!(matches!(
            err,
            ScanError::EmptyManifest {
                kind: ManifestKind::RequirementsTxt
            }
        ));

        let err = detect_and_extract("package-lock.json", b"{}").unwrap_err();
        assert!(matches!(
            err,
            ScanError::EmptyManifest {
                kind: ManifestKind::PackageLockJson
            }
        ));
    }

    #[test]
    fn test_malformed_lockfile() {
        let err = detect_and_extract("package-lock.json", b"{not json").unwrap_err();
        assert!(matches!(
            err,
            ScanError::MalformedManifest {
                kind: ManifestKind::PackageLockJson,
                ..
            }
        ));
    }

    #[test]
    fn test_invalid_utf8_is_lossy() {
        let parsed = detect_and_extract("requirements.txt", b"flask==2.0\n\xff\xfebad\nnumpy\n").unwrap();
        assert!(parsed.packages.contains("flask"));
        assert!(parsed.packages.contains("numpy"));
        assert!(parsed.packages.contains("\u{FFFD}\u{FFFD}bad"));
    }

    #[test]
    fn test_reparse_sorted_output_is_stable() {
        let first = detect_and_extract(
            "requirements.txt",
            b"requests[security]>=2.0\nflask==2.0\nnumpy~=1.26\nflask<3\n",
        )
        .unwrap();

        let flat = first.package_list().join("\n");
        let second = detect_and_extract("requirements.txt", flat.as_bytes()).unwrap();

        assert_eq!(first.packages, second.packages);
    }

    #[test]
    fn test_classic_mac_line_endings() {
        let parsed = detect_and_extract("requirements.txt", b"flask==2.0\rrequests>=2.25\r").unwrap();
        assert_eq!(names(&parsed), vec!["flask", "requests"]);
    }

    #[test]
    fn test_manifest_lines() {
        let lines: Vec<&str> = manifest_lines("a\r\nb\rc\x0cd\u{2028}e\u{85}f\ng")
            .filter(|l| !l.is_empty())
            .collect();
        assert_eq!(lines, vec!["a", "b", "c", "d", "e", "f", "g"]);
    }

    #[test]
    fn test_name_before_operator() {
        assert_eq!(name_before_operator("flask==2.0"), "flask");
        assert_eq!(name_before_operator("numpy!=1.0"), "numpy");
        assert_eq!(name_before_operator("pkg~=1"), "pkg");
        assert_eq!(name_before_operator("plain"), "plain");
        assert_eq!(name_before_operator(">=1"), "");
    }
}
