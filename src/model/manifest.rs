use serde::{Deserialize, Serialize};

/// Manifest dialects understood by the parser.
///
/// Declaration order is detection priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ManifestKind {
    #[serde(rename = "requirements.txt")]
    RequirementsTxt,
    #[serde(rename = "package-lock.json")]
    PackageLockJson,
    #[serde(rename = "pyproject.toml")]
    PyprojectToml,
}

impl ManifestKind {
    /// All dialects, in detection order.
    pub const ALL: [ManifestKind; 3] = [
        ManifestKind::RequirementsTxt,
        ManifestKind::PackageLockJson,
        ManifestKind::PyprojectToml,
    ];

    /// File-name suffix that selects this dialect.
    pub fn file_name(&self) -> &'static str {
        match self {
            ManifestKind::RequirementsTxt => "requirements.txt",
            ManifestKind::PackageLockJson => "package-lock.json",
            ManifestKind::PyprojectToml => "pyproject.toml",
        }
    }

    pub fn ecosystem(&self) -> Ecosystem {
        match self {
            ManifestKind::RequirementsTxt | ManifestKind::PyprojectToml => Ecosystem::pypi(),
            ManifestKind::PackageLockJson => Ecosystem::npm(),
        }
    }

    /// Picks the dialect for a file name by case-insensitive suffix match.
    pub fn detect(filename: &str) -> Option<ManifestKind> {
        let lowered = filename.to_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| lowered.ends_with(kind.file_name()))
    }

    /// File names listed in the "supported" hint of a rejected scan.
    pub fn supported() -> Vec<&'static str> {
        vec![
            ManifestKind::RequirementsTxt.file_name(),
            ManifestKind::PyprojectToml.file_name(),
            ManifestKind::PackageLockJson.file_name(),
        ]
    }
}

impl std::fmt::Display for ManifestKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.file_name())
    }
}

/// Registry namespace tag, passed to OSV.dev verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ecosystem(String);

impl Ecosystem {
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    pub fn pypi() -> Self {
        Self::new("PyPI")
    }

    pub fn npm() -> Self {
        Self::new("npm")
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Ecosystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
