//! Error types for the scan pipeline.
//!
//! Only [`ScanError`] ever stops a scan, and only before any query is sent.
//! [`QueryError`] and [`BriefError`] are always folded back into data: the
//! former into [`PackageResult::error`](crate::model::PackageResult), the
//! latter into the brief text.

use crate::model::ManifestKind;

/// Manifest-level failures that reject a scan before querying.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    /// The file name matches none of the supported dialects.
    #[error("Unsupported file type.")]
    UnsupportedFormat {
        /// File name as uploaded.
        filename: String,
    },

    /// The dialect was recognized but no package names came out of it.
    #[error("No packages detected in {kind}.")]
    EmptyManifest {
        /// Detected dialect.
        kind: ManifestKind,
    },

    /// The dialect was recognized but its structure could not be parsed.
    #[error("Failed to parse {kind}: {reason}")]
    MalformedManifest {
        /// Detected dialect.
        kind: ManifestKind,
        /// Parser message.
        reason: String,
    },
}

/// A single package lookup failed.
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("OSV API returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid OSV response: {0}")]
    Decode(String),
}

/// The text-generation backend could not produce a brief.
#[derive(Debug, thiserror::Error)]
pub enum BriefError {
    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    #[error("{status} returned by {backend}: {body}")]
    Status {
        backend: &'static str,
        status: u16,
        body: String,
    },

    #[error("missing credential: {0}")]
    MissingCredential(&'static str),

    #[error("malformed response: {0}")]
    Malformed(String),
}
