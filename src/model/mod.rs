//! Core data types for manifests, vulnerability results, and scan outcomes.
//!
//! - [`ManifestKind`] - A supported manifest dialect
//! - [`Ecosystem`] - The registry namespace a package belongs to
//! - [`VulnerabilityRecord`] - One advisory as reported by OSV.dev
//! - [`PackageResult`] - Lookup outcome for a single package
//! - [`ScanOutcome`] - Complete scan result, or the reason it was rejected
//!
//! # Example
//!
//! ```
//! use depbrief::model::{Ecosystem, PackageResult};
//!
//! let result = PackageResult::found("flask", Ecosystem::pypi(), Vec::new());
//! assert_eq!(result.vuln_count, 0);
//! assert!(result.error.is_none());
//! ```

mod manifest;
mod outcome;
mod vulnerability;

pub use manifest::*;
pub use outcome::*;
pub use vulnerability::*;
