//! Vulnerability lookups against an advisory database.
//!
//! [`VulnerabilitySource`] answers one package at a time; [`query_bulk`]
//! fans a package list out over a source with bounded concurrency and
//! folds every per-package failure into its [`PackageResult`].

mod osv;

pub use osv::{OsvClient, OSV_API_URL};

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use tracing::{debug, warn};

use crate::error::QueryError;
use crate::model::{Ecosystem, PackageResult, VulnerabilityRecord};

/// A database that can list the advisories affecting a package.
#[async_trait]
pub trait VulnerabilitySource: Send + Sync {
    fn name(&self) -> &'static str;

    /// Returns every known advisory for `package` in `ecosystem`.
    async fn query(
        &self,
        package: &str,
        ecosystem: &Ecosystem,
    ) -> Result<Vec<VulnerabilityRecord>, QueryError>;
}

/// Queries every package and returns one result per input, in input order.
///
/// At most `max_concurrent` lookups are in flight at once. A failed lookup
/// produces an error result for that package and never stops the batch.
pub async fn query_bulk(
    source: &dyn VulnerabilitySource,
    packages: &[String],
    ecosystem: &Ecosystem,
    max_concurrent: usize,
) -> Vec<PackageResult> {
    debug!(
        source = source.name(),
        packages = packages.len(),
        max_concurrent,
        "querying vulnerabilities"
    );

    stream::iter(packages)
        .map(|package| async move {
            match source.query(package, ecosystem).await {
                Ok(vulns) => PackageResult::found(package.as_str(), ecosystem.clone(), vulns),
                Err(e) => {
                    warn!(package = %package, error = %e, "vulnerability lookup failed");
                    PackageResult::failed(package.as_str(), ecosystem.clone(), e.to_string())
                }
            }
        })
        .buffered(max_concurrent.max(1))
        .collect()
        .await
}
