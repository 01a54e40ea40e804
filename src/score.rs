//! Aggregate risk scoring.

use crate::model::PackageResult;

/// Points per reported vulnerability.
pub const POINTS_PER_VULN: usize = 8;
/// Extra points per vulnerability that carries severity data.
pub const POINTS_PER_SEVERITY: usize = 3;
pub const MAX_SCORE: u8 = 100;

/// Reduces scan results to a risk score in `0..=100`.
///
/// Each vulnerability counts 8 points, plus 3 when its severity list is
/// non-empty. The sum saturates at 100. Failed lookups contribute nothing.
///
/// # Example
///
/// ```
/// use depbrief::score::score;
///
/// assert_eq!(score(&[]), 0);
/// ```
pub fn score(results: &[PackageResult]) -> u8 {
    let total = results.iter().fold(0usize, |acc, result| {
        let rated = result
            .vulnerabilities
            .iter()
            .filter(|v| v.has_severity())
            .count();

        acc.saturating_add(result.vuln_count.saturating_mul(POINTS_PER_VULN))
            .saturating_add(rated.saturating_mul(POINTS_PER_SEVERITY))
    });

    total.min(MAX_SCORE as usize) as u8
}
