//! Year-set validation - runs before any network activity

use crate::ingestion::types::{Dataset, HarvestError, MIN_YEAR};
use tracing::warn;

/// Validate a caller-supplied year collection for one dataset.
///
/// Every year must fall within `[MIN_YEAR, dataset max]`. Duplicates are
/// dropped with a warning. The result is sorted ascending so identical
/// requests always produce identical output, whatever order the caller
/// listed the years in.
pub fn validate_years(dataset: Dataset, years: &[i32]) -> Result<Vec<i32>, HarvestError> {
    if years.is_empty() {
        return Err(HarvestError::InvalidArgument(
            "year list cannot be empty".to_string(),
        ));
    }

    let max_year = dataset.max_year();
    if let Some(bad) = years.iter().find(|&&y| y < MIN_YEAR || y > max_year) {
        return Err(HarvestError::InvalidArgument(format!(
            "year {} is outside the supported range [{}, {}] for the {} dataset",
            bad, MIN_YEAR, max_year, dataset
        )));
    }

    let mut unique = years.to_vec();
    unique.sort_unstable();
    unique.dedup();
    if unique.len() < years.len() {
        warn!(
            "Dropped {} duplicate year(s) from the request",
            years.len() - unique.len()
        );
    }

    Ok(unique)
}
