//! Request builder - assembles SIDRA query URLs for one (block, year) pair

use crate::ingestion::types::DatasetSpec;

/// Build the full query URL for one block of municipality codes and one year.
///
/// SIDRA path segments are positional; the literal tokens (`values`, `t`,
/// `n6`, `v`, `p`) and their order must not change. `n6` is the municipality
/// geography level. The classification dimension is always requested with
/// all categories.
pub fn build_query(base_url: &str, spec: &DatasetSpec, block: &[String], year: i32) -> String {
    format!(
        "{}/values/t/{}/n6/{}/v/{}/p/{}/{}/all",
        base_url.trim_end_matches('/'),
        spec.dataset.table_id(),
        block.join(","),
        spec.variable_selector,
        year,
        spec.dataset.classification(),
    )
}
