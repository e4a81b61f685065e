//! Harvest orchestration - plan, fetch, assemble, persist
//!
//! One generic pipeline parameterized by a [`DatasetSpec`]; the three public
//! entry points are thin configuration selectors over it.

use crate::ingestion::fetch::{fetch_block, FetchOutcome};
use crate::ingestion::municipalities::Municipalities;
use crate::ingestion::request::build_query;
use crate::ingestion::table::{assemble_year, Table};
use crate::ingestion::types::{
    AgriculturalVariable, DatasetSpec, FailureKind, FetchFailure, FetchReport, HarvestError,
    HarvestOutput, PipelineConfig,
};
use crate::ingestion::validate::validate_years;
use crate::ingestion::write::{snapshot_filename, write_snapshot};
use chrono::Utc;
use futures::stream::{self, StreamExt};
use reqwest::Client;
use tracing::{debug, info, warn};

/// Run one harvest: validate the year set, fetch every (year, block) pair,
/// assemble the final table, and persist the snapshot.
///
/// Requests run through a bounded pool (`config.concurrency`; 1 means fully
/// sequential). Results are sorted by (year, block) position before
/// assembly, so row order never depends on completion order. Per-request
/// failures end up in the returned report; the snapshot is still written.
pub async fn run(
    client: &Client,
    spec: &DatasetSpec,
    municipalities: &Municipalities,
    years: &[i32],
    config: &PipelineConfig,
) -> Result<HarvestOutput, HarvestError> {
    let years = validate_years(spec.dataset, years)?;
    let started_at = Utc::now();

    let blocks: Vec<&[String]> = municipalities.blocks(config.block_size).collect();
    let requests: Vec<(usize, usize, i32, String)> = years
        .iter()
        .enumerate()
        .flat_map(|(year_idx, &year)| {
            blocks.iter().enumerate().map(move |(block_idx, block)| {
                let url = build_query(&config.base_url, spec, block, year);
                (year_idx, block_idx, year, url)
            })
        })
        .collect();

    let total = requests.len();
    info!(
        "Harvesting {} ({}): {} year(s) x {} block(s) = {} requests",
        spec.dataset, spec.variable_label, years.len(), blocks.len(), total
    );

    let mut results: Vec<(usize, usize, i32, FetchOutcome)> =
        stream::iter(requests.into_iter().map(|(year_idx, block_idx, year, url)| async move {
            let outcome = fetch_block(client, &url).await;
            (year_idx, block_idx, year, outcome)
        }))
        .buffer_unordered(config.concurrency.max(1))
        .collect()
        .await;

    results.sort_by_key(|&(year_idx, block_idx, _, _)| (year_idx, block_idx));

    let mut per_year: Vec<Vec<Table>> = years.iter().map(|_| Vec::new()).collect();
    let mut failures = Vec::new();
    let mut succeeded = 0;

    for (year_idx, block_idx, year, outcome) in results {
        match outcome {
            FetchOutcome::Data(table) => {
                succeeded += 1;
                per_year[year_idx].push(table);
            }
            FetchOutcome::Skipped(kind) => {
                match kind {
                    FailureKind::NoData => {
                        debug!("Year {} block {}: {}", year, block_idx, kind)
                    }
                    _ => warn!("Year {} block {}: {}", year, block_idx, kind),
                }
                failures.push(FetchFailure {
                    year,
                    block_index: block_idx,
                    kind,
                });
            }
        }
    }

    let mut final_table = Table::new();
    for (year_idx, &year) in years.iter().enumerate() {
        let year_table = assemble_year(std::mem::take(&mut per_year[year_idx]), year);
        final_table.merge(year_table);
    }

    let filename = snapshot_filename(spec, &years);
    let snapshot_path = write_snapshot(&final_table, &config.output_dir, &filename)?;

    let report = FetchReport {
        started_at,
        finished_at: Utc::now(),
        requests: total,
        succeeded,
        failures,
    };
    info!("Harvest complete: {}", report);

    Ok(HarvestOutput {
        table: final_table,
        report,
        snapshot_path,
    })
}

/// Fetch PAM agricultural production for one of its four named variables.
pub async fn fetch_agricultural_production(
    client: &Client,
    municipalities: &Municipalities,
    variable: AgriculturalVariable,
    years: &[i32],
    config: &PipelineConfig,
) -> Result<HarvestOutput, HarvestError> {
    let spec = DatasetSpec::agricultural(variable);
    run(client, &spec, municipalities, years, config).await
}

/// Fetch PPM livestock inventory (all variables of table 3939).
pub async fn fetch_livestock_production(
    client: &Client,
    municipalities: &Municipalities,
    years: &[i32],
    config: &PipelineConfig,
) -> Result<HarvestOutput, HarvestError> {
    let spec = DatasetSpec::livestock();
    run(client, &spec, municipalities, years, config).await
}

/// Fetch PEVS forestry extraction quantities (table 291, variable 142).
pub async fn fetch_forestry_production(
    client: &Client,
    municipalities: &Municipalities,
    years: &[i32],
    config: &PipelineConfig,
) -> Result<HarvestOutput, HarvestError> {
    let spec = DatasetSpec::forestry();
    run(client, &spec, municipalities, years, config).await
}
