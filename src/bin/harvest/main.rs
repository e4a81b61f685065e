//! Harvest orchestrator - fetches one SIDRA dataset and writes its snapshot
//!
//! Usage:
//!   harvest agricultural --years 2019,2020 --variable planted_area
//!   harvest livestock --years 2020
//!   harvest forestry --years 1998,2005,2012

use anyhow::{bail, Context, Result};
use sidra_harvest::ingestion::fetch::build_client;
use sidra_harvest::ingestion::municipalities::DEFAULT_MUNICIPALITIES_PATH;
use sidra_harvest::{
    fetch_agricultural_production, fetch_forestry_production, fetch_livestock_production,
    AgriculturalVariable, HarvestOutput, Municipalities, PipelineConfig,
};
use std::env;
use std::path::PathBuf;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_target(false)
        .init();

    dotenvy::dotenv().ok();
    let config = Config::from_env()?;
    let args = Args::parse(env::args().skip(1))?;

    let municipalities = Municipalities::from_path(&config.municipalities_path)?;
    let client = build_client()?;

    let pipeline = PipelineConfig {
        base_url: config.base_url,
        block_size: config.block_size,
        concurrency: config.concurrency,
        output_dir: config.output_dir,
    };

    let output: HarvestOutput = match args.dataset.as_str() {
        "agricultural" => {
            let variable = match &args.variable {
                Some(name) => AgriculturalVariable::from_name(name)?,
                None => bail!(
                    "the agricultural dataset needs --variable (planted_area, \
                     harvested_area, quantity_produced, average_yield)"
                ),
            };
            fetch_agricultural_production(
                &client,
                &municipalities,
                variable,
                &args.years,
                &pipeline,
            )
            .await?
        }
        "livestock" => {
            fetch_livestock_production(&client, &municipalities, &args.years, &pipeline).await?
        }
        "forestry" => {
            fetch_forestry_production(&client, &municipalities, &args.years, &pipeline).await?
        }
        other => bail!("unknown dataset '{}' (expected agricultural, livestock, or forestry)", other),
    };

    info!(
        "Snapshot: {} ({} rows)",
        output.snapshot_path.display(),
        output.table.row_count()
    );
    for failure in output.report.errors() {
        warn!(
            "Missing contribution - year {} block {}: {}",
            failure.year, failure.block_index, failure.kind
        );
    }

    Ok(())
}

/// Command-line arguments
#[derive(Debug)]
struct Args {
    dataset: String,
    years: Vec<i32>,
    variable: Option<String>,
}

impl Args {
    fn parse(mut args: impl Iterator<Item = String>) -> Result<Self> {
        let dataset = args
            .next()
            .context("usage: harvest <dataset> --years <y1,y2,...> [--variable <name>]")?;

        let mut years = Vec::new();
        let mut variable = None;

        while let Some(flag) = args.next() {
            match flag.as_str() {
                "--years" => {
                    let list = args.next().context("--years needs a value")?;
                    years = list
                        .split(',')
                        .map(|y| {
                            y.trim()
                                .parse::<i32>()
                                .with_context(|| format!("invalid year '{}'", y))
                        })
                        .collect::<Result<Vec<_>>>()?;
                }
                "--variable" => {
                    variable = Some(args.next().context("--variable needs a value")?);
                }
                other => bail!("unknown flag '{}'", other),
            }
        }

        if years.is_empty() {
            bail!("--years is required, e.g. --years 2019,2020");
        }

        Ok(Args {
            dataset,
            years,
            variable,
        })
    }
}

/// Configuration loaded from environment variables
#[derive(Debug, Clone)]
struct Config {
    base_url: String,
    block_size: usize,
    concurrency: usize,
    output_dir: PathBuf,
    municipalities_path: PathBuf,
}

impl Config {
    fn from_env() -> Result<Self> {
        let defaults = PipelineConfig::default();
        Ok(Config {
            base_url: env::var("SIDRA_BASE_URL").unwrap_or(defaults.base_url),

            block_size: env::var("SIDRA_BLOCK_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.block_size),

            concurrency: env::var("SIDRA_CONCURRENCY")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.concurrency),

            output_dir: env::var("SIDRA_OUTPUT_DIR")
                .unwrap_or_else(|_| ".".to_string())
                .into(),

            municipalities_path: env::var("SIDRA_MUNICIPALITIES")
                .unwrap_or_else(|_| DEFAULT_MUNICIPALITIES_PATH.to_string())
                .into(),
        })
    }
}
