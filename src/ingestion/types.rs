//! Core data types for the harvest pipeline
//! Dataset configurations, error taxonomy, and run reporting

use chrono::{DateTime, Utc};
use std::path::PathBuf;
use thiserror::Error;

/// Earliest year any of the SIDRA production tables covers at municipality level
pub const MIN_YEAR: i32 = 1998;

/// The three SIDRA production datasets this crate harvests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dataset {
    /// PAM - Produção Agrícola Municipal (table 5457)
    Agricultural,
    /// PPM - Pesquisa da Pecuária Municipal (table 3939)
    Livestock,
    /// PEVS - Produção da Extração Vegetal e da Silvicultura (table 291)
    Forestry,
}

impl Dataset {
    /// Label used in snapshot filenames
    pub fn label(&self) -> &'static str {
        match self {
            Dataset::Agricultural => "Agricultural",
            Dataset::Livestock => "Livestock",
            Dataset::Forestry => "Forestry",
        }
    }

    pub fn table_id(&self) -> u32 {
        match self {
            Dataset::Agricultural => 5457,
            Dataset::Livestock => 3939,
            Dataset::Forestry => 291,
        }
    }

    /// SIDRA classification dimension token, requested with all categories
    pub fn classification(&self) -> &'static str {
        match self {
            Dataset::Agricultural => "c782",
            Dataset::Livestock => "c79",
            Dataset::Forestry => "c194",
        }
    }

    /// Latest reference year published for this dataset
    pub fn max_year(&self) -> i32 {
        match self {
            Dataset::Agricultural => 2023,
            Dataset::Livestock => 2023,
            Dataset::Forestry => 2023,
        }
    }
}

impl std::fmt::Display for Dataset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Named variables of the agricultural dataset (PAM table 5457).
/// The set is closed; the other two datasets have a single implicit variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgriculturalVariable {
    PlantedArea,
    HarvestedArea,
    QuantityProduced,
    AverageYield,
}

impl AgriculturalVariable {
    pub fn code(&self) -> u32 {
        match self {
            AgriculturalVariable::PlantedArea => 8331,
            AgriculturalVariable::HarvestedArea => 216,
            AgriculturalVariable::QuantityProduced => 214,
            AgriculturalVariable::AverageYield => 112,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            AgriculturalVariable::PlantedArea => "planted_area",
            AgriculturalVariable::HarvestedArea => "harvested_area",
            AgriculturalVariable::QuantityProduced => "quantity_produced",
            AgriculturalVariable::AverageYield => "average_yield",
        }
    }

    /// Parse a user-supplied variable name
    pub fn from_name(name: &str) -> Result<Self, HarvestError> {
        match name {
            "planted_area" => Ok(AgriculturalVariable::PlantedArea),
            "harvested_area" => Ok(AgriculturalVariable::HarvestedArea),
            "quantity_produced" => Ok(AgriculturalVariable::QuantityProduced),
            "average_yield" => Ok(AgriculturalVariable::AverageYield),
            other => Err(HarvestError::InvalidArgument(format!(
                "unknown agricultural variable '{}' (expected one of: planted_area, \
                 harvested_area, quantity_produced, average_yield)",
                other
            ))),
        }
    }
}

impl std::fmt::Display for AgriculturalVariable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Fully resolved request parameters for one dataset run
#[derive(Debug, Clone)]
pub struct DatasetSpec {
    pub dataset: Dataset,
    /// Variable path segment: a numeric code, or "all" for datasets
    /// with no variable concept to select
    pub variable_selector: String,
    /// Variable label used in the snapshot filename
    pub variable_label: String,
}

impl DatasetSpec {
    pub fn agricultural(variable: AgriculturalVariable) -> Self {
        DatasetSpec {
            dataset: Dataset::Agricultural,
            variable_selector: variable.code().to_string(),
            variable_label: variable.name().to_string(),
        }
    }

    pub fn livestock() -> Self {
        DatasetSpec {
            dataset: Dataset::Livestock,
            variable_selector: "all".to_string(),
            variable_label: "herd_size".to_string(),
        }
    }

    pub fn forestry() -> Self {
        DatasetSpec {
            dataset: Dataset::Forestry,
            // PEVS publishes a single variable (142, extraction quantity)
            variable_selector: "142".to_string(),
            variable_label: "extraction_quantity".to_string(),
        }
    }
}

/// Pipeline tuning knobs, normally filled from the environment by the binary
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// API base, e.g. https://apisidra.ibge.gov.br
    pub base_url: String,
    /// Maximum municipality codes per request (SIDRA URL-length limit)
    pub block_size: usize,
    /// Concurrent in-flight requests; 1 = fully sequential
    pub concurrency: usize,
    /// Directory snapshots are written into
    pub output_dir: PathBuf,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            base_url: "https://apisidra.ibge.gov.br".to_string(),
            block_size: 100,
            concurrency: 4,
            output_dir: PathBuf::from("."),
        }
    }
}

/// Fatal errors; per-request failures are reported, not raised
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("municipality universe: {0}")]
    Universe(String),

    #[error("failed to write snapshot {path:?}: {source}")]
    Snapshot {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

/// Why a single (year, block) request contributed no rows
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    /// Server answered with a non-200 status
    HttpStatus(u16),
    /// Connection, DNS, or timeout failure
    Transport(String),
    /// 200 response whose body did not parse as a SIDRA payload
    MalformedBody(String),
    /// Well-formed response with a header row and nothing else
    NoData,
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureKind::HttpStatus(code) => write!(f, "http status {}", code),
            FailureKind::Transport(detail) => write!(f, "transport error: {}", detail),
            FailureKind::MalformedBody(detail) => write!(f, "malformed body: {}", detail),
            FailureKind::NoData => write!(f, "no data rows"),
        }
    }
}

/// One (year, block) request that contributed nothing to the final table
#[derive(Debug, Clone)]
pub struct FetchFailure {
    pub year: i32,
    pub block_index: usize,
    pub kind: FailureKind,
}

/// Aggregated outcome of one harvest run
#[derive(Debug, Clone)]
pub struct FetchReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub requests: usize,
    pub succeeded: usize,
    pub failures: Vec<FetchFailure>,
}

impl FetchReport {
    /// Failures that represent actual fetch problems, not absent data
    pub fn errors(&self) -> impl Iterator<Item = &FetchFailure> {
        self.failures
            .iter()
            .filter(|f| f.kind != FailureKind::NoData)
    }
}

impl std::fmt::Display for FetchReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let no_data = self
            .failures
            .iter()
            .filter(|x| x.kind == FailureKind::NoData)
            .count();
        write!(
            f,
            "requests: {}, with data: {}, empty: {}, failed: {}",
            self.requests,
            self.succeeded,
            no_data,
            self.failures.len() - no_data
        )
    }
}

/// What a harvest run hands back to the caller
#[derive(Debug)]
pub struct HarvestOutput {
    pub table: crate::ingestion::table::Table,
    pub report: FetchReport,
    pub snapshot_path: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agricultural_variable_codes() {
        assert_eq!(AgriculturalVariable::PlantedArea.code(), 8331);
        assert_eq!(AgriculturalVariable::HarvestedArea.code(), 216);
        assert_eq!(AgriculturalVariable::QuantityProduced.code(), 214);
        assert_eq!(AgriculturalVariable::AverageYield.code(), 112);
    }

    #[test]
    fn test_variable_from_name() {
        assert_eq!(
            AgriculturalVariable::from_name("planted_area").unwrap(),
            AgriculturalVariable::PlantedArea
        );
        assert!(matches!(
            AgriculturalVariable::from_name("rainfall"),
            Err(HarvestError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_dataset_parameters() {
        assert_eq!(Dataset::Agricultural.table_id(), 5457);
        assert_eq!(Dataset::Agricultural.classification(), "c782");
        assert_eq!(Dataset::Livestock.table_id(), 3939);
        assert_eq!(Dataset::Livestock.classification(), "c79");
        assert_eq!(Dataset::Forestry.table_id(), 291);
        assert_eq!(Dataset::Forestry.classification(), "c194");
    }

    #[test]
    fn test_variable_selectors() {
        assert_eq!(DatasetSpec::livestock().variable_selector, "all");
        assert_eq!(DatasetSpec::forestry().variable_selector, "142");
        assert_eq!(
            DatasetSpec::agricultural(AgriculturalVariable::AverageYield).variable_selector,
            "112"
        );
    }

    #[test]
    fn test_report_display_separates_empty_from_failed() {
        let report = FetchReport {
            started_at: Utc::now(),
            finished_at: Utc::now(),
            requests: 4,
            succeeded: 2,
            failures: vec![
                FetchFailure {
                    year: 2020,
                    block_index: 0,
                    kind: FailureKind::NoData,
                },
                FetchFailure {
                    year: 2020,
                    block_index: 1,
                    kind: FailureKind::HttpStatus(500),
                },
            ],
        };

        assert_eq!(
            report.to_string(),
            "requests: 4, with data: 2, empty: 1, failed: 1"
        );
        assert_eq!(report.errors().count(), 1);
    }
}
