//! sidra-harvest - municipal production data from the IBGE SIDRA API
//!
//! Fetches agricultural (PAM), livestock (PPM), and forestry (PEVS)
//! production tables for a fixed municipality universe across a set of
//! years, assembles one long-format table, and writes a CSV snapshot.

pub mod ingestion;

pub use ingestion::municipalities::Municipalities;
pub use ingestion::pipeline::{
    fetch_agricultural_production, fetch_forestry_production, fetch_livestock_production,
};
pub use ingestion::table::Table;
pub use ingestion::types::{
    AgriculturalVariable, Dataset, FailureKind, FetchFailure, FetchReport, HarvestError,
    HarvestOutput, PipelineConfig,
};
