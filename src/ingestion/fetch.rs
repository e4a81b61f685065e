//! Fetch functions - one GET per (block, year), parsed into a table
//!
//! Every failure here is recoverable at the run level: the offending
//! (block, year) pair contributes nothing and the caller records the typed
//! failure in the run report. Only argument validation and snapshot writing
//! can abort a run.

use crate::ingestion::table::Table;
use crate::ingestion::types::FailureKind;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Outcome of one (block, year) request.
#[derive(Debug)]
pub enum FetchOutcome {
    Data(Table),
    Skipped(FailureKind),
}

/// Build the shared HTTP client.
pub fn build_client() -> reqwest::Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(120))
        .build()
}

/// Execute one query and parse the response body into a table.
pub async fn fetch_block(client: &Client, url: &str) -> FetchOutcome {
    debug!("GET {}", url);

    let response = match client.get(url).send().await {
        Ok(r) => r,
        Err(e) => return FetchOutcome::Skipped(FailureKind::Transport(e.to_string())),
    };

    let status = response.status();
    if !status.is_success() {
        return FetchOutcome::Skipped(FailureKind::HttpStatus(status.as_u16()));
    }

    let body = match response.text().await {
        Ok(b) => b,
        Err(e) => return FetchOutcome::Skipped(FailureKind::Transport(e.to_string())),
    };

    parse_payload(&body)
}

/// Parse a SIDRA payload: a JSON array of rows, the first row holding the
/// column names, the rest holding string-typed cells.
pub fn parse_payload(body: &str) -> FetchOutcome {
    let raw: Vec<Vec<Value>> = match serde_json::from_str(body) {
        Ok(rows) => rows,
        Err(e) => return FetchOutcome::Skipped(FailureKind::MalformedBody(e.to_string())),
    };

    let rows: Vec<Vec<String>> = raw
        .into_iter()
        .map(|row| row.into_iter().map(coerce_cell).collect())
        .collect();

    match Table::from_header_rows(rows) {
        Some(table) => FetchOutcome::Data(table),
        None => FetchOutcome::Skipped(FailureKind::NoData),
    }
}

/// SIDRA cells are documented as strings but numbers and nulls do appear.
fn coerce_cell(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}
