//! Snapshot naming and persistence

use crate::ingestion::table::Table;
use crate::ingestion::types::{DatasetSpec, HarvestError};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Derive the deterministic snapshot filename for a year set.
///
/// Single year: `<Dataset>_data_<variable>_<year>.csv`; otherwise
/// `<Dataset>_data_<variable>_<min>_to_<max>.csv`. The range comes from the
/// de-duplicated year set, never from the caller's input order, and covers
/// the requested years even when some of them yielded no rows. An empty
/// set (which validation never lets through the pipeline) gets no year
/// suffix rather than a panic.
pub fn snapshot_filename(spec: &DatasetSpec, years: &[i32]) -> String {
    let dataset = spec.dataset.label();
    let variable = &spec.variable_label;
    match (years.iter().min(), years.iter().max()) {
        (Some(min), Some(max)) if min == max => {
            format!("{}_data_{}_{}.csv", dataset, variable, min)
        }
        (Some(min), Some(max)) => {
            format!("{}_data_{}_{}_to_{}.csv", dataset, variable, min, max)
        }
        _ => format!("{}_data_{}.csv", dataset, variable),
    }
}

/// Persist the final table as CSV, overwriting any existing file.
pub fn write_snapshot(table: &Table, dir: &Path, filename: &str) -> Result<PathBuf, HarvestError> {
    let path = dir.join(filename);

    if let Err(e) = fs::create_dir_all(dir) {
        return Err(HarvestError::Snapshot {
            path,
            source: csv::Error::from(e),
        });
    }

    let result = (|| -> Result<(), csv::Error> {
        let mut writer = csv::Writer::from_path(&path)?;
        // A run where nothing came back has no columns; leave the file empty
        // rather than writing a zero-field record.
        if !table.columns().is_empty() {
            writer.write_record(table.columns())?;
            for row in table.rows() {
                writer.write_record(row)?;
            }
        }
        writer.flush()?;
        Ok(())
    })();

    match result {
        Ok(()) => {
            info!("Wrote {} rows to {}", table.row_count(), path.display());
            Ok(path)
        }
        Err(source) => Err(HarvestError::Snapshot { path, source }),
    }
}
