//! Municipality universe - the fixed set of IBGE codes every fetch covers

use crate::ingestion::types::HarvestError;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::info;

/// Default location of the bundled code list, relative to the crate root
pub const DEFAULT_MUNICIPALITIES_PATH: &str = "data/municipalities.json";

/// The ordered, immutable list of municipality codes.
///
/// Deserializes from a plain JSON array, validating on the way in, so a
/// malformed universe file can never produce a usable value. Loaded once at
/// startup and passed into the pipeline by reference; tests substitute a
/// small fixture via [`Municipalities::from_codes`].
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "Vec<String>")]
pub struct Municipalities {
    codes: Vec<String>,
}

impl TryFrom<Vec<String>> for Municipalities {
    type Error = HarvestError;

    fn try_from(codes: Vec<String>) -> Result<Self, Self::Error> {
        Municipalities::from_codes(codes)
    }
}

impl Municipalities {
    /// Load the code list from a JSON array file.
    ///
    /// A missing or malformed file is fatal: no fetch can proceed without
    /// the universe.
    pub fn from_path(path: &Path) -> Result<Self, HarvestError> {
        let content = fs::read_to_string(path).map_err(|e| {
            HarvestError::Universe(format!("cannot read {}: {}", path.display(), e))
        })?;
        let universe: Municipalities = serde_json::from_str(&content).map_err(|e| {
            HarvestError::Universe(format!("cannot parse {}: {}", path.display(), e))
        })?;

        info!(
            "Loaded {} municipality codes from {}",
            universe.len(),
            path.display()
        );
        Ok(universe)
    }

    /// Build a universe from an in-memory code list (test fixtures).
    pub fn from_codes(codes: Vec<String>) -> Result<Self, HarvestError> {
        if codes.is_empty() {
            return Err(HarvestError::Universe(
                "municipality list is empty".to_string(),
            ));
        }
        // Codes are joined with ',' in request paths; a code containing the
        // separator would silently corrupt the query.
        if let Some(bad) = codes.iter().find(|c| c.contains(',')) {
            return Err(HarvestError::Universe(format!(
                "municipality code '{}' contains the request separator ','",
                bad
            )));
        }
        Ok(Municipalities { codes })
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    pub fn codes(&self) -> &[String] {
        &self.codes
    }

    /// Partition the universe into contiguous blocks of at most `block_size`
    /// codes. Blocks cover the universe exactly, in order; the final block
    /// may be shorter.
    pub fn blocks(&self, block_size: usize) -> impl Iterator<Item = &[String]> {
        self.codes.chunks(block_size.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn universe(n: usize) -> Municipalities {
        Municipalities::from_codes((0..n).map(|i| format!("110{:04}", i)).collect()).unwrap()
    }

    #[test]
    fn test_block_count_and_sizes() {
        let m = universe(250);
        let blocks: Vec<_> = m.blocks(100).collect();

        assert_eq!(blocks.len(), 3); // ceil(250 / 100)
        assert_eq!(blocks[0].len(), 100);
        assert_eq!(blocks[1].len(), 100);
        assert_eq!(blocks[2].len(), 50);
    }

    #[test]
    fn test_blocks_cover_universe_in_order() {
        let m = universe(233);
        let rejoined: Vec<String> = m.blocks(100).flatten().cloned().collect();
        assert_eq!(rejoined, m.codes());
    }

    #[test]
    fn test_exact_multiple_has_no_short_block() {
        let m = universe(200);
        let blocks: Vec<_> = m.blocks(100).collect();
        assert_eq!(blocks.len(), 2);
        assert!(blocks.iter().all(|b| b.len() == 100));
    }

    #[test]
    fn test_empty_universe_rejected() {
        assert!(matches!(
            Municipalities::from_codes(vec![]),
            Err(HarvestError::Universe(_))
        ));
    }

    #[test]
    fn test_separator_in_code_rejected() {
        assert!(matches!(
            Municipalities::from_codes(vec!["1100015".into(), "11,0023".into()]),
            Err(HarvestError::Universe(_))
        ));
    }

    #[test]
    fn test_from_path_missing_file() {
        let result = Municipalities::from_path(Path::new("does/not/exist.json"));
        assert!(matches!(result, Err(HarvestError::Universe(_))));
    }

    #[test]
    fn test_from_path_reads_json_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("codes.json");
        fs::write(&path, r#"["1100015", "1100023"]"#).unwrap();

        let m = Municipalities::from_path(&path).unwrap();
        assert_eq!(m.codes(), ["1100015", "1100023"]);
    }

    #[test]
    fn test_deserialization_validates() {
        // Validation runs inside deserialization, so a bad file cannot
        // yield a usable universe.
        assert!(serde_json::from_str::<Municipalities>("[]").is_err());
        assert!(serde_json::from_str::<Municipalities>(r#"["11,0023"]"#).is_err());

        let m: Municipalities = serde_json::from_str(r#"["1100015"]"#).unwrap();
        assert_eq!(m.codes(), ["1100015"]);
    }
}
