//! Long-format table assembly
//!
//! SIDRA payloads arrive as row-oriented arrays with the column names in the
//! first row. Per-block tables are unioned by column name (outer union,
//! missing cells filled empty), concatenated in block order, stamped with the
//! requested year, and finally unioned across years the same way.

use std::collections::HashMap;
use tracing::warn;

/// A simple string-cell table in long format.
///
/// Rows are always as wide as `columns`; the outer-union merge keeps that
/// invariant by back-filling empty cells when a new column appears.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new() -> Self {
        Table::default()
    }

    /// Promote the first row to column headers and keep the rest as data.
    ///
    /// Returns `None` when there is at most a header row: such a payload
    /// carries no data and must not contribute an empty-but-columned table.
    pub fn from_header_rows(mut raw: Vec<Vec<String>>) -> Option<Self> {
        if raw.len() <= 1 {
            return None;
        }
        let columns = raw.remove(0);
        let width = columns.len();
        let rows = raw
            .into_iter()
            .enumerate()
            .map(|(i, mut row)| {
                if row.len() > width {
                    warn!(
                        "Data row {} has {} cells but the header names {} columns; \
                         dropping the extras",
                        i + 1,
                        row.len(),
                        width
                    );
                }
                row.resize(width, String::new());
                row
            })
            .collect();
        Some(Table { columns, rows })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cell lookup by row index and column name, for callers and tests.
    pub fn cell(&self, row: usize, column: &str) -> Option<&str> {
        let col = self.columns.iter().position(|c| c == column)?;
        self.rows.get(row).map(|r| r[col].as_str())
    }

    /// Append a column where every existing row gets the same literal value.
    ///
    /// Used for the `year` marker: the value comes from the request loop,
    /// never from the payload.
    pub fn push_constant_column(&mut self, name: &str, value: &str) {
        self.columns.push(name.to_string());
        for row in &mut self.rows {
            row.push(value.to_string());
        }
    }

    /// Outer-union merge: rows of `other` are appended after the rows of
    /// `self`; the column set becomes the union of both, with cells missing
    /// on either side filled with the empty string.
    pub fn merge(&mut self, other: Table) {
        if other.is_empty() && other.columns.is_empty() {
            return;
        }
        if self.columns.is_empty() && self.rows.is_empty() {
            *self = other;
            return;
        }

        // Columns new to self are appended in other's order.
        for col in &other.columns {
            if !self.columns.contains(col) {
                self.columns.push(col.clone());
                for row in &mut self.rows {
                    row.push(String::new());
                }
            }
        }

        let index: HashMap<&str, usize> = other
            .columns
            .iter()
            .enumerate()
            .map(|(i, c)| (c.as_str(), i))
            .collect();

        for src in other.rows {
            let row = self
                .columns
                .iter()
                .map(|col| {
                    index
                        .get(col.as_str())
                        .map(|&i| src[i].clone())
                        .unwrap_or_default()
                })
                .collect();
            self.rows.push(row);
        }
    }

    /// Iterate rows as slices, in insertion order.
    pub fn rows(&self) -> impl Iterator<Item = &[String]> {
        self.rows.iter().map(|r| r.as_slice())
    }
}

/// Assemble the final table for one year from its per-block tables,
/// appending the literal `year` column.
pub fn assemble_year(block_tables: Vec<Table>, year: i32) -> Table {
    let mut combined = Table::new();
    for table in block_tables {
        combined.merge(table);
    }
    if !combined.is_empty() {
        combined.push_constant_column("year", &year.to_string());
    }
    combined
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(columns: &[&str], rows: &[&[&str]]) -> Table {
        let mut raw: Vec<Vec<String>> =
            vec![columns.iter().map(|c| c.to_string()).collect()];
        raw.extend(
            rows.iter()
                .map(|r| r.iter().map(|c| c.to_string()).collect::<Vec<_>>()),
        );
        Table::from_header_rows(raw).unwrap()
    }

    #[test]
    fn test_header_promotion() {
        let t = table(&["geo", "val"], &[&["1100015", "42"]]);

        assert_eq!(t.columns(), ["geo", "val"]);
        assert_eq!(t.row_count(), 1);
        assert_eq!(t.cell(0, "geo"), Some("1100015"));
        assert_eq!(t.cell(0, "val"), Some("42"));
    }

    #[test]
    fn test_header_only_payload_is_no_data() {
        assert!(Table::from_header_rows(vec![vec!["geo".into(), "val".into()]]).is_none());
        assert!(Table::from_header_rows(vec![]).is_none());
    }

    #[test]
    fn test_disjoint_column_union() {
        let mut left = table(&["A", "B"], &[&["a1", "b1"]]);
        let right = table(&["A", "C"], &[&["a2", "c2"]]);

        left.merge(right);

        assert_eq!(left.columns(), ["A", "B", "C"]);
        assert_eq!(left.row_count(), 2);
        // Missing cells fill empty on both sides of the union.
        assert_eq!(left.cell(0, "C"), Some(""));
        assert_eq!(left.cell(1, "B"), Some(""));
        assert_eq!(left.cell(1, "A"), Some("a2"));
        assert_eq!(left.cell(1, "C"), Some("c2"));
    }

    #[test]
    fn test_merge_into_empty_adopts_other() {
        let mut t = Table::new();
        t.merge(table(&["geo"], &[&["1100015"]]));

        assert_eq!(t.columns(), ["geo"]);
        assert_eq!(t.row_count(), 1);
    }

    #[test]
    fn test_merge_preserves_row_order() {
        let mut t = table(&["geo"], &[&["1"], &["2"]]);
        t.merge(table(&["geo"], &[&["3"]]));

        let geos: Vec<_> = (0..3).map(|i| t.cell(i, "geo").unwrap()).collect();
        assert_eq!(geos, ["1", "2", "3"]);
    }

    #[test]
    fn test_assemble_year_appends_literal_year() {
        let blocks = vec![
            table(&["geo", "val"], &[&["1100015", "42"]]),
            table(&["geo", "val"], &[&["1100023", "7"]]),
        ];

        let t = assemble_year(blocks, 2020);

        assert_eq!(t.columns(), ["geo", "val", "year"]);
        assert_eq!(t.row_count(), 2);
        assert_eq!(t.cell(0, "year"), Some("2020"));
        assert_eq!(t.cell(1, "year"), Some("2020"));
    }

    #[test]
    fn test_assemble_year_with_no_blocks_is_empty() {
        let t = assemble_year(vec![], 2020);
        assert!(t.is_empty());
        assert!(t.columns().is_empty());
    }

    #[test]
    fn test_ragged_rows_padded_to_header_width() {
        let t = Table::from_header_rows(vec![
            vec!["a".into(), "b".into()],
            vec!["only-a".into()],
        ])
        .unwrap();

        assert_eq!(t.cell(0, "b"), Some(""));
    }

    #[test]
    fn test_overwide_rows_truncated_to_header_width() {
        // A row wider than the header is malformed; the named columns keep
        // their cells and the unnamed extras are dropped (with a warning).
        let t = Table::from_header_rows(vec![
            vec!["a".into(), "b".into()],
            vec!["a1".into(), "b1".into(), "stray".into()],
        ])
        .unwrap();

        assert_eq!(t.columns(), ["a", "b"]);
        assert_eq!(t.cell(0, "a"), Some("a1"));
        assert_eq!(t.cell(0, "b"), Some("b1"));
        assert!(t.rows().all(|r| r.len() == 2));
    }
}
