//! Header resolution: locate the header window among arbitrary leading rows.
//!
//! Behavior:
//! - Every complete window of `header_rows` consecutive rows is a candidate, earliest first
//! - Windows taller than one row are flattened column-wise into one logical header
//! - The first window in which every required column matches some cell is the header
//! - Otherwise the best partial window decides between [`BindError::MissingRequiredColumns`]
//!   and [`BindError::HeaderNotFound`]

use crate::error::{BindError, BindResult};
use crate::schema::{Column, Schema};
use crate::types::{Row, Value};

/// Location and content of the accepted header window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderMatch {
    /// Index of the first row of the header window.
    pub header_index: usize,
    /// Index of the first data row (`header_index + header_rows`).
    pub data_row_index: usize,
    /// The (possibly flattened) header, one string per cell position.
    pub header: Vec<String>,
}

/// Render one header window as a single logical header.
///
/// A single-row window renders each cell as-is. Taller windows are joined top to bottom per cell
/// position with `delimiter`. A blank cell in the first row reuses the most recent non-blank
/// first-row cell to its left (merged cells spanning several columns); with nothing to reuse, or
/// in any lower row, a blank cell is left out of the join.
pub fn flatten_header(window: &[Row], delimiter: &str) -> Vec<String> {
    if let [single] = window {
        return single.iter().map(Value::header_text).collect();
    }

    let width = window.iter().map(Vec::len).max().unwrap_or(0);
    let mut carried: Option<String> = None;
    let mut out = Vec::with_capacity(width);

    for col in 0..width {
        let mut parts: Vec<String> = Vec::with_capacity(window.len());
        for (depth, row) in window.iter().enumerate() {
            let cell = row.get(col).unwrap_or(&Value::Null);
            let absent = cell.is_blank();
            if depth == 0 {
                if absent {
                    if let Some(prev) = &carried {
                        parts.push(prev.clone());
                    }
                } else {
                    let text = cell.header_text();
                    carried = Some(text.clone());
                    parts.push(text);
                }
            } else if !absent {
                parts.push(cell.header_text());
            }
        }
        out.push(parts.join(delimiter));
    }
    out
}

/// Find the header window for `schema` in `rows`.
pub fn resolve_header(rows: &[Row], schema: &Schema) -> BindResult<HeaderMatch> {
    let config = schema.config();
    let header_rows = config.header_rows.max(1);
    let required: Vec<&Column> = schema.required_columns().collect();

    // Best partial window so far: (matched count, unmatched column patterns).
    let mut best: Option<(usize, Vec<String>)> = None;

    if rows.len() >= header_rows {
        for start in 0..=rows.len() - header_rows {
            let header = flatten_header(&rows[start..start + header_rows], &config.delimiter);

            let unmatched: Vec<String> = required
                .iter()
                .filter(|col| !header.iter().any(|cell| col.matching(cell)))
                .map(|col| col.pattern_text().to_string())
                .collect();

            if unmatched.is_empty() {
                return Ok(HeaderMatch {
                    header_index: start,
                    data_row_index: start + header_rows,
                    header,
                });
            }

            let matched = required.len() - unmatched.len();
            if best.as_ref().is_none_or(|(count, _)| matched > *count) {
                best = Some((matched, unmatched));
            }
        }
    }

    match best {
        Some((matched, columns)) if matched > 0 => Err(BindError::MissingRequiredColumns { columns }),
        _ => Err(BindError::HeaderNotFound),
    }
}

#[cfg(test)]
mod tests {
    use super::{flatten_header, resolve_header};
    use crate::error::BindError;
    use crate::schema::{Column, Schema};
    use crate::types::{Row, Value};

    fn row(cells: &[&str]) -> Row {
        cells.iter().map(|c| Value::from(*c)).collect()
    }

    fn person() -> Schema {
        Schema::builder("Person")
            .column("id", Column::new("ID"))
            .column("name", Column::new("Name"))
            .build()
            .unwrap()
    }

    #[test]
    fn single_row_flattening_is_identity() {
        let window = vec![vec![Value::from("ID"), Value::Null, Value::from(" Name "), Value::Float64(2024.0)]];
        assert_eq!(flatten_header(&window, ";"), vec!["ID", "", " Name ", "2024"]);
    }

    #[test]
    fn merged_top_cells_carry_forward() {
        let window = vec![row(&["Region", "", ""]), row(&["North", "East", "West"])];
        assert_eq!(
            flatten_header(&window, ";"),
            vec!["Region;North", "Region;East", "Region;West"]
        );
    }

    #[test]
    fn carry_forward_uses_latest_top_value() {
        let window = vec![
            row(&["", "Profile", "", "Stats", ""]),
            row(&["ID", "Name", "Email", "Score", "Rank"]),
        ];
        assert_eq!(
            flatten_header(&window, "/"),
            vec!["ID", "Profile/Name", "Profile/Email", "Stats/Score", "Stats/Rank"]
        );
    }

    #[test]
    fn blank_lower_cells_are_omitted() {
        let window = vec![row(&["Total", "Group"]), row(&["", "A"]), row(&["", ""])];
        assert_eq!(flatten_header(&window, ";"), vec!["Total", "Group;A"]);
    }

    #[test]
    fn ragged_windows_use_widest_row() {
        let window = vec![row(&["Group"]), row(&["A", "B"])];
        assert_eq!(flatten_header(&window, ";"), vec!["Group;A", "Group;B"]);
    }

    #[test]
    fn literal_none_text_is_not_blank() {
        let window = vec![row(&["Group", "None"]), row(&["A", "B"])];
        assert_eq!(flatten_header(&window, ";"), vec!["Group;A", "None;B"]);
    }

    #[test]
    fn large_numeric_header_cell_matches_its_text() {
        let schema = Schema::builder("Ids")
            .column("big", Column::new("100000000000000000000"))
            .build()
            .unwrap();
        let rows = vec![vec![Value::Float64(1e20)], row(&["1"])];
        assert_eq!(resolve_header(&rows, &schema).unwrap().header_index, 0);
    }

    #[test]
    fn header_found_after_leading_rows() {
        let rows = vec![
            row(&["Quarterly report"]),
            vec![],
            vec![Value::Null, Value::from("")],
            row(&["ID", "Name"]),
            row(&["1", "Alice"]),
        ];
        let m = resolve_header(&rows, &person()).unwrap();
        assert_eq!(m.header_index, 3);
        assert_eq!(m.data_row_index, 4);
        assert_eq!(m.header, vec!["ID", "Name"]);
    }

    #[test]
    fn first_accepting_window_wins() {
        let rows = vec![row(&["ID", "Name"]), row(&["Name", "ID", "Extra"])];
        let m = resolve_header(&rows, &person()).unwrap();
        assert_eq!(m.header_index, 0);
    }

    #[test]
    fn multi_row_header_resolves() {
        let schema = Schema::builder("S")
            .column("name", Column::new("Profile;Name"))
            .column("email", Column::new("Profile;Email"))
            .header_rows(2)
            .build()
            .unwrap();
        let rows = vec![
            row(&["Export"]),
            row(&["ID", "Profile", ""]),
            row(&["", "Name", "Email"]),
            row(&["1", "Ada", "ada@example.com"]),
        ];
        let m = resolve_header(&rows, &schema).unwrap();
        assert_eq!(m.header_index, 1);
        assert_eq!(m.data_row_index, 3);
        assert_eq!(m.header, vec!["ID", "Profile;Name", "Profile;Email"]);
    }

    #[test]
    fn partial_match_reports_missing_columns() {
        let rows = vec![row(&["id", "Name"]), row(&["1", "Alice"])];
        let err = resolve_header(&rows, &person()).unwrap_err();
        match err {
            BindError::MissingRequiredColumns { columns } => assert_eq!(columns, vec!["ID"]),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn best_partial_window_is_reported() {
        let schema = Schema::builder("S")
            .column("a", Column::new("A"))
            .column("b", Column::new("B"))
            .column("c", Column::new("C"))
            .build()
            .unwrap();
        let rows = vec![row(&["A"]), row(&["A", "B"]), row(&["C"])];
        match resolve_header(&rows, &schema).unwrap_err() {
            BindError::MissingRequiredColumns { columns } => assert_eq!(columns, vec!["C"]),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn nothing_matching_is_header_not_found() {
        let rows = vec![row(&["x", "y"]), vec![], row(&["1", "2"])];
        assert!(matches!(
            resolve_header(&rows, &person()).unwrap_err(),
            BindError::HeaderNotFound
        ));
        assert!(matches!(
            resolve_header(&[], &person()).unwrap_err(),
            BindError::HeaderNotFound
        ));
    }

    #[test]
    fn too_few_rows_for_window_is_header_not_found() {
        let schema = Schema::builder("S")
            .column("a", Column::new("A"))
            .header_rows(3)
            .build()
            .unwrap();
        let rows = vec![row(&["A"]), row(&["x"])];
        assert!(matches!(resolve_header(&rows, &schema), Err(BindError::HeaderNotFound)));
    }

    #[test]
    fn accepted_window_matches_every_required_column() {
        let schema = person();
        let rows = vec![row(&["Name"]), row(&["ID", "x", "Name"]), row(&["1", "", "a"])];
        let m = resolve_header(&rows, &schema).unwrap();
        for col in schema.required_columns() {
            assert!(m.header.iter().any(|cell| col.matching(cell)));
        }
    }

    #[test]
    fn resolution_is_deterministic() {
        let rows = vec![row(&["junk"]), row(&["Name", "ID"]), row(&["a", "1"])];
        let schema = person();
        assert_eq!(resolve_header(&rows, &schema).unwrap(), resolve_header(&rows, &schema).unwrap());
    }
}
