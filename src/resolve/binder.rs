//! Column binding: assign each declared column a cell index in the resolved header.

use crate::error::{BindError, BindResult};
use crate::schema::Schema;

/// Resolution-scoped binding of one schema column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    /// Attribute name of the column.
    pub attr: String,
    /// Header text the column matched, if bound.
    pub header: Option<String>,
    /// Cell index the column reads from, if bound.
    pub index: Option<usize>,
}

impl Binding {
    pub fn is_bound(&self) -> bool {
        self.index.is_some()
    }
}

/// Bind every column of `schema` against `header`, in declaration order.
///
/// Each column binds the first cell (left to right) its matcher accepts. Columns do not claim
/// cells: two columns whose matchers accept the same cell both bind to it. Unbound required
/// columns are reported together in one [`BindError::MissingRequiredColumns`].
pub fn bind_columns(header: &[String], schema: &Schema) -> BindResult<Vec<Binding>> {
    let mut bindings = Vec::with_capacity(schema.len());
    let mut missing = Vec::new();

    for (attr, col) in schema.columns() {
        let found = header
            .iter()
            .enumerate()
            .find(|(_, cell)| col.matching(cell));

        if found.is_none() && col.is_required() {
            missing.push(col.pattern_text().to_string());
        }

        bindings.push(Binding {
            attr: attr.clone(),
            header: found.map(|(_, cell)| cell.clone()),
            index: found.map(|(idx, _)| idx),
        });
    }

    if !missing.is_empty() {
        return Err(BindError::MissingRequiredColumns { columns: missing });
    }
    Ok(bindings)
}

#[cfg(test)]
mod tests {
    use super::bind_columns;
    use crate::error::BindError;
    use crate::schema::{Column, Schema};

    fn header(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn binds_in_header_order_regardless_of_declaration() {
        let schema = Schema::builder("Person")
            .column("name", Column::new("Name"))
            .column("email", Column::new("Email"))
            .build()
            .unwrap();
        let bindings = bind_columns(&header(&["Email", "Name"]), &schema).unwrap();
        assert_eq!(bindings[0].attr, "name");
        assert_eq!(bindings[0].index, Some(1));
        assert_eq!(bindings[1].index, Some(0));
        assert_eq!(bindings[1].header.as_deref(), Some("Email"));
    }

    #[test]
    fn first_matching_cell_wins() {
        let schema = Schema::builder("S")
            .column("v", Column::pattern("^Value").unwrap())
            .build()
            .unwrap();
        let bindings = bind_columns(&header(&["ID", "Value A", "Value B"]), &schema).unwrap();
        assert_eq!(bindings[0].index, Some(1));
        assert_eq!(bindings[0].header.as_deref(), Some("Value A"));
    }

    #[test]
    fn optional_columns_may_stay_unbound() {
        let schema = Schema::builder("S")
            .column("id", Column::new("ID"))
            .column("name", Column::new("Name").optional())
            .build()
            .unwrap();
        let bindings = bind_columns(&header(&["ID", "Age", "Column2"]), &schema).unwrap();
        assert!(bindings[0].is_bound());
        assert!(!bindings[1].is_bound());
        assert_eq!(bindings[1].header, None);
    }

    #[test]
    fn all_missing_required_columns_are_reported() {
        let schema = Schema::builder("S")
            .column("a", Column::new("A"))
            .column("b", Column::new("B"))
            .column("c", Column::new("C"))
            .build()
            .unwrap();
        match bind_columns(&header(&["B"]), &schema).unwrap_err() {
            BindError::MissingRequiredColumns { columns } => assert_eq!(columns, vec!["A", "C"]),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn overlapping_matchers_share_a_cell() {
        let schema = Schema::builder("S")
            .column("full", Column::new("Name"))
            .column("any", Column::pattern("Name").unwrap())
            .build()
            .unwrap();
        let bindings = bind_columns(&header(&["Name"]), &schema).unwrap();
        assert_eq!(bindings[0].index, Some(0));
        assert_eq!(bindings[1].index, Some(0));
    }

    #[test]
    fn rebinding_same_header_is_idempotent() {
        let schema = Schema::builder("S")
            .column("id", Column::new("ID"))
            .column("x", Column::new("X").optional())
            .build()
            .unwrap();
        let h = header(&["", "ID", "Y"]);
        assert_eq!(bind_columns(&h, &schema).unwrap(), bind_columns(&h, &schema).unwrap());
    }
}
