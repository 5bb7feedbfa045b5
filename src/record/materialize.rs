use std::iter::FusedIterator;
use std::sync::Arc;

use crate::error::BindResult;
use crate::resolve::Binding;
use crate::schema::Schema;
use crate::types::Row;

use super::{Layout, Record};

/// Counters for one materialization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecordStats {
    /// Records produced so far.
    pub records: usize,
    /// Rows dropped because a `skip_invalid_row` column rejected them.
    pub skipped: usize,
}

/// Lazy, finite, non-restartable sequence of records.
///
/// Each item is either a validated [`Record`] or the error that ended materialization; after an
/// error the iterator yields nothing more. Stopping early simply drops the remaining rows.
#[derive(Debug)]
pub struct Records {
    rows: std::vec::IntoIter<Row>,
    next_index: usize,
    layout: Arc<Layout>,
    stats: RecordStats,
    skipped_rows: Vec<usize>,
    failed: bool,
}

impl Records {
    pub(crate) fn new(schema: Schema, bindings: Vec<Binding>, mut rows: Vec<Row>, data_row_index: usize) -> Self {
        let start = data_row_index.min(rows.len());
        rows.drain(..start);
        Self {
            rows: rows.into_iter(),
            next_index: data_row_index,
            layout: Arc::new(Layout::new(schema, bindings)),
            stats: RecordStats::default(),
            skipped_rows: Vec::new(),
            failed: false,
        }
    }

    pub fn stats(&self) -> RecordStats {
        self.stats
    }

    /// Source row indices dropped by `skip_invalid_row` columns so far.
    pub fn skipped_rows(&self) -> &[usize] {
        &self.skipped_rows
    }

    pub fn schema(&self) -> &Schema {
        &self.layout.schema
    }
}

impl Iterator for Records {
    type Item = BindResult<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        loop {
            let row = self.rows.next()?;
            let row_index = self.next_index;
            self.next_index += 1;

            match Record::materialize(row, row_index, &self.layout) {
                Ok(Some(record)) => {
                    self.stats.records += 1;
                    return Some(Ok(record));
                }
                Ok(None) => {
                    self.stats.skipped += 1;
                    self.skipped_rows.push(row_index);
                }
                Err(e) => {
                    self.failed = true;
                    return Some(Err(e));
                }
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.failed {
            (0, Some(0))
        } else {
            (0, Some(self.rows.len()))
        }
    }
}

impl FusedIterator for Records {}

#[cfg(test)]
mod tests {
    use crate::error::BindError;
    use crate::resolve::BoundSchema;
    use crate::schema::{Column, Schema};
    use crate::types::{Row, Value};

    use super::RecordStats;

    fn row(cells: &[&str]) -> Row {
        cells.iter().map(|c| Value::from(*c)).collect()
    }

    fn person(skip: bool) -> Schema {
        Schema::builder("Person")
            .column("id", Column::new("ID").check(|v| !v.is_null()).skip_invalid_row(skip))
            .column("name", Column::new("Name"))
            .build()
            .unwrap()
    }

    fn rows_with_empty_row() -> Vec<Row> {
        vec![row(&["ID", "Name"]), row(&["1", "Alice"]), vec![], row(&["2", "Bob"])]
    }

    #[test]
    fn empty_row_is_skipped_when_column_allows() {
        let mut records = BoundSchema::resolve(rows_with_empty_row(), &person(true))
            .unwrap()
            .records();
        let out: Vec<_> = records.by_ref().collect::<Result<_, _>>().unwrap();

        assert_eq!(out.len(), 2);
        assert_eq!(out[0].get("id"), Some(&Value::from("1")));
        assert_eq!(out[1].get("name"), Some(&Value::from("Bob")));
        assert_eq!(out[1].row_index(), 3);
        assert_eq!(records.stats(), RecordStats { records: 2, skipped: 1 });
        assert_eq!(records.skipped_rows(), [2]);
    }

    #[test]
    fn empty_row_fails_at_that_row_without_skip() {
        let mut records = BoundSchema::resolve(rows_with_empty_row(), &person(false))
            .unwrap()
            .records();

        assert!(records.next().unwrap().is_ok());
        match records.next() {
            Some(Err(BindError::InvalidRow { row, column, value })) => {
                assert_eq!(row, 2);
                assert_eq!(column, "id");
                assert_eq!(value, Value::Null);
            }
            other => panic!("unexpected: {other:?}"),
        }
        assert!(records.next().is_none());
    }

    #[test]
    fn rows_without_validators_never_fail_on_short_input() {
        let schema = Schema::builder("Person")
            .column("id", Column::new("ID"))
            .column("name", Column::new("Name"))
            .build()
            .unwrap();
        let out: Vec<_> = BoundSchema::resolve(vec![row(&["ID", "Name"]), vec![], row(&["3"])], &schema)
            .unwrap()
            .records()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].get("id"), Some(&Value::Null));
        assert_eq!(out[1].get("name"), Some(&Value::Null));
    }

    #[test]
    fn unbound_optional_columns_skip_validation_and_yield_default() {
        let schema = Schema::builder("S")
            .column("id", Column::new("ID"))
            .column("age", Column::new("Age"))
            .column(
                "name",
                Column::new("Name")
                    .optional()
                    .default_value("n/a")
                    .check(|_| false),
            )
            .build()
            .unwrap();
        let out: Vec<_> = BoundSchema::resolve(
            vec![row(&["ID", "Age", "Column2"]), row(&["1", "30", "x"]), row(&["2", "31", "y"])],
            &schema,
        )
        .unwrap()
        .records()
        .collect::<Result<_, _>>()
        .unwrap();

        assert_eq!(out.len(), 2);
        for r in &out {
            assert_eq!(r.get("name"), Some(&Value::from("n/a")));
        }
    }

    #[test]
    fn non_bool_validator_is_fatal_even_when_skipping() {
        let schema = Schema::builder("S")
            .column(
                "id",
                Column::new("ID").validator(|_| Value::from("true")).skip_invalid_row(true),
            )
            .build()
            .unwrap();
        let mut records = BoundSchema::resolve(vec![row(&["ID"]), row(&["1"]), row(&["2"])], &schema)
            .unwrap()
            .records();
        assert!(matches!(
            records.next(),
            Some(Err(BindError::IncompatibleValidatorReturn { .. }))
        ));
        assert!(records.next().is_none());
    }

    #[test]
    fn first_failing_column_decides() {
        let schema = Schema::builder("S")
            .column("a", Column::new("A").check(|v| v != &Value::from("bad")))
            .column("b", Column::new("B").check(|_| false).skip_invalid_row(true))
            .build()
            .unwrap();
        let mut records = BoundSchema::resolve(vec![row(&["A", "B"]), row(&["bad", "x"])], &schema)
            .unwrap()
            .records();
        assert!(matches!(records.next(), Some(Err(BindError::InvalidRow { .. }))));
    }

    #[test]
    fn early_stop_leaves_remaining_rows_untouched() {
        let schema = person(false);
        let mut records = BoundSchema::resolve(rows_with_empty_row(), &schema)
            .unwrap()
            .records();
        let first = records.next().unwrap().unwrap();
        assert_eq!(first.get("name"), Some(&Value::from("Alice")));
        assert_eq!(records.size_hint(), (0, Some(2)));
        drop(records);
    }
}
