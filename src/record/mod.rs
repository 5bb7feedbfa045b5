//! Materialized records.
//!
//! A [`Record`] wraps one normalized raw row together with the resolution it was produced by.
//! Records only exist for rows that passed validation; rows rejected by a column with
//! `skip_invalid_row` never become records.

mod materialize;

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::error::{BindError, BindResult};
use crate::resolve::Binding;
use crate::schema::Schema;
use crate::types::{Row, Value};

pub use materialize::{RecordStats, Records};

/// Resolution data shared by every record of one read.
#[derive(Debug)]
pub(crate) struct Layout {
    schema: Schema,
    bindings: Vec<Binding>,
    /// Binding positions of bound columns, ordered by cell index.
    positional: Vec<usize>,
    /// Minimum row length covering every bound cell.
    width: usize,
}

impl Layout {
    pub(crate) fn new(schema: Schema, bindings: Vec<Binding>) -> Self {
        let mut bound: Vec<(usize, usize)> = bindings
            .iter()
            .enumerate()
            .filter_map(|(pos, b)| b.index.map(|idx| (idx, pos)))
            .collect();
        bound.sort_unstable();
        let width = bound.last().map(|(idx, _)| idx + 1).unwrap_or(0);
        Self {
            schema,
            bindings,
            positional: bound.into_iter().map(|(_, pos)| pos).collect(),
            width,
        }
    }
}

/// One validated, typed row.
#[derive(Clone)]
pub struct Record {
    row_index: usize,
    raw: Row,
    values: Vec<Value>,
    layout: Arc<Layout>,
}

impl Record {
    /// Validate `row` and resolve its values.
    ///
    /// Returns `Ok(None)` when a column configured with `skip_invalid_row` rejects the row.
    pub(crate) fn materialize(mut raw: Row, row_index: usize, layout: &Arc<Layout>) -> BindResult<Option<Self>> {
        if raw.len() < layout.width {
            raw.resize(layout.width, Value::Null);
        }

        let columns = layout.schema.columns();
        for (binding, (_, col)) in layout.bindings.iter().zip(columns) {
            let Some(idx) = binding.index else {
                continue;
            };
            if !col.validate(&raw[idx])? {
                if col.skips_invalid_row() {
                    return Ok(None);
                }
                return Err(BindError::InvalidRow {
                    row: row_index,
                    column: binding.attr.clone(),
                    value: raw[idx].clone(),
                });
            }
        }

        let mut values = Vec::with_capacity(columns.len());
        for (binding, (_, col)) in layout.bindings.iter().zip(columns) {
            let value = match binding.index {
                None => col.default().cloned().unwrap_or_default(),
                Some(idx) => {
                    let cell = &raw[idx];
                    match (cell.is_null(), col.default(), col.data_type()) {
                        (true, Some(default), _) => default.clone(),
                        (_, _, Some(data_type)) => layout
                            .schema
                            .convert(data_type, cell)
                            .map_err(|message| BindError::Conversion {
                                row: row_index,
                                column: binding.attr.clone(),
                                raw: cell.header_text(),
                                message,
                            })?,
                        _ => cell.clone(),
                    }
                }
            };
            values.push(value);
        }

        Ok(Some(Self {
            row_index,
            raw,
            values,
            layout: Arc::clone(layout),
        }))
    }

    /// Position of the source row in the provider's row stream (0-based).
    pub fn row_index(&self) -> usize {
        self.row_index
    }

    /// The source row, padded with nulls up to the last bound cell.
    pub fn raw(&self) -> &[Value] {
        &self.raw
    }

    pub fn schema(&self) -> &Schema {
        &self.layout.schema
    }

    /// Resolved values in schema declaration order.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Value of an attribute.
    pub fn get(&self, attr: &str) -> Option<&Value> {
        let pos = self.layout.bindings.iter().position(|b| b.attr == attr)?;
        self.values.get(pos)
    }

    /// Value of the column bound to header text `header`.
    pub fn get_by_header(&self, header: &str) -> Option<&Value> {
        let pos = self
            .layout
            .bindings
            .iter()
            .position(|b| b.header.as_deref() == Some(header))?;
        self.values.get(pos)
    }

    /// Value of the `n`-th bound column, counting bound columns left to right by cell index.
    pub fn get_index(&self, n: usize) -> Option<&Value> {
        let pos = *self.layout.positional.get(n)?;
        self.values.get(pos)
    }

    /// Whether some bound column matched header text `header`.
    pub fn contains(&self, header: &str) -> bool {
        self.layout
            .bindings
            .iter()
            .any(|b| b.header.as_deref() == Some(header))
    }

    /// Number of attributes (bound or not).
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn attrs(&self) -> impl Iterator<Item = &str> {
        self.layout.bindings.iter().map(|b| b.attr.as_str())
    }

    /// `(attribute, value)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.attrs().zip(self.values.iter())
    }

    pub fn to_map(&self) -> BTreeMap<String, Value> {
        self.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    /// Deserialize the record into a user type, attribute names as field names.
    pub fn deserialize<T: DeserializeOwned>(&self) -> BindResult<T> {
        let json = serde_json::to_value(self)?;
        Ok(serde_json::from_value(json)?)
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (attr, value) in self.iter() {
            map.serialize_entry(attr, value)?;
        }
        map.end()
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|(k, v)| other.get(k) == Some(v))
    }
}

impl PartialEq<BTreeMap<String, Value>> for Record {
    fn eq(&self, other: &BTreeMap<String, Value>) -> bool {
        self.len() == other.len() && self.iter().all(|(k, v)| other.get(k) == Some(v))
    }
}

impl PartialEq<HashMap<String, Value>> for Record {
    fn eq(&self, other: &HashMap<String, Value>) -> bool {
        self.len() == other.len() && self.iter().all(|(k, v)| other.get(k) == Some(v))
    }
}

impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.layout.schema.name())?;
        for (i, (binding, value)) in self.layout.bindings.iter().zip(&self.values).enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            match &binding.header {
                Some(header) => write!(f, "{} ({header}): {value}", binding.attr)?,
                None => write!(f, "{}: {value}", binding.attr)?,
            }
        }
        f.write_str(")")
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeMap, HashMap};

    use serde::Deserialize;

    use crate::error::BindError;
    use crate::resolve::BoundSchema;
    use crate::schema::{Column, Schema};
    use crate::types::{DataType, Row, Value};

    use super::Record;

    fn row(cells: &[&str]) -> Row {
        cells.iter().map(|c| Value::from(*c)).collect()
    }

    fn read(schema: &Schema, rows: Vec<Row>) -> Vec<Record> {
        BoundSchema::resolve(rows, schema)
            .unwrap()
            .records()
            .collect::<Result<Vec<_>, _>>()
            .unwrap()
    }

    fn people() -> Schema {
        Schema::builder("Person")
            .column("id", Column::new("ID").declared_type(DataType::Int64))
            .column("name", Column::new("Name"))
            .column("city", Column::new("City").optional().default_value("Moscow"))
            .build()
            .unwrap()
    }

    #[test]
    fn access_by_attr_header_and_position() {
        let records = read(&people(), vec![row(&["Name", "ID"]), row(&["Ada", "1"])]);
        let r = &records[0];
        assert_eq!(r.get("id"), Some(&Value::Int64(1)));
        assert_eq!(r.get_by_header("Name"), Some(&Value::from("Ada")));
        // Bound columns ordered by cell index: Name (0), ID (1).
        assert_eq!(r.get_index(0), Some(&Value::from("Ada")));
        assert_eq!(r.get_index(1), Some(&Value::Int64(1)));
        assert_eq!(r.get_index(2), None);
        assert_eq!(r.get("city"), Some(&Value::from("Moscow")));
        assert!(r.contains("ID"));
        assert!(!r.contains("City"));
        assert_eq!(r.len(), 3);
        assert_eq!(r.row_index(), 1);
    }

    #[test]
    fn null_bound_cell_yields_default() {
        let schema = Schema::builder("S")
            .column("id", Column::new("ID"))
            .column("city", Column::new("City").optional().default_value("Moscow"))
            .build()
            .unwrap();
        let records = read(&schema, vec![row(&["ID", "City"]), vec![Value::from("1")]]);
        assert_eq!(records[0].get("city"), Some(&Value::from("Moscow")));
        assert_eq!(records[0].raw().len(), 2);
    }

    #[test]
    fn equality_is_structural() {
        let a = read(&people(), vec![row(&["ID", "Name"]), row(&["1", "Ada"])]);
        let b = read(&people(), vec![row(&["x", "Name", "ID"]), row(&["", "Ada", "1"])]);
        assert_eq!(a[0], b[0]);

        let mut expected = HashMap::new();
        expected.insert("id".to_string(), Value::Int64(1));
        expected.insert("name".to_string(), Value::from("Ada"));
        expected.insert("city".to_string(), Value::from("Moscow"));
        assert_eq!(a[0], expected);

        let btree: BTreeMap<String, Value> = expected.into_iter().collect();
        assert_eq!(a[0], btree);
        assert_eq!(a[0].to_map(), btree);
    }

    #[test]
    fn conversion_failure_is_fatal() {
        let schema = people();
        let mut records = BoundSchema::resolve(vec![row(&["ID", "Name"]), row(&["one", "Ada"])], &schema)
            .unwrap()
            .records();
        match records.next() {
            Some(Err(BindError::Conversion { row, column, raw, .. })) => {
                assert_eq!(row, 1);
                assert_eq!(column, "id");
                assert_eq!(raw, "one");
            }
            other => panic!("unexpected: {other:?}"),
        }
        assert!(records.next().is_none());
    }

    #[test]
    fn deserializes_into_user_struct() {
        #[derive(Debug, Deserialize, PartialEq)]
        struct Person {
            id: i64,
            name: String,
            city: Option<String>,
        }

        let records = read(&people(), vec![row(&["ID", "Name"]), row(&["7", "Grace"])]);
        let p: Person = records[0].deserialize().unwrap();
        assert_eq!(
            p,
            Person {
                id: 7,
                name: "Grace".to_string(),
                city: Some("Moscow".to_string()),
            }
        );
    }

    #[test]
    fn debug_lists_attributes_with_headers() {
        let records = read(&people(), vec![row(&["ID", "Name"]), row(&["1", "Ada"])]);
        assert_eq!(
            format!("{:?}", records[0]),
            r#"Person(id (ID): 1, name (Name): "Ada", city: "Moscow")"#
        );
    }
}
