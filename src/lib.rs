//! `rowbind` maps raw tabular rows (untyped cells from a spreadsheet or CSV source) onto
//! declared record [`schema::Schema`]s.
//!
//! A read runs in three steps:
//!
//! 1. **Header resolution** ([`resolve::header`]): scan the rows for the first window in which
//!    every required column matches a header cell. Windows can span several physical rows
//!    (`header_rows > 1`); they are flattened into one logical header, with blank top cells
//!    reusing the merged cell to their left.
//! 2. **Column binding** ([`resolve::binder`]): every column binds the first header cell its
//!    matcher accepts. Bindings belong to the resolution, never to the schema.
//! 3. **Materialization** ([`record`]): a lazy iterator of validated, typed [`record::Record`]s.
//!    Rows a validator rejects are dropped or end the read, per column.
//!
//! ## Quick example
//!
//! ```rust
//! use rowbind::provider::{read, MemoryProvider};
//! use rowbind::schema::{Column, Schema};
//! use rowbind::types::{DataType, Value};
//!
//! # fn main() -> Result<(), rowbind::BindError> {
//! let schema = Schema::builder("Person")
//!     .column("id", Column::new("ID").declared_type(DataType::Int64))
//!     .column("name", Column::new("Name").check(|v| !v.is_null()).skip_invalid_row(true))
//!     .column("city", Column::new("City").optional().default_value("Moscow"))
//!     .build()?;
//!
//! let mut provider = MemoryProvider::new(vec![
//!     vec![Value::from("Staff export")],
//!     vec![Value::from("ID"), Value::from("Name")],
//!     vec![Value::from("1"), Value::from("Alice")],
//!     vec![],
//!     vec![Value::from("2"), Value::from("Bob")],
//! ]);
//!
//! let people = read(&mut provider, &schema)?.collect::<Result<Vec<_>, _>>()?;
//! assert_eq!(people.len(), 2);
//! assert_eq!(people[1].get("id"), Some(&Value::Int64(2)));
//! assert_eq!(people[1].get("city"), Some(&Value::from("Moscow")));
//! # Ok(())
//! # }
//! ```
//!
//! ## Multi-row headers
//!
//! ```rust
//! use rowbind::resolve::BoundSchema;
//! use rowbind::schema::{Column, Schema};
//! use rowbind::types::Value;
//!
//! # fn main() -> Result<(), rowbind::BindError> {
//! let schema = Schema::builder("Sales")
//!     .column("north", Column::new("Region;North"))
//!     .column("east", Column::new("Region;East"))
//!     .header_rows(2)
//!     .build()?;
//!
//! let rows = vec![
//!     vec![Value::from("Region"), Value::Null],
//!     vec![Value::from("North"), Value::from("East")],
//!     vec![Value::Int64(10), Value::Int64(20)],
//! ];
//! let bound = BoundSchema::resolve(rows, &schema)?;
//! assert_eq!(bound.header(), ["Region;North", "Region;East"]);
//! assert_eq!(bound.data_row_index(), 2);
//! # Ok(())
//! # }
//! ```
//!
//! ## Files
//!
//! [`provider::read_path`] picks a provider by extension (`.csv`, `.tsv`, and with the Cargo
//! feature `excel` also `.xlsx`, `.xls`, `.xlsm`, `.xlsb`, `.ods`) and can report outcomes to a
//! [`provider::ReadObserver`].
//!
//! ## Modules
//!
//! - [`schema`]: column descriptors, schemas, conversion table, JSON definitions
//! - [`resolve`]: header resolution and column binding
//! - [`record`]: records and the lazy materializer
//! - [`provider`]: row providers, read entrypoints, observers
//! - [`types`]: cell values and declared types
//! - [`error`]: error types

pub mod error;
pub mod provider;
pub mod record;
pub mod resolve;
pub mod schema;
pub mod types;

pub use error::{BindError, BindResult, ProviderError};
pub use provider::{read, read_path, RowProvider};
pub use record::{Record, Records};
pub use schema::{Column, Schema};
