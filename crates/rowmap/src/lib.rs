//! Reflection-driven CRUD mapping for flat records, powered by facet.
//!
//! A record type opts in by deriving `Facet` and annotating the fields that
//! are persisted. Its [`Schema`] is derived once and cached; every operation
//! then builds parameterized SQL from the schema and the record's current
//! field values, and runs it through a caller-supplied [`Executor`].
//!
//! ```ignore
//! use facet::Facet;
//!
//! #[derive(Debug, Default, Facet)]
//! struct User {
//!     #[facet(rowmap::pk)]
//!     id: i64,
//!     #[facet(rowmap::column)]
//!     name: String,
//!     #[facet(rowmap::column)]
//!     age: i32,
//! }
//!
//! let mut conn = rusqlite::Connection::open_in_memory()?;
//! rowmap::create_table::<User>(&mut conn)?;
//!
//! let user = User { id: 1, name: "ada".into(), age: 36 };
//! rowmap::insert(&mut conn, &user)?;
//!
//! let mut loaded = User { id: 1, ..Default::default() };
//! rowmap::query_row(&mut conn, &mut loaded)?;
//! ```
//!
//! # Naming Convention
//!
//! The table name is the type name, lower-cased: `User` maps to `user`.
//! Column names default to the field name. Identifiers are written into the
//! SQL text as-is (only values are bound), so they must come from the
//! annotations, never from user input.
//!
//! # Annotations
//!
//! - `rowmap::column` / `rowmap::column = "name"`: persist the field
//! - `rowmap::pk`: primary key (composite keys are allowed)
//! - `rowmap::not_null`, `rowmap::unique`: column constraints
//! - `rowmap::sql_type = "VARCHAR(64)"`: override the inferred type
//! - `rowmap::index` / `rowmap::index = "name"`: single-column index
//! - `#[facet(rowmap::composite_index(columns = "a,b"))]` on the struct
//!
//! Fields without any `rowmap::` attribute are not persisted, and scanning a
//! row leaves them as they were.

mod error;
mod executor;
mod mapper;
pub mod record;
mod registry;
pub mod statement;
mod traced;

#[cfg(feature = "postgres")]
pub mod postgres;
#[cfg(feature = "sqlite")]
mod sqlite;

use facet::Facet;

pub use error::{Error, ScanError, ValueError};
pub use executor::{DriverError, Executor, Row};
pub use mapper::{Mapper, Model};
pub use record::{ColumnValue, column_values, scan_into};
pub use registry::Registry;
pub use traced::Traced;

pub use rowmap_schema::{Column, Constraint, FieldRef, Index, Schema, SchemaError, SqlType};
pub use rowmap_sql::{Placeholder, Statement, Value};

// Re-export attr grammar
pub use rowmap_schema::{__attr, __parse_attr, Attr};

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Resolve `T`'s schema from the process-wide registry.
pub fn schema<T: Facet<'static> + 'static>() -> Result<std::sync::Arc<Schema>> {
    Mapper::global().schema::<T>()
}

/// Load the row addressed by `record`'s primary key into `record`.
///
/// Fails with [`Error::NotFound`] if there is no such row.
pub fn query_row<T, E>(db: &mut E, record: &mut T) -> Result<()>
where
    T: Facet<'static> + 'static,
    E: Executor + ?Sized,
{
    Mapper::global().query_row(db, record)
}

/// Insert every column of `record`.
pub fn insert<T, E>(db: &mut E, record: &T) -> Result<u64>
where
    T: Facet<'static> + 'static,
    E: Executor + ?Sized,
{
    Mapper::global().insert(db, record)
}

/// Write every non-key column of `record` to the row addressed by its key.
pub fn update<T, E>(db: &mut E, record: &T) -> Result<u64>
where
    T: Facet<'static> + 'static,
    E: Executor + ?Sized,
{
    Mapper::global().update(db, record)
}

/// Delete the row addressed by `record`'s primary key.
pub fn delete<T, E>(db: &mut E, record: &T) -> Result<u64>
where
    T: Facet<'static> + 'static,
    E: Executor + ?Sized,
{
    Mapper::global().delete(db, record)
}

/// Create `T`'s table if it does not exist, then its indexes.
pub fn create_table<T: Facet<'static> + 'static>(db: &mut (impl Executor + ?Sized)) -> Result<()> {
    Mapper::global().create_table::<T>(db)
}

/// Bind `record` to its schema for repeated operations.
pub fn model<T: Facet<'static> + 'static>(record: &mut T) -> Result<Model<'_, T>> {
    Mapper::global().model(record)
}
