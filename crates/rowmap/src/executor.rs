//! The seam between rowmap and a database driver.

use rowmap_sql::{Placeholder, Value};

/// A result row: `(column name, value)` pairs in result-set order.
pub type Row = Vec<(String, Value)>;

/// Whatever the driver reported, passed through unmodified.
pub type DriverError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Executes rendered SQL with positional bind values.
///
/// Implementations convert [`Value`]s to the driver's parameter type and
/// result columns back to [`Value`]s. They must not rewrite the SQL.
pub trait Executor {
    /// Placeholder syntax this driver expects.
    fn placeholder(&self) -> Placeholder {
        Placeholder::Question
    }

    /// Execute a statement and return the number of affected rows.
    fn execute(&mut self, sql: &str, params: &[Value]) -> Result<u64, DriverError>;

    /// Execute a query and return its first row, if any.
    fn query_one(&mut self, sql: &str, params: &[Value]) -> Result<Option<Row>, DriverError>;
}

impl<E: Executor + ?Sized> Executor for &mut E {
    fn placeholder(&self) -> Placeholder {
        (**self).placeholder()
    }

    fn execute(&mut self, sql: &str, params: &[Value]) -> Result<u64, DriverError> {
        (**self).execute(sql, params)
    }

    fn query_one(&mut self, sql: &str, params: &[Value]) -> Result<Option<Row>, DriverError> {
        (**self).query_one(sql, params)
    }
}
