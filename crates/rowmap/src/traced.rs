//! Traced executor wrapper.
//!
//! Wraps any [`Executor`] and logs every statement via tracing.

use rowmap_sql::{Placeholder, Value};

use crate::executor::{DriverError, Executor, Row};

/// An executor that records a debug span per statement.
///
/// # Example
///
/// ```ignore
/// use rowmap::Traced;
///
/// let mut db = Traced::new(rusqlite::Connection::open_in_memory()?);
///
/// // All statements are automatically traced
/// rowmap::insert(&mut db, &user)?;
/// ```
pub struct Traced<E> {
    inner: E,
}

impl<E: Executor> Traced<E> {
    /// Create a new traced wrapper.
    pub fn new(inner: E) -> Self {
        Self { inner }
    }

    /// Get the inner executor.
    pub fn inner(&self) -> &E {
        &self.inner
    }

    /// Get the inner executor mutably.
    pub fn inner_mut(&mut self) -> &mut E {
        &mut self.inner
    }

    /// Unwrap, returning the inner executor.
    pub fn into_inner(self) -> E {
        self.inner
    }
}

impl<E: Executor> Executor for Traced<E> {
    fn placeholder(&self) -> Placeholder {
        self.inner.placeholder()
    }

    fn execute(&mut self, sql: &str, params: &[Value]) -> Result<u64, DriverError> {
        let span = tracing::debug_span!(
            "db.execute",
            sql = %sql,
            params = params.len(),
            affected = tracing::field::Empty,
        );
        let _guard = span.enter();
        let affected = self.inner.execute(sql, params)?;
        span.record("affected", affected);
        Ok(affected)
    }

    fn query_one(&mut self, sql: &str, params: &[Value]) -> Result<Option<Row>, DriverError> {
        let span = tracing::debug_span!(
            "db.query",
            sql = %sql,
            params = params.len(),
            rows = tracing::field::Empty,
        );
        let _guard = span.enter();
        let row = self.inner.query_one(sql, params)?;
        span.record("rows", u64::from(row.is_some()));
        Ok(row)
    }
}
