use rowmap_schema::SchemaError;
use thiserror::Error;

use crate::executor::DriverError;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("table `{table}` has no primary key column")]
    NoPrimaryKey { table: String },

    #[error("table `{table}` has no non-key column to update")]
    NoUpdatableColumn { table: String },

    #[error("table `{table}` has {expected} columns but {actual} values were supplied")]
    ValueCount {
        table: String,
        expected: usize,
        actual: usize,
    },

    #[error("column `{column}` cannot be bound: {source}")]
    Bind {
        column: String,
        #[source]
        source: ValueError,
    },

    #[error("reflection error: {0}")]
    Reflect(String),

    #[error("no row found in `{table}`")]
    NotFound { table: String },

    /// Failure reported by the database driver, unmodified.
    #[error(transparent)]
    Driver(DriverError),

    #[error(transparent)]
    Scan(#[from] ScanError),
}

/// A result row could not be copied into a record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScanError {
    #[error("missing column `{column}` in result row")]
    MissingColumn { column: String },

    #[error("column `{column}` is NULL but the field is not an Option")]
    UnexpectedNull { column: String },

    #[error("type mismatch for column `{column}`: expected {expected}, found {found}")]
    TypeMismatch {
        column: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("value {value} of column `{column}` does not fit in {expected}")]
    OutOfRange {
        column: String,
        expected: &'static str,
        value: String,
    },

    #[error("reflection error: {0}")]
    Reflect(String),
}

/// Conversion failure between a field type and a [`Value`](rowmap_sql::Value).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueError {
    #[error("unexpected NULL")]
    UnexpectedNull,

    #[error("expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("value {value} does not fit in {expected}")]
    OutOfRange {
        expected: &'static str,
        value: String,
    },
}

impl ValueError {
    /// Attach the column name this conversion was made for.
    pub fn for_column(self, column: &str) -> ScanError {
        let column = column.to_string();
        match self {
            ValueError::UnexpectedNull => ScanError::UnexpectedNull { column },
            ValueError::TypeMismatch { expected, found } => ScanError::TypeMismatch {
                column,
                expected,
                found,
            },
            ValueError::OutOfRange { expected, value } => ScanError::OutOfRange {
                column,
                expected,
                value,
            },
        }
    }
}
