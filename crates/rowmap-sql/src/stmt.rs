//! SQL statements.

use crate::expr::Expr;
use crate::{ColumnName, IndexName, TableName};

// ============================================================================
// SELECT statement
// ============================================================================

/// A single-table `SELECT *` statement.
#[derive(Debug, Clone)]
pub struct SelectStmt {
    pub table: TableName,
    pub where_: Option<Expr>,
}

// ============================================================================
// INSERT statement
// ============================================================================

/// An INSERT statement.
#[derive(Debug, Clone)]
pub struct InsertStmt {
    pub table: TableName,
    pub columns: Vec<ColumnName>,
    pub values: Vec<Expr>,
}

// ============================================================================
// UPDATE statement
// ============================================================================

/// An assignment in UPDATE SET.
#[derive(Debug, Clone)]
pub struct UpdateAssignment {
    pub column: ColumnName,
    pub value: Expr,
}

impl UpdateAssignment {
    pub fn new(column: ColumnName, value: Expr) -> Self {
        Self { column, value }
    }
}

/// An UPDATE statement.
#[derive(Debug, Clone)]
pub struct UpdateStmt {
    pub table: TableName,
    pub assignments: Vec<UpdateAssignment>,
    pub where_: Option<Expr>,
}

// ============================================================================
// DELETE statement
// ============================================================================

/// A DELETE statement.
#[derive(Debug, Clone)]
pub struct DeleteStmt {
    pub table: TableName,
    pub where_: Option<Expr>,
}

// ============================================================================
// DDL statements
// ============================================================================

/// A column definition inside CREATE TABLE.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: ColumnName,
    /// SQL type keyword, e.g. `BIGINT` or `VARCHAR(64)`.
    pub data_type: String,
    /// Rendered constraint text, e.g. `NOT NULL UNIQUE`. Empty for none.
    pub constraints: String,
}

/// A table-level constraint inside CREATE TABLE.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableConstraint {
    /// CONSTRAINT name PRIMARY KEY(col,...)
    PrimaryKey {
        name: String,
        columns: Vec<ColumnName>,
    },
}

/// A CREATE TABLE statement.
#[derive(Debug, Clone)]
pub struct CreateTableStmt {
    pub table: TableName,
    pub if_not_exists: bool,
    pub columns: Vec<ColumnDef>,
    pub constraints: Vec<TableConstraint>,
}

/// A CREATE INDEX statement.
#[derive(Debug, Clone)]
pub struct CreateIndexStmt {
    pub name: IndexName,
    pub table: TableName,
    pub columns: Vec<ColumnName>,
}

// ============================================================================
// Builder-style constructors
// ============================================================================

impl SelectStmt {
    pub fn new(table: TableName) -> Self {
        Self {
            table,
            where_: None,
        }
    }

    pub fn where_(mut self, expr: Expr) -> Self {
        self.where_ = Some(expr);
        self
    }
}

impl InsertStmt {
    pub fn new(table: TableName) -> Self {
        Self {
            table,
            columns: Vec::new(),
            values: Vec::new(),
        }
    }

    pub fn column(mut self, name: ColumnName, value: Expr) -> Self {
        self.columns.push(name);
        self.values.push(value);
        self
    }
}

impl UpdateStmt {
    pub fn new(table: TableName) -> Self {
        Self {
            table,
            assignments: Vec::new(),
            where_: None,
        }
    }

    pub fn set(mut self, column: ColumnName, value: Expr) -> Self {
        self.assignments.push(UpdateAssignment::new(column, value));
        self
    }

    pub fn where_(mut self, expr: Expr) -> Self {
        self.where_ = Some(expr);
        self
    }
}

impl DeleteStmt {
    pub fn new(table: TableName) -> Self {
        Self {
            table,
            where_: None,
        }
    }

    pub fn where_(mut self, expr: Expr) -> Self {
        self.where_ = Some(expr);
        self
    }
}

impl CreateTableStmt {
    pub fn new(table: TableName) -> Self {
        Self {
            table,
            if_not_exists: false,
            columns: Vec::new(),
            constraints: Vec::new(),
        }
    }

    pub fn if_not_exists(mut self) -> Self {
        self.if_not_exists = true;
        self
    }

    pub fn column(
        mut self,
        name: ColumnName,
        data_type: impl Into<String>,
        constraints: impl Into<String>,
    ) -> Self {
        self.columns.push(ColumnDef {
            name,
            data_type: data_type.into(),
            constraints: constraints.into(),
        });
        self
    }

    pub fn constraint(mut self, constraint: TableConstraint) -> Self {
        self.constraints.push(constraint);
        self
    }
}

impl CreateIndexStmt {
    pub fn new(name: IndexName, table: TableName) -> Self {
        Self {
            name,
            table,
            columns: Vec::new(),
        }
    }

    pub fn columns(mut self, cols: impl IntoIterator<Item = ColumnName>) -> Self {
        self.columns.extend(cols);
        self
    }
}
