//! SQL AST and rendering.
//!
//! Statements are built as a small typed AST, then rendered to a string.
//! Bind values live inside the AST (`Expr::Param`), so rendering produces the
//! SQL text and the positional bind list in one pass: the n-th placeholder in
//! the text is always the n-th value in [`Statement::params`].
//!
//! Identifiers (table, column and index names) are written into the SQL text
//! verbatim. They must come from trusted, compile-time annotations; only
//! values go through placeholders.

use strid::braid;

mod expr;
pub use expr::*;

mod render;
pub use render::*;

mod stmt;
pub use stmt::*;

mod value;
pub use value::*;

/// Result of rendering SQL.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    /// The SQL string with placeholders.
    pub sql: String,

    /// Bind values in placeholder order.
    pub params: Vec<Value>,
}

/// The name of a table.
#[braid]
pub struct TableName;

/// The name of a column.
#[braid]
pub struct ColumnName;

/// The name of an index.
#[braid]
pub struct IndexName;

/// Generate a standard index name for a table and columns.
///
/// Uses the convention `idx_{table}_{columns}` where columns are joined by underscore.
///
/// # Examples
///
/// ```
/// assert_eq!(rowmap_sql::index_name("user", &["email"]), "idx_user_email");
/// assert_eq!(rowmap_sql::index_name("post", &["author_id", "created_at"]), "idx_post_author_id_created_at");
/// ```
pub fn index_name(table: &str, columns: &[impl AsRef<str>]) -> String {
    let cols: Vec<&str> = columns.iter().map(|c| c.as_ref()).collect();
    format!("idx_{}_{}", table, cols.join("_"))
}
