//! Statement builder.
//!
//! Pure functions from a [`Schema`] and a record's column values (in schema
//! column order, see [`column_values`](crate::column_values)) to rendered SQL
//! plus its positional bind values. Nothing here touches a database.

use rowmap_schema::{Column, Schema};
use rowmap_sql::{
    ColumnName, CreateIndexStmt, CreateTableStmt, DeleteStmt, Expr, IndexName, InsertStmt,
    Placeholder, SelectStmt, Statement, TableConstraint, TableName, UpdateStmt, Value, render,
    render_with,
};

use crate::{Error, Result};

/// `SELECT * FROM <table> WHERE <pk> = ? AND ...`
///
/// Binds the primary-key values in schema order.
pub fn query_row(schema: &Schema, values: &[Value], placeholder: Placeholder) -> Result<Statement> {
    let stmt = SelectStmt::new(table_name(schema)).where_(key_condition(schema, values)?);
    Ok(render_with(&stmt, placeholder))
}

/// `INSERT INTO <table> (<every column>) VALUES(?, ...)`
///
/// Every column is inserted, primary keys included.
pub fn insert(schema: &Schema, values: &[Value], placeholder: Placeholder) -> Result<Statement> {
    check_value_count(schema, values)?;

    let stmt = schema
        .columns
        .iter()
        .zip(values)
        .fold(InsertStmt::new(table_name(schema)), |stmt, (column, value)| {
            stmt.column(column_name(column), Expr::param(value.clone()))
        });
    Ok(render_with(&stmt, placeholder))
}

/// `UPDATE <table> SET <non-key> = ?,... WHERE <pk> = ? AND ...`
///
/// Binds the non-key values followed by the primary-key values, each in
/// schema order.
pub fn update(schema: &Schema, values: &[Value], placeholder: Placeholder) -> Result<Statement> {
    let condition = key_condition(schema, values)?;

    let assignments: Vec<(&Column, &Value)> = schema
        .columns
        .iter()
        .zip(values)
        .filter(|(column, _)| !column.is_primary_key())
        .collect();
    if assignments.is_empty() {
        return Err(Error::NoUpdatableColumn {
            table: schema.table.clone(),
        });
    }

    let stmt = assignments
        .into_iter()
        .fold(UpdateStmt::new(table_name(schema)), |stmt, (column, value)| {
            stmt.set(column_name(column), Expr::param(value.clone()))
        })
        .where_(condition);
    Ok(render_with(&stmt, placeholder))
}

/// `DELETE FROM <table> WHERE <pk> = ? AND ...`
pub fn delete(schema: &Schema, values: &[Value], placeholder: Placeholder) -> Result<Statement> {
    let stmt = DeleteStmt::new(table_name(schema)).where_(key_condition(schema, values)?);
    Ok(render_with(&stmt, placeholder))
}

/// DDL for a schema: the `CREATE TABLE IF NOT EXISTS` statement first, then
/// one `CREATE INDEX` per declared index.
///
/// Index statements are not guarded and fail when the index already exists.
pub fn create_table(schema: &Schema) -> Result<Vec<String>> {
    let keys: Vec<ColumnName> = schema.primary_keys().map(column_name).collect();
    if keys.is_empty() {
        return Err(Error::NoPrimaryKey {
            table: schema.table.clone(),
        });
    }

    let table = schema
        .columns
        .iter()
        .fold(
            CreateTableStmt::new(table_name(schema)).if_not_exists(),
            |stmt, column| {
                stmt.column(
                    column_name(column),
                    column.data_type.as_str(),
                    column.constraint.to_sql(),
                )
            },
        )
        .constraint(TableConstraint::PrimaryKey {
            name: format!("{}_pk", schema.table),
            columns: keys,
        });

    let mut statements = vec![render(&table).sql];
    for index in &schema.indexes {
        let stmt = CreateIndexStmt::new(IndexName::from(index.name.as_str()), table_name(schema))
            .columns(index.columns.iter().map(|c| ColumnName::from(c.as_str())));
        statements.push(render(&stmt).sql);
    }
    Ok(statements)
}

/// `<pk> = ? AND <pk> = ? ...` over the primary-key columns in schema order.
fn key_condition(schema: &Schema, values: &[Value]) -> Result<Expr> {
    check_value_count(schema, values)?;

    let conditions = schema
        .columns
        .iter()
        .zip(values)
        .filter(|(column, _)| column.is_primary_key())
        .map(|(column, value)| Expr::column(column_name(column)).eq(Expr::param(value.clone())));

    Expr::all(conditions).ok_or_else(|| Error::NoPrimaryKey {
        table: schema.table.clone(),
    })
}

fn check_value_count(schema: &Schema, values: &[Value]) -> Result<()> {
    if values.len() != schema.columns.len() {
        return Err(Error::ValueCount {
            table: schema.table.clone(),
            expected: schema.columns.len(),
            actual: values.len(),
        });
    }
    Ok(())
}

fn table_name(schema: &Schema) -> TableName {
    TableName::from(schema.table.as_str())
}

fn column_name(column: &Column) -> ColumnName {
    ColumnName::from(column.name.as_str())
}
