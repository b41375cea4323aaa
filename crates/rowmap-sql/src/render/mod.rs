//! Render SQL AST to string.

use std::cell::RefCell;
use std::fmt;

use crate::expr::Expr;
use crate::stmt::*;
use crate::{Statement, Value};

/// Separator between column definitions in CREATE TABLE.
pub const DEFINITION_SEPARATOR: &str = ",\n";

/// Positional placeholder syntax expected by the database driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Placeholder {
    /// `?` for every parameter (SQLite, MySQL, ODBC-style drivers).
    #[default]
    Question,
    /// `$1`, `$2`, ... (Postgres).
    Dollar,
}

impl Placeholder {
    /// Write the placeholder for the 1-based parameter index `idx`.
    fn write(self, idx: usize, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Placeholder::Question => write!(f, "?"),
            Placeholder::Dollar => write!(f, "${idx}"),
        }
    }
}

/// Rendering context that collects bind values.
///
/// Uses interior mutability (`RefCell`) so that `Render::render` can take `&self`,
/// enabling the `Fmt` wrapper to implement `Display`.
pub struct RenderContext {
    placeholder: Placeholder,
    /// Bind values in the order their placeholders were written.
    params: RefCell<Vec<Value>>,
}

impl RenderContext {
    pub fn new(placeholder: Placeholder) -> Self {
        Self {
            placeholder,
            params: RefCell::new(Vec::new()),
        }
    }

    /// Record a bind value and return its 1-based position.
    fn push_param(&self, value: &Value) -> usize {
        let mut params = self.params.borrow_mut();
        params.push(value.clone());
        params.len()
    }

    /// Finish rendering and return the collected params.
    fn into_params(self) -> Vec<Value> {
        self.params.into_inner()
    }
}

impl Default for RenderContext {
    fn default() -> Self {
        Self::new(Placeholder::default())
    }
}

/// Wrapper for rendering a `Render` type via `Display`.
///
/// Allows using `write!(f, "{}", Fmt(ctx, &expr))` in format strings.
pub struct Fmt<'a, T: Render>(
    /// The rendering context for parameter tracking.
    &'a RenderContext,
    /// The value to render.
    &'a T,
);

impl<T: Render> fmt::Display for Fmt<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.1.render(self.0, f)
    }
}

// ============================================================================
// Render implementations
// ============================================================================

/// Trait for types that can be rendered to SQL.
pub trait Render {
    fn render(&self, ctx: &RenderContext, f: &mut fmt::Formatter<'_>) -> fmt::Result;
}

impl Render for Expr {
    fn render(&self, ctx: &RenderContext, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Param(value) => {
                let idx = ctx.push_param(value);
                ctx.placeholder.write(idx, f)
            }
            Expr::Column(col) => write!(f, "{}", col.as_str()),
            Expr::BinOp { left, op, right } => {
                let left = Fmt(ctx, left.as_ref());
                let right = Fmt(ctx, right.as_ref());
                let op = op.as_str();
                write!(f, "{left} {op} {right}")
            }
        }
    }
}

fn render_where(
    where_: &Option<Expr>,
    ctx: &RenderContext,
    f: &mut fmt::Formatter<'_>,
) -> fmt::Result {
    if let Some(where_) = where_ {
        let where_ = Fmt(ctx, where_);
        write!(f, " WHERE {where_}")?;
    }
    Ok(())
}

impl Render for SelectStmt {
    fn render(&self, ctx: &RenderContext, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SELECT * FROM {}", self.table.as_str())?;
        render_where(&self.where_, ctx, f)
    }
}

impl Render for InsertStmt {
    fn render(&self, ctx: &RenderContext, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "INSERT INTO {} (", self.table.as_str())?;

        for (i, col) in self.columns.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}", col.as_str())?;
        }
        write!(f, ")")?;

        write!(f, " VALUES(")?;
        for (i, val) in self.values.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}", Fmt(ctx, val))?;
        }
        write!(f, ")")
    }
}

impl Render for UpdateStmt {
    fn render(&self, ctx: &RenderContext, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UPDATE {} SET ", self.table.as_str())?;

        for (i, assign) in self.assignments.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            let val = Fmt(ctx, &assign.value);
            write!(f, "{} = {val}", assign.column.as_str())?;
        }

        render_where(&self.where_, ctx, f)
    }
}

impl Render for DeleteStmt {
    fn render(&self, ctx: &RenderContext, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DELETE FROM {}", self.table.as_str())?;
        render_where(&self.where_, ctx, f)
    }
}

impl Render for ColumnDef {
    fn render(&self, _ctx: &RenderContext, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let def = format!(
            " {} {} {}",
            self.name.as_str(),
            self.data_type,
            self.constraints
        );
        write!(f, "{}", def.trim_end())
    }
}

impl Render for TableConstraint {
    fn render(&self, _ctx: &RenderContext, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableConstraint::PrimaryKey { name, columns } => {
                let cols: Vec<&str> = columns.iter().map(|c| c.as_str()).collect();
                write!(f, " CONSTRAINT {name} PRIMARY KEY({})", cols.join(","))
            }
        }
    }
}

impl Render for CreateTableStmt {
    fn render(&self, ctx: &RenderContext, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CREATE TABLE ")?;
        if self.if_not_exists {
            write!(f, "IF NOT EXISTS ")?;
        }
        writeln!(f, "{} (", self.table.as_str())?;

        let mut first = true;
        for def in &self.columns {
            if !first {
                write!(f, "{DEFINITION_SEPARATOR}")?;
            }
            first = false;
            write!(f, "{}", Fmt(ctx, def))?;
        }
        for constraint in &self.constraints {
            if !first {
                write!(f, "{DEFINITION_SEPARATOR}")?;
            }
            first = false;
            write!(f, "{}", Fmt(ctx, constraint))?;
        }

        write!(f, "\n)")
    }
}

impl Render for CreateIndexStmt {
    fn render(&self, _ctx: &RenderContext, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cols: Vec<&str> = self.columns.iter().map(|c| c.as_str()).collect();
        write!(
            f,
            "CREATE INDEX {} ON {} ({})",
            self.name.as_str(),
            self.table.as_str(),
            cols.join(",")
        )
    }
}

// ============================================================================
// Convenience methods
// ============================================================================

/// Render a statement to SQL with `?` placeholders.
pub fn render(stmt: &impl Render) -> Statement {
    render_with(stmt, Placeholder::Question)
}

/// Render a statement to SQL with the given placeholder style.
pub fn render_with(stmt: &impl Render, placeholder: Placeholder) -> Statement {
    let ctx = RenderContext::new(placeholder);
    let sql = format!("{}", Fmt(&ctx, stmt));
    Statement {
        sql,
        params: ctx.into_params(),
    }
}

#[cfg(test)]
mod tests;
