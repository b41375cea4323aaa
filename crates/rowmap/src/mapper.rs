//! CRUD entry points.
//!
//! Every operation resolves the record's schema, reads its column values,
//! builds one statement and hands it to the caller's [`Executor`].

use std::sync::Arc;

use facet::Facet;
use rowmap_schema::Schema;

use crate::executor::Executor;
use crate::registry::Registry;
use crate::{Error, Result, record, statement};

/// CRUD operations over an injected [`Registry`].
///
/// The free functions ([`crate::insert`] and friends) are shorthands for
/// `Mapper::global()`.
#[derive(Debug, Clone)]
pub struct Mapper {
    registry: Arc<Registry>,
}

impl Default for Mapper {
    fn default() -> Self {
        Self::global()
    }
}

impl Mapper {
    pub fn new(registry: Arc<Registry>) -> Self {
        Self { registry }
    }

    /// A mapper over the process-wide registry.
    pub fn global() -> Self {
        Self::new(Registry::global())
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// Resolve the schema for `T`.
    pub fn schema<T: Facet<'static> + 'static>(&self) -> Result<Arc<Schema>> {
        Ok(self.registry.resolve::<T>()?)
    }

    /// Load the row addressed by `record`'s primary key into `record`.
    pub fn query_row<T, E>(&self, db: &mut E, record: &mut T) -> Result<()>
    where
        T: Facet<'static> + 'static,
        E: Executor + ?Sized,
    {
        query_row(&self.schema::<T>()?, db, record)
    }

    /// Insert `record`, returning the number of affected rows.
    pub fn insert<T, E>(&self, db: &mut E, record: &T) -> Result<u64>
    where
        T: Facet<'static> + 'static,
        E: Executor + ?Sized,
    {
        insert(&self.schema::<T>()?, db, record)
    }

    /// Update the row addressed by `record`'s primary key.
    pub fn update<T, E>(&self, db: &mut E, record: &T) -> Result<u64>
    where
        T: Facet<'static> + 'static,
        E: Executor + ?Sized,
    {
        update(&self.schema::<T>()?, db, record)
    }

    /// Delete the row addressed by `record`'s primary key.
    pub fn delete<T, E>(&self, db: &mut E, record: &T) -> Result<u64>
    where
        T: Facet<'static> + 'static,
        E: Executor + ?Sized,
    {
        delete(&self.schema::<T>()?, db, record)
    }

    /// Create `T`'s table if missing, then its indexes.
    ///
    /// Not transactional: the first failing statement aborts and is
    /// returned, leaving earlier statements applied.
    pub fn create_table<T: Facet<'static> + 'static>(
        &self,
        db: &mut (impl Executor + ?Sized),
    ) -> Result<()> {
        create_table(&self.schema::<T>()?, db)
    }

    /// Bind `record` to its schema, see [`Model`].
    pub fn model<'a, T: Facet<'static> + 'static>(&self, record: &'a mut T) -> Result<Model<'a, T>> {
        Ok(Model {
            schema: self.schema::<T>()?,
            record,
        })
    }
}

/// A record bound to its resolved schema.
///
/// Resolves once, then runs any number of operations against the same
/// instance.
///
/// ```ignore
/// let mut user = User { id: 1, name: "ada".into(), age: 36 };
/// let mut model = rowmap::model(&mut user)?;
/// model.insert(&mut conn)?;
/// model.record_mut().age = 37;
/// model.update(&mut conn)?;
/// ```
pub struct Model<'a, T> {
    schema: Arc<Schema>,
    record: &'a mut T,
}

impl<T: Facet<'static>> Model<'_, T> {
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn record(&self) -> &T {
        &*self.record
    }

    pub fn record_mut(&mut self) -> &mut T {
        &mut *self.record
    }

    pub fn query_row<E: Executor + ?Sized>(&mut self, db: &mut E) -> Result<()> {
        query_row(&self.schema, db, &mut *self.record)
    }

    pub fn insert<E: Executor + ?Sized>(&self, db: &mut E) -> Result<u64> {
        insert(&self.schema, db, &*self.record)
    }

    pub fn update<E: Executor + ?Sized>(&self, db: &mut E) -> Result<u64> {
        update(&self.schema, db, &*self.record)
    }

    pub fn delete<E: Executor + ?Sized>(&self, db: &mut E) -> Result<u64> {
        delete(&self.schema, db, &*self.record)
    }
}

fn query_row<T: Facet<'static>, E: Executor + ?Sized>(
    schema: &Schema,
    db: &mut E,
    record: &mut T,
) -> Result<()> {
    let values = record::column_values(schema, record)?;
    let stmt = statement::query_row(schema, &values, db.placeholder())?;
    let row = db
        .query_one(&stmt.sql, &stmt.params)
        .map_err(Error::Driver)?
        .ok_or_else(|| Error::NotFound {
            table: schema.table.clone(),
        })?;
    record::scan_into(schema, &row, record)?;
    Ok(())
}

fn insert<T: Facet<'static>, E: Executor + ?Sized>(
    schema: &Schema,
    db: &mut E,
    record: &T,
) -> Result<u64> {
    let values = record::column_values(schema, record)?;
    let stmt = statement::insert(schema, &values, db.placeholder())?;
    db.execute(&stmt.sql, &stmt.params).map_err(Error::Driver)
}

fn update<T: Facet<'static>, E: Executor + ?Sized>(
    schema: &Schema,
    db: &mut E,
    record: &T,
) -> Result<u64> {
    let values = record::column_values(schema, record)?;
    let stmt = statement::update(schema, &values, db.placeholder())?;
    db.execute(&stmt.sql, &stmt.params).map_err(Error::Driver)
}

fn delete<T: Facet<'static>, E: Executor + ?Sized>(
    schema: &Schema,
    db: &mut E,
    record: &T,
) -> Result<u64> {
    let values = record::column_values(schema, record)?;
    let stmt = statement::delete(schema, &values, db.placeholder())?;
    db.execute(&stmt.sql, &stmt.params).map_err(Error::Driver)
}

fn create_table<E: Executor + ?Sized>(schema: &Schema, db: &mut E) -> Result<()> {
    for sql in statement::create_table(schema)? {
        db.execute(&sql, &[]).map_err(Error::Driver)?;
    }
    Ok(())
}
