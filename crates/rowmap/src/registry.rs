//! Process-wide schema cache.
//!
//! Deriving a [`Schema`] walks the record's shape and its attributes, so it is
//! done once per type and shared afterwards.

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::{Arc, LazyLock, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use facet::Facet;
use rowmap_schema::{Schema, SchemaError};

static GLOBAL: LazyLock<Arc<Registry>> = LazyLock::new(|| Arc::new(Registry::new()));

/// Maps record types to their derived schemas.
///
/// Safe to share between threads. For any type, every successful
/// [`resolve`](Registry::resolve) returns the same `Arc<Schema>`.
#[derive(Debug, Default)]
pub struct Registry {
    schemas: RwLock<HashMap<TypeId, Arc<Schema>>>,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The lazily created process-wide registry.
    pub fn global() -> Arc<Registry> {
        GLOBAL.clone()
    }

    /// Return the schema for `T`, deriving and caching it on first use.
    ///
    /// Errors are not cached: a later call derives again.
    pub fn resolve<T: Facet<'static> + 'static>(&self) -> Result<Arc<Schema>, SchemaError> {
        let key = TypeId::of::<T>();
        if let Some(schema) = self.read().get(&key) {
            return Ok(schema.clone());
        }

        // Derived outside the lock; if two threads race, the first insert wins
        // and the other derivation is dropped.
        let schema = Schema::from_shape(T::SHAPE)?;
        let mut schemas = self.write();
        let schema = schemas.entry(key).or_insert_with(|| Arc::new(schema));
        Ok(schema.clone())
    }

    /// Number of cached schemas.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Drop every cached schema.
    pub fn clear(&self) {
        self.write().clear();
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<TypeId, Arc<Schema>>> {
        self.schemas.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<TypeId, Arc<Schema>>> {
        self.schemas.write().unwrap_or_else(PoisonError::into_inner)
    }
}
