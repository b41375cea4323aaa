//! Schema model and metadata extraction for rowmap.
//!
//! A [`Schema`] is derived once from a record type's facet [`Shape`]: every
//! field carrying a `rowmap::` attribute becomes a [`Column`], in declaration
//! order. Fields without one are ignored. The table name is the type name,
//! lower-cased.

use bitflags::bitflags;
use facet::{Facet, Field, Shape, StructKind, Type, UserType};
use rowmap_sql::index_name;
use std::fmt;

mod error;
pub use error::SchemaError;

// Define the rowmap attribute grammar using facet's macro.
// This generates:
// - `Attr` enum with all attribute variants
// - `__attr!` macro for parsing attributes
// - Re-exports for use as `rowmap::pk`, `rowmap::column`, etc.
facet::define_attr_grammar! {
    ns "rowmap";
    crate_path ::rowmap;

    /// Rowmap persistence attribute types.
    pub enum Attr {
        /// Persists the field as a column, optionally under another name
        /// (default: the field name).
        ///
        /// Usage: `#[facet(rowmap::column)]` or `#[facet(rowmap::column = "column_name")]`
        Column(Option<&'static str>),

        /// Marks a field as (part of) the primary key.
        ///
        /// Usage: `#[facet(rowmap::pk)]`
        Pk,

        /// Marks a field as not null (explicit, inferred for non-Option types).
        ///
        /// Usage: `#[facet(rowmap::not_null)]`
        NotNull,

        /// Marks a field as having a unique constraint.
        ///
        /// Usage: `#[facet(rowmap::unique)]`
        Unique,

        /// Overrides the inferred SQL data type.
        ///
        /// Usage: `#[facet(rowmap::sql_type = "VARCHAR(64)")]`
        SqlType(&'static str),

        /// Creates an index on a single column (field-level).
        ///
        /// Usage: `#[facet(rowmap::index)]` or `#[facet(rowmap::index = "index_name")]`
        Index(Option<&'static str>),

        /// Creates an index on one or more columns (container-level).
        ///
        /// Usage:
        /// - `#[facet(rowmap::composite_index(columns = "col1,col2"))]` - auto-named
        /// - `#[facet(rowmap::composite_index(name = "idx_foo", columns = "col1,col2"))]` - named
        CompositeIndex(CompositeIndex),
    }

    /// Composite index definition for multi-column indices.
    pub struct CompositeIndex {
        /// Optional index name (auto-generated if not provided)
        pub name: Option<&'static str>,
        /// Comma-separated column names
        pub columns: &'static str,
    }
}

/// Column data types inferred from Rust field types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlType {
    /// SMALLINT (2 bytes)
    SmallInt,
    /// INTEGER (4 bytes)
    Integer,
    /// BIGINT (8 bytes)
    BigInt,
    /// REAL (4 bytes floating point)
    Real,
    /// DOUBLE PRECISION (8 bytes floating point)
    DoublePrecision,
    /// BOOLEAN
    Boolean,
    /// TEXT
    Text,
    /// BYTEA (binary)
    Bytea,
}

impl fmt::Display for SqlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlType::SmallInt => write!(f, "SMALLINT"),
            SqlType::Integer => write!(f, "INTEGER"),
            SqlType::BigInt => write!(f, "BIGINT"),
            SqlType::Real => write!(f, "REAL"),
            SqlType::DoublePrecision => write!(f, "DOUBLE PRECISION"),
            SqlType::Boolean => write!(f, "BOOLEAN"),
            SqlType::Text => write!(f, "TEXT"),
            SqlType::Bytea => write!(f, "BYTEA"),
        }
    }
}

bitflags! {
    /// SQL column constraints.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Constraint: u8 {
        /// Column is (part of) the primary key
        const PRIMARY_KEY = 0b0000_0001;
        /// Column rejects NULL
        const NOT_NULL = 0b0000_0010;
        /// Column values are unique
        const UNIQUE = 0b0000_0100;
    }
}

impl Constraint {
    /// Returns true if the primary key flag is set.
    pub fn is_primary_key(self) -> bool {
        self.contains(Constraint::PRIMARY_KEY)
    }

    /// Constraint text for a column definition.
    ///
    /// The primary key is not included: it is declared once for the whole
    /// table as a named `CONSTRAINT <table>_pk PRIMARY KEY(...)`.
    pub fn to_sql(self) -> String {
        let mut parts = Vec::new();
        if self.contains(Constraint::NOT_NULL) {
            parts.push("NOT NULL");
        }
        if self.contains(Constraint::UNIQUE) {
            parts.push("UNIQUE");
        }
        parts.join(" ")
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_sql())
    }
}

/// Reference back to the record field a column was derived from.
///
/// Holds no data: it is resolved against whatever record instance is passed
/// to each operation.
#[derive(Clone, Copy)]
pub struct FieldRef {
    /// Position of the field in the struct declaration.
    pub index: usize,
    /// Rust field name.
    pub name: &'static str,
    /// Shape of the field type (including any `Option` wrapper).
    pub shape: &'static Shape,
}

impl fmt::Debug for FieldRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FieldRef({}: {} @ {})", self.name, self.shape, self.index)
    }
}

impl PartialEq for FieldRef {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index && self.name == other.name
    }
}

/// A persisted column.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    /// Column name
    pub name: String,
    /// The record field this column reads from and writes to
    pub field: FieldRef,
    /// SQL data type keyword
    pub data_type: String,
    /// Constraint flags
    pub constraint: Constraint,
    /// Whether the field is an `Option<T>` and accepts NULL on scan
    pub nullable: bool,
}

impl Column {
    /// Whether this column is part of the primary key.
    pub fn is_primary_key(&self) -> bool {
        self.constraint.is_primary_key()
    }
}

/// A secondary index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Index {
    /// Index name
    pub name: String,
    /// Indexed column names, in order
    pub columns: Vec<String>,
}

/// The table description for one record type.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    /// Table name
    pub table: String,
    /// Columns in field declaration order
    pub columns: Vec<Column>,
    /// Secondary indexes
    pub indexes: Vec<Index>,
}

impl Schema {
    /// Primary-key columns, in schema order.
    pub fn primary_keys(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|c| c.is_primary_key())
    }

    /// Non-key columns, in schema order.
    pub fn non_keys(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|c| !c.is_primary_key())
    }

    /// Whether at least one column carries the primary key constraint.
    pub fn has_primary_key(&self) -> bool {
        self.primary_keys().next().is_some()
    }

    /// Look up a column by name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Derive a schema from a facet shape.
    ///
    /// Fails if the shape is not a struct with named fields, if no field
    /// carries a `rowmap::` attribute, or if a persisted field has a type
    /// that cannot be bound as a SQL value.
    pub fn from_shape(shape: &'static Shape) -> Result<Schema, SchemaError> {
        let type_name = shape.type_identifier;

        let struct_type = match &shape.ty {
            Type::User(UserType::Struct(s)) if s.kind == StructKind::Struct => s,
            _ => {
                return Err(SchemaError::NotAStruct {
                    type_name: type_name.to_string(),
                });
            }
        };

        let table = type_name.to_lowercase();
        let mut columns: Vec<Column> = Vec::new();
        let mut indexes = Vec::new();

        // Container-level composite indices
        for attr in shape.attributes.iter() {
            if attr.ns == Some("rowmap")
                && attr.key == "composite_index"
                && let Some(Attr::CompositeIndex(composite)) = attr.get_as::<Attr>()
            {
                let cols: Vec<String> = composite
                    .columns
                    .split(',')
                    .map(|c| c.trim().to_string())
                    .filter(|c| !c.is_empty())
                    .collect();
                let idx_name = composite
                    .name
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| index_name(&table, &cols));
                indexes.push(Index {
                    name: idx_name,
                    columns: cols,
                });
            }
        }

        for (index, field) in struct_type.fields.iter().enumerate() {
            if !is_persisted(field) {
                continue;
            }

            let field_shape = field.shape();

            // Determine column name
            let col_name = field_get_attr_str(field, "column")
                .filter(|s| !s.is_empty())
                .map(|s| s.to_string())
                .unwrap_or_else(|| field.name.to_string());

            if columns.iter().any(|c| c.name == col_name) {
                return Err(SchemaError::DuplicateColumn {
                    table,
                    column: col_name,
                });
            }

            // Determine if nullable (Option<T> types)
            let (inner_shape, nullable) = unwrap_option(field_shape);

            // The value lens can only bind the inferable types, so an
            // explicit sql_type does not lift this requirement.
            let Some(inferred) = shape_to_sql_type(inner_shape) else {
                return Err(SchemaError::UnsupportedType {
                    type_name: type_name.to_string(),
                    field: field.name.to_string(),
                    shape: inner_shape.to_string(),
                });
            };

            let data_type = field_get_attr_str(field, "sql_type")
                .map(|s| s.to_string())
                .unwrap_or_else(|| inferred.to_string());

            let mut constraint = Constraint::empty();
            if field_has_attr(field, "pk") {
                constraint |= Constraint::PRIMARY_KEY;
            }
            if !nullable || field_has_attr(field, "not_null") {
                constraint |= Constraint::NOT_NULL;
            }
            if field_has_attr(field, "unique") {
                constraint |= Constraint::UNIQUE;
            }

            // Field-level index
            if field_has_attr(field, "index") {
                let idx_name = field_get_attr_str(field, "index")
                    .filter(|s| !s.is_empty())
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| index_name(&table, &[&col_name]));
                indexes.push(Index {
                    name: idx_name,
                    columns: vec![col_name.clone()],
                });
            }

            columns.push(Column {
                name: col_name,
                field: FieldRef {
                    index,
                    name: field.name,
                    shape: field_shape,
                },
                data_type,
                constraint,
                nullable,
            });
        }

        if columns.is_empty() {
            return Err(SchemaError::NoColumns {
                type_name: type_name.to_string(),
            });
        }

        for idx in &indexes {
            if idx.columns.is_empty() {
                return Err(SchemaError::EmptyIndex {
                    table,
                    index: idx.name.clone(),
                });
            }
            if let Some(unknown) = idx
                .columns
                .iter()
                .find(|name| !columns.iter().any(|c| &c.name == *name))
            {
                return Err(SchemaError::UnknownIndexColumn {
                    table,
                    index: idx.name.clone(),
                    column: unknown.clone(),
                });
            }
        }

        Ok(Schema {
            table,
            columns,
            indexes,
        })
    }
}

/// Unwrap Option<T> to get the inner type and nullability.
pub fn unwrap_option(shape: &'static Shape) -> (&'static Shape, bool) {
    // Check if this is an Option type by looking at the type identifier
    if shape.decl_id == Option::<()>::SHAPE.decl_id {
        // Get the inner shape from the Option's inner field
        if let Some(inner) = shape.inner {
            return (inner, true);
        }
    }
    (shape, false)
}

// =============================================================================
// Attribute helpers
// =============================================================================

/// A field is persisted iff it carries at least one rowmap attribute.
fn is_persisted(field: &Field) -> bool {
    field.attributes.iter().any(|attr| attr.ns == Some("rowmap"))
}

/// Check if a field has a rowmap attribute.
fn field_has_attr(field: &Field, key: &str) -> bool {
    field
        .attributes
        .iter()
        .any(|attr| attr.ns == Some("rowmap") && attr.key == key)
}

/// Get a string value from a rowmap attribute on a field.
fn field_get_attr_str(field: &Field, key: &str) -> Option<&'static str> {
    field.attributes.iter().find_map(|attr| {
        if attr.ns == Some("rowmap") && attr.key == key {
            attr.get_as::<&str>().copied()
        } else {
            None
        }
    })
}

/// Map a Rust type to a SQL type.
///
/// Takes a Shape to properly handle generic types like `Vec<u8>`.
pub fn shape_to_sql_type(shape: &Shape) -> Option<SqlType> {
    if shape == <Vec<u8>>::SHAPE {
        return Some(SqlType::Bytea);
    }

    // Integers: SmallInt (2 bytes)
    if shape == i8::SHAPE || shape == u8::SHAPE || shape == i16::SHAPE {
        Some(SqlType::SmallInt)
    // Integers: Integer (4 bytes)
    } else if shape == u16::SHAPE || shape == i32::SHAPE {
        Some(SqlType::Integer)
    // Integers: BigInt (8 bytes)
    } else if shape == u32::SHAPE || shape == i64::SHAPE || shape == u64::SHAPE {
        Some(SqlType::BigInt)
    // Floats
    } else if shape == f32::SHAPE {
        Some(SqlType::Real)
    } else if shape == f64::SHAPE {
        Some(SqlType::DoublePrecision)
    } else if shape == bool::SHAPE {
        Some(SqlType::Boolean)
    } else if shape == String::SHAPE {
        Some(SqlType::Text)
    } else {
        None
    }
}
