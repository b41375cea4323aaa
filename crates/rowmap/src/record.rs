//! Record lens: reads column values out of a record and scans rows back in.
//!
//! Both directions go through facet reflection, driven by the [`FieldRef`]s
//! stored in the schema. The set of supported field types is closed (see
//! [`ColumnValue`]); the schema extractor rejects anything else up front.
//!
//! [`FieldRef`]: rowmap_schema::FieldRef

use facet::{Facet, Shape, StructKind, Type, UserType};
use facet_reflect::Peek;
use rowmap_schema::{Column, Schema, unwrap_option};
use rowmap_sql::Value;

use crate::error::{Error, ScanError, ValueError};
use crate::executor::Row;
use crate::Result;

/// Conversion between a field type and a bind [`Value`].
pub trait ColumnValue: Sized {
    /// Convert the field value into a bind value.
    fn to_value(&self) -> Result<Value, ValueError>;

    /// Convert a result value into the field type.
    fn from_value(value: Value) -> Result<Self, ValueError>;
}

macro_rules! int_column_value {
    ($($t:ty => $variant:ident($wide:ty)),* $(,)?) => {$(
        impl ColumnValue for $t {
            fn to_value(&self) -> Result<Value, ValueError> {
                <$wide>::try_from(*self)
                    .map(Value::$variant)
                    .map_err(|_| ValueError::OutOfRange {
                        expected: stringify!($wide),
                        value: self.to_string(),
                    })
            }

            fn from_value(value: Value) -> Result<Self, ValueError> {
                let wide = integer(value, stringify!($t))?;
                <$t>::try_from(wide).map_err(|_| ValueError::OutOfRange {
                    expected: stringify!($t),
                    value: wide.to_string(),
                })
            }
        }
    )*};
}

// Unsigned types bind as the next wider signed type, matching the DDL types
// the extractor infers for them.
int_column_value! {
    i8 => I16(i16),
    u8 => I16(i16),
    i16 => I16(i16),
    u16 => I32(i32),
    i32 => I32(i32),
    u32 => I64(i64),
    i64 => I64(i64),
    u64 => I64(i64),
}

fn integer(value: Value, expected: &'static str) -> Result<i64, ValueError> {
    match value {
        Value::I16(v) => Ok(v.into()),
        Value::I32(v) => Ok(v.into()),
        Value::I64(v) => Ok(v),
        Value::Null => Err(ValueError::UnexpectedNull),
        other => Err(ValueError::TypeMismatch {
            expected,
            found: other.kind(),
        }),
    }
}

impl ColumnValue for bool {
    fn to_value(&self) -> Result<Value, ValueError> {
        Ok(Value::Bool(*self))
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Bool(b) => Ok(b),
            // SQLite has no boolean storage class.
            Value::I16(_) | Value::I32(_) | Value::I64(_) => match integer(value, "bool")? {
                0 => Ok(false),
                1 => Ok(true),
                other => Err(ValueError::OutOfRange {
                    expected: "bool",
                    value: other.to_string(),
                }),
            },
            Value::Null => Err(ValueError::UnexpectedNull),
            other => Err(ValueError::TypeMismatch {
                expected: "bool",
                found: other.kind(),
            }),
        }
    }
}

impl ColumnValue for f32 {
    fn to_value(&self) -> Result<Value, ValueError> {
        Ok(Value::F32(*self))
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::F32(v) => Ok(v),
            Value::F64(v) if v.is_finite() && v.abs() > f64::from(f32::MAX) => {
                Err(ValueError::OutOfRange {
                    expected: "f32",
                    value: v.to_string(),
                })
            }
            Value::F64(v) => Ok(v as f32),
            Value::Null => Err(ValueError::UnexpectedNull),
            other => Err(ValueError::TypeMismatch {
                expected: "f32",
                found: other.kind(),
            }),
        }
    }
}

impl ColumnValue for f64 {
    fn to_value(&self) -> Result<Value, ValueError> {
        Ok(Value::F64(*self))
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::F64(v) => Ok(v),
            Value::F32(v) => Ok(v.into()),
            Value::Null => Err(ValueError::UnexpectedNull),
            other => Err(ValueError::TypeMismatch {
                expected: "f64",
                found: other.kind(),
            }),
        }
    }
}

impl ColumnValue for String {
    fn to_value(&self) -> Result<Value, ValueError> {
        Ok(Value::String(self.clone()))
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::String(s) => Ok(s),
            Value::Null => Err(ValueError::UnexpectedNull),
            other => Err(ValueError::TypeMismatch {
                expected: "String",
                found: other.kind(),
            }),
        }
    }
}

impl ColumnValue for Vec<u8> {
    fn to_value(&self) -> Result<Value, ValueError> {
        Ok(Value::Bytes(self.clone()))
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Bytes(b) => Ok(b),
            Value::Null => Err(ValueError::UnexpectedNull),
            other => Err(ValueError::TypeMismatch {
                expected: "Vec<u8>",
                found: other.kind(),
            }),
        }
    }
}

impl<T: ColumnValue> ColumnValue for Option<T> {
    fn to_value(&self) -> Result<Value, ValueError> {
        match self {
            Some(v) => v.to_value(),
            None => Ok(Value::Null),
        }
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

/// Run `$body` with `$t` aliased to the [`ColumnValue`] type whose shape is
/// `$shape`, or evaluate `$fallback` if there is none.
macro_rules! with_column_type {
    ($shape:expr, |$t:ident| $body:expr, else $fallback:expr) => {{
        let shape: &Shape = $shape;
        with_column_type!(@chain shape, $t, $body, $fallback;
            bool, i8, i16, i32, i64, u8, u16, u32, u64, f32, f64, String, Vec<u8>)
    }};
    (@chain $shape:ident, $t:ident, $body:expr, $fallback:expr; $($ty:ty),*) => {
        $(if $shape == <$ty>::SHAPE {
            type $t = $ty;
            $body
        } else)* {
            $fallback
        }
    };
}

/// Read every column's current field value, in schema column order.
pub fn column_values<T: Facet<'static>>(schema: &Schema, record: &T) -> Result<Vec<Value>> {
    let fields = Peek::new(record)
        .into_struct()
        .map_err(|e| Error::Reflect(e.to_string()))?;

    schema
        .columns
        .iter()
        .map(|column| {
            let field = fields
                .field(column.field.index)
                .map_err(|e| Error::Reflect(format!("column `{}`: {e}", column.name)))?;
            let (inner, _) = unwrap_option(column.field.shape);
            with_column_type!(inner, |V| {
                if column.nullable {
                    read_field::<Option<V>>(field, column)
                } else {
                    read_field::<V>(field, column)
                }
            }, else Err(Error::Reflect(unsupported(column))))
        })
        .collect()
}

fn read_field<V: ColumnValue + Facet<'static>>(field: Peek<'_, 'static>, column: &Column) -> Result<Value> {
    let value = field
        .get::<V>()
        .map_err(|e| Error::Reflect(format!("column `{}`: {e}", column.name)))?;
    value.to_value().map_err(|source| Error::Bind {
        column: column.name.clone(),
        source,
    })
}

/// Copy a result row into `record`, matching row columns to schema columns
/// by name.
///
/// Only column fields are written; every other field keeps its current value.
/// All columns are converted before anything is written, so on error `record`
/// is left untouched.
pub fn scan_into<T: Facet<'static>>(
    schema: &Schema,
    row: &Row,
    record: &mut T,
) -> Result<(), ScanError> {
    let struct_def = match &T::SHAPE.ty {
        Type::User(UserType::Struct(s)) if s.kind == StructKind::Struct => s,
        _ => {
            return Err(ScanError::Reflect(format!(
                "cannot scan into {}: not a struct with named fields",
                T::SHAPE
            )));
        }
    };

    let mut pending = Vec::with_capacity(schema.columns.len());
    for column in &schema.columns {
        let field = struct_def
            .fields
            .get(column.field.index)
            .filter(|field| field.name == column.field.name && field.shape() == column.field.shape)
            .ok_or_else(|| {
                ScanError::Reflect(format!(
                    "column `{}` does not map to a field of {}",
                    column.name,
                    T::SHAPE
                ))
            })?;

        let value = row
            .iter()
            .find(|(name, _)| *name == column.name)
            .map(|(_, value)| value.clone())
            .ok_or_else(|| ScanError::MissingColumn {
                column: column.name.clone(),
            })?;

        pending.push((field.offset, convert_column(column, value)?));
    }

    let base = (record as *mut T).cast::<u8>();
    for (offset, write) in pending {
        // SAFETY: `offset` is the offset of a field of `T` whose shape matches
        // the converted value's type, and `base` comes from a live `&mut T`.
        unsafe { write.write(base.add(offset)) };
    }
    Ok(())
}

/// A converted column value waiting to be stored in its field.
trait FieldWrite {
    /// Replace the value at `dst`, dropping the old one.
    ///
    /// # Safety
    ///
    /// `dst` must point to an initialized, aligned value of the written type.
    unsafe fn write(self: Box<Self>, dst: *mut u8);
}

struct Converted<W>(W);

impl<W> FieldWrite for Converted<W> {
    unsafe fn write(self: Box<Self>, dst: *mut u8) {
        unsafe { *dst.cast::<W>() = self.0 };
    }
}

fn convert_column(column: &Column, value: Value) -> Result<Box<dyn FieldWrite>, ScanError> {
    let (inner, _) = unwrap_option(column.field.shape);
    with_column_type!(inner, |V| {
        if column.nullable {
            convert::<Option<V>>(column, value)
        } else {
            convert::<V>(column, value)
        }
    }, else Err(ScanError::Reflect(unsupported(column))))
}

fn convert<W: ColumnValue + Facet<'static> + 'static>(
    column: &Column,
    value: Value,
) -> Result<Box<dyn FieldWrite>, ScanError> {
    if column.field.shape != W::SHAPE {
        return Err(ScanError::Reflect(format!(
            "column `{}`: field is {}, not {}",
            column.name,
            column.field.shape,
            W::SHAPE
        )));
    }
    let value = W::from_value(value).map_err(|e| e.for_column(&column.name))?;
    Ok(Box::new(Converted(value)))
}

fn unsupported(column: &Column) -> String {
    format!(
        "column `{}` has unsupported field type {}",
        column.name, column.field.shape
    )
}
