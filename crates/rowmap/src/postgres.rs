//! [`Executor`] for synchronous `postgres` clients.
//!
//! Postgres is strictly typed on the wire: a parameter must be encoded at
//! exactly the width of the column it is compared with or assigned to.
//! [`SqlParam`] coerces integers and floats to the type the server asks for,
//! so a `u8` field (bound as `I16`) can still be written to an `INTEGER`
//! column declared with `rowmap::sql_type`.

use bytes::BytesMut;
use postgres::types::{IsNull, ToSql, Type, to_sql_checked};
use postgres::{Client, Row as PgRow};
use rowmap_sql::{Placeholder, Value};

use crate::executor::{DriverError, Executor, Row};

/// Wrapper to implement ToSql for Value references.
#[derive(Debug)]
pub struct SqlParam<'a>(pub &'a Value);

impl ToSql for SqlParam<'_> {
    fn to_sql(
        &self,
        ty: &Type,
        out: &mut BytesMut,
    ) -> Result<IsNull, Box<dyn std::error::Error + Sync + Send>> {
        match self.0 {
            Value::Null => Ok(IsNull::Yes),
            Value::Bool(v) => v.to_sql(ty, out),
            Value::I16(v) => integer_to_sql(i64::from(*v), ty, out),
            Value::I32(v) => integer_to_sql(i64::from(*v), ty, out),
            Value::I64(v) => integer_to_sql(*v, ty, out),
            Value::F32(v) if *ty == Type::FLOAT8 => f64::from(*v).to_sql(ty, out),
            Value::F32(v) => v.to_sql(ty, out),
            Value::F64(v) if *ty == Type::FLOAT4 => (*v as f32).to_sql(ty, out),
            Value::F64(v) => v.to_sql(ty, out),
            Value::String(v) => v.to_sql(ty, out),
            Value::Bytes(v) => v.to_sql(ty, out),
        }
    }

    fn accepts(ty: &Type) -> bool {
        matches!(
            *ty,
            Type::BOOL
                | Type::INT2
                | Type::INT4
                | Type::INT8
                | Type::FLOAT4
                | Type::FLOAT8
                | Type::TEXT
                | Type::VARCHAR
                | Type::BPCHAR
                | Type::NAME
                | Type::BYTEA
        )
    }

    to_sql_checked!();
}

fn integer_to_sql(
    v: i64,
    ty: &Type,
    out: &mut BytesMut,
) -> Result<IsNull, Box<dyn std::error::Error + Sync + Send>> {
    match *ty {
        Type::INT2 => i16::try_from(v)?.to_sql(ty, out),
        Type::INT4 => i32::try_from(v)?.to_sql(ty, out),
        _ => v.to_sql(ty, out),
    }
}

impl Executor for Client {
    fn placeholder(&self) -> Placeholder {
        Placeholder::Dollar
    }

    fn execute(&mut self, sql: &str, params: &[Value]) -> Result<u64, DriverError> {
        let params: Vec<SqlParam<'_>> = params.iter().map(SqlParam).collect();
        let refs: Vec<&(dyn ToSql + Sync)> = params.iter().map(|p| p as _).collect();
        Ok(Client::execute(self, sql, &refs)?)
    }

    fn query_one(&mut self, sql: &str, params: &[Value]) -> Result<Option<Row>, DriverError> {
        let params: Vec<SqlParam<'_>> = params.iter().map(SqlParam).collect();
        let refs: Vec<&(dyn ToSql + Sync)> = params.iter().map(|p| p as _).collect();
        let Some(row) = Client::query_opt(self, sql, &refs)? else {
            return Ok(None);
        };
        Ok(Some(from_pg_row(&row)?))
    }
}

fn from_pg_row(row: &PgRow) -> Result<Row, DriverError> {
    row.columns()
        .iter()
        .enumerate()
        .map(|(idx, column)| {
            let value = match *column.type_() {
                Type::BOOL => row.try_get::<_, Option<bool>>(idx)?.map(Value::Bool),
                Type::INT2 => row.try_get::<_, Option<i16>>(idx)?.map(Value::I16),
                Type::INT4 => row.try_get::<_, Option<i32>>(idx)?.map(Value::I32),
                Type::INT8 => row.try_get::<_, Option<i64>>(idx)?.map(Value::I64),
                Type::FLOAT4 => row.try_get::<_, Option<f32>>(idx)?.map(Value::F32),
                Type::FLOAT8 => row.try_get::<_, Option<f64>>(idx)?.map(Value::F64),
                Type::TEXT | Type::VARCHAR | Type::BPCHAR | Type::NAME => {
                    row.try_get::<_, Option<String>>(idx)?.map(Value::String)
                }
                Type::BYTEA => row.try_get::<_, Option<Vec<u8>>>(idx)?.map(Value::Bytes),
                ref other => {
                    return Err(format!(
                        "unsupported postgres type {other} for column `{}`",
                        column.name()
                    )
                    .into());
                }
            };
            Ok((column.name().to_string(), value.unwrap_or(Value::Null)))
        })
        .collect()
}
