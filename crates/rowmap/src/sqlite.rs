//! [`Executor`] for `rusqlite` connections.
//!
//! SQLite has five storage classes, so values widen on the way back: every
//! integer comes back as `I64` and every float as `F64`. The record lens
//! narrows them again with range checks.

use rusqlite::types::{Value as SqliteValue, ValueRef};
use rusqlite::{Connection, params_from_iter};
use rowmap_sql::Value;

use crate::executor::{DriverError, Executor, Row};

impl Executor for Connection {
    fn execute(&mut self, sql: &str, params: &[Value]) -> Result<u64, DriverError> {
        let affected = Connection::execute(self, sql, params_from_iter(params.iter().map(to_sqlite)))?;
        Ok(affected as u64)
    }

    fn query_one(&mut self, sql: &str, params: &[Value]) -> Result<Option<Row>, DriverError> {
        let mut stmt = self.prepare(sql)?;
        let names: Vec<String> = stmt.column_names().into_iter().map(str::to_owned).collect();
        let mut rows = stmt.query(params_from_iter(params.iter().map(to_sqlite)))?;

        let Some(row) = rows.next()? else {
            return Ok(None);
        };
        let mut out = Vec::with_capacity(names.len());
        for (idx, name) in names.into_iter().enumerate() {
            out.push((name, from_sqlite(row.get_ref(idx)?)));
        }
        Ok(Some(out))
    }
}

fn to_sqlite(value: &Value) -> SqliteValue {
    match value {
        Value::Null => SqliteValue::Null,
        Value::Bool(v) => SqliteValue::Integer(i64::from(*v)),
        Value::I16(v) => SqliteValue::Integer(i64::from(*v)),
        Value::I32(v) => SqliteValue::Integer(i64::from(*v)),
        Value::I64(v) => SqliteValue::Integer(*v),
        Value::F32(v) => SqliteValue::Real(f64::from(*v)),
        Value::F64(v) => SqliteValue::Real(*v),
        Value::String(v) => SqliteValue::Text(v.clone()),
        Value::Bytes(v) => SqliteValue::Blob(v.clone()),
    }
}

fn from_sqlite(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(v) => Value::I64(v),
        ValueRef::Real(v) => Value::F64(v),
        ValueRef::Text(v) => Value::String(String::from_utf8_lossy(v).into_owned()),
        ValueRef::Blob(v) => Value::Bytes(v.to_vec()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_execute_and_query_one() {
        let mut conn = Connection::open_in_memory().unwrap();
        Executor::execute(
            &mut conn,
            "CREATE TABLE item (id BIGINT NOT NULL, label TEXT, data BYTEA)",
            &[],
        )
        .unwrap();

        let affected = Executor::execute(
            &mut conn,
            "INSERT INTO item (id,label,data) VALUES(?,?,?)",
            &[Value::I32(3), Value::Null, Value::Bytes(vec![0, 1, 2])],
        )
        .unwrap();
        assert_eq!(affected, 1);

        let row = Executor::query_one(&mut conn, "SELECT * FROM item WHERE id = ?", &[Value::I64(3)])
            .unwrap()
            .unwrap();
        assert_eq!(
            row,
            vec![
                ("id".to_string(), Value::I64(3)),
                ("label".to_string(), Value::Null),
                ("data".to_string(), Value::Bytes(vec![0, 1, 2])),
            ]
        );

        let missing =
            Executor::query_one(&mut conn, "SELECT * FROM item WHERE id = ?", &[Value::I64(4)])
                .unwrap();
        assert_eq!(missing, None);
    }

    #[test]
    fn test_driver_error_passes_through() {
        let mut conn = Connection::open_in_memory().unwrap();
        let err = Executor::execute(&mut conn, "INSERT INTO nowhere VALUES(?)", &[Value::I64(1)])
            .unwrap_err();
        assert!(err.downcast_ref::<rusqlite::Error>().is_some());
    }
}
