use crate::*;

fn pk_eq(column: &str, value: impl Into<Value>) -> Expr {
    Expr::column(column.into()).eq(Expr::param(value))
}

#[test]
fn test_select_star_by_key() {
    let stmt = SelectStmt::new("user".into()).where_(pk_eq("id", 7i64));

    let result = render(&stmt);
    insta::assert_snapshot!(result.sql, @"SELECT * FROM user WHERE id = ?");
    assert_eq!(result.params, vec![Value::I64(7)]);
}

#[test]
fn test_select_composite_key_uses_and() {
    let condition = Expr::all([pk_eq("org_id", 1i64), pk_eq("user_id", 2i64)]).unwrap();
    let stmt = SelectStmt::new("membership".into()).where_(condition);

    let result = render(&stmt);
    insta::assert_snapshot!(
        result.sql,
        @"SELECT * FROM membership WHERE org_id = ? AND user_id = ?"
    );
    assert_eq!(result.params, vec![Value::I64(1), Value::I64(2)]);
}

#[test]
fn test_insert() {
    let stmt = InsertStmt::new("user".into())
        .column("id".into(), Expr::param(1i64))
        .column("name".into(), Expr::param("ada"))
        .column("age".into(), Expr::param(36i32));

    let result = render(&stmt);
    insta::assert_snapshot!(result.sql, @"INSERT INTO user (id,name,age) VALUES(?,?,?)");
    assert_eq!(
        result.params,
        vec![Value::I64(1), Value::from("ada"), Value::I32(36)]
    );
}

#[test]
fn test_update_binds_set_then_where() {
    let stmt = UpdateStmt::new("user".into())
        .set("name".into(), Expr::param("ada"))
        .set("age".into(), Expr::param(37i32))
        .where_(pk_eq("id", 1i64));

    let result = render(&stmt);
    insta::assert_snapshot!(result.sql, @"UPDATE user SET name = ?,age = ? WHERE id = ?");
    assert_eq!(
        result.params,
        vec![Value::from("ada"), Value::I32(37), Value::I64(1)]
    );
}

#[test]
fn test_delete() {
    let stmt = DeleteStmt::new("user".into()).where_(pk_eq("id", 1i64));

    let result = render(&stmt);
    insta::assert_snapshot!(result.sql, @"DELETE FROM user WHERE id = ?");
    assert_eq!(result.params, vec![Value::I64(1)]);
}

#[test]
fn test_dollar_placeholders_are_numbered_in_bind_order() {
    let stmt = UpdateStmt::new("user".into())
        .set("name".into(), Expr::param("ada"))
        .set("age".into(), Expr::param(37i32))
        .where_(pk_eq("id", 1i64));

    let result = render_with(&stmt, Placeholder::Dollar);
    insta::assert_snapshot!(result.sql, @"UPDATE user SET name = $1,age = $2 WHERE id = $3");
    assert_eq!(result.params.len(), 3);
}

#[test]
fn test_null_param_is_still_bound() {
    let stmt = InsertStmt::new("note".into())
        .column("id".into(), Expr::param(1i64))
        .column("body".into(), Expr::param(Option::<String>::None));

    let result = render(&stmt);
    assert_eq!(result.params, vec![Value::I64(1), Value::Null]);
}

#[test]
fn test_create_table() {
    let stmt = CreateTableStmt::new("user".into())
        .if_not_exists()
        .column("id".into(), "BIGINT", "NOT NULL")
        .column("name".into(), "TEXT", "NOT NULL UNIQUE")
        .column("bio".into(), "TEXT", "")
        .constraint(TableConstraint::PrimaryKey {
            name: "user_pk".to_string(),
            columns: vec!["id".into()],
        });

    let result = render(&stmt);
    insta::assert_snapshot!(result.sql, @r"
    CREATE TABLE IF NOT EXISTS user (
     id BIGINT NOT NULL,
     name TEXT NOT NULL UNIQUE,
     bio TEXT,
     CONSTRAINT user_pk PRIMARY KEY(id)
    )
    ");
    assert!(result.params.is_empty());
}

#[test]
fn test_create_table_composite_key() {
    let stmt = CreateTableStmt::new("membership".into())
        .if_not_exists()
        .column("org_id".into(), "BIGINT", "NOT NULL")
        .column("user_id".into(), "BIGINT", "NOT NULL")
        .constraint(TableConstraint::PrimaryKey {
            name: "membership_pk".to_string(),
            columns: vec!["org_id".into(), "user_id".into()],
        });

    let result = render(&stmt);
    assert!(
        result
            .sql
            .ends_with(" CONSTRAINT membership_pk PRIMARY KEY(org_id,user_id)\n)")
    );
}

#[test]
fn test_create_table_without_if_not_exists() {
    let stmt = CreateTableStmt::new("t".into()).column("a".into(), "INTEGER", "");

    let result = render(&stmt);
    assert_eq!(result.sql, "CREATE TABLE t (\n a INTEGER\n)");
}

#[test]
fn test_create_index() {
    let stmt = CreateIndexStmt::new("idx_user_name_age".into(), "user".into())
        .columns(["name".into(), "age".into()]);

    let result = render(&stmt);
    insta::assert_snapshot!(result.sql, @"CREATE INDEX idx_user_name_age ON user (name,age)");
}

#[test]
fn test_delete_without_condition() {
    let stmt = DeleteStmt::new("user".into());
    assert_eq!(render(&stmt).sql, "DELETE FROM user");
}

#[test]
fn test_expr_all() {
    assert!(Expr::all(Vec::new()).is_none());

    let expr = Expr::all([pk_eq("a", 1i64), pk_eq("b", 2i64), pk_eq("c", 3i64)])
        .expect("non-empty");
    let stmt = DeleteStmt::new("t".into()).where_(expr);
    assert_eq!(
        render(&stmt).sql,
        "DELETE FROM t WHERE a = ? AND b = ? AND c = ?"
    );
}
