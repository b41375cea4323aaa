use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use facet::Facet;
use rowmap::{Constraint, Registry, SchemaError};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

#[derive(Debug, Default, Facet)]
struct User {
    #[facet(rowmap::pk)]
    id: i64,
    #[facet(rowmap::column)]
    name: String,
    #[facet(rowmap::column)]
    age: i32,
}

#[derive(Debug, Default, Facet)]
#[facet(rowmap::composite_index(columns = "org_id,handle"))]
struct Account {
    #[facet(rowmap::pk, rowmap::column = "account_id")]
    id: i64,
    #[facet(rowmap::column)]
    org_id: i32,
    #[facet(rowmap::unique, rowmap::sql_type = "VARCHAR(64)")]
    handle: String,
    #[facet(rowmap::index)]
    email: Option<String>,
    #[facet(rowmap::index = "account_score")]
    score: Option<f64>,
    #[facet(rowmap::not_null)]
    flags: u8,
    cache: Vec<String>,
}

#[derive(Debug, Facet)]
struct Unsupported {
    #[facet(rowmap::pk)]
    id: i64,
    #[facet(rowmap::column)]
    tags: Vec<String>,
}

#[derive(Debug, Facet)]
struct Duplicate {
    #[facet(rowmap::pk)]
    id: i64,
    #[facet(rowmap::column = "id")]
    other_id: i64,
}

#[derive(Debug, Facet)]
#[facet(rowmap::composite_index(columns = "a,missing"))]
struct BadIndex {
    #[facet(rowmap::pk)]
    a: i64,
}

#[derive(Debug, Facet)]
struct Bare {
    id: i64,
}

#[test]
fn test_user_schema() {
    let registry = Registry::new();
    let schema = registry.resolve::<User>().unwrap();

    assert_eq!(schema.table, "user");
    let names: Vec<&str> = schema.columns.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["id", "name", "age"]);

    let types: Vec<&str> = schema.columns.iter().map(|c| c.data_type.as_str()).collect();
    assert_eq!(types, ["BIGINT", "TEXT", "INTEGER"]);

    let id = schema.column("id").unwrap();
    assert!(id.is_primary_key());
    assert_eq!(id.constraint, Constraint::PRIMARY_KEY | Constraint::NOT_NULL);
    assert!(!id.nullable);

    let keys: Vec<&str> = schema.primary_keys().map(|c| c.name.as_str()).collect();
    assert_eq!(keys, ["id"]);
    let others: Vec<&str> = schema.non_keys().map(|c| c.name.as_str()).collect();
    assert_eq!(others, ["name", "age"]);
    assert!(schema.indexes.is_empty());
}

#[test]
fn test_account_schema() {
    let registry = Registry::new();
    let schema = registry.resolve::<Account>().unwrap();

    assert_eq!(schema.table, "account");

    // `cache` carries no rowmap attribute and is not a column.
    let names: Vec<&str> = schema.columns.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(
        names,
        ["account_id", "org_id", "handle", "email", "score", "flags"]
    );

    let id = schema.column("account_id").unwrap();
    assert_eq!(id.field.name, "id");
    assert_eq!(id.field.index, 0);

    let handle = schema.column("handle").unwrap();
    assert_eq!(handle.data_type, "VARCHAR(64)");
    assert_eq!(handle.constraint, Constraint::UNIQUE | Constraint::NOT_NULL);

    let email = schema.column("email").unwrap();
    assert_eq!(email.data_type, "TEXT");
    assert!(email.nullable);
    assert_eq!(email.constraint, Constraint::empty());
    assert_eq!(email.field.index, 3);

    let score = schema.column("score").unwrap();
    assert_eq!(score.data_type, "DOUBLE PRECISION");
    assert!(score.nullable);

    let flags = schema.column("flags").unwrap();
    assert_eq!(flags.data_type, "SMALLINT");
    assert_eq!(flags.constraint, Constraint::NOT_NULL);

    let indexes: Vec<(&str, Vec<&str>)> = schema
        .indexes
        .iter()
        .map(|i| {
            (
                i.name.as_str(),
                i.columns.iter().map(String::as_str).collect(),
            )
        })
        .collect();
    assert_eq!(
        indexes,
        [
            ("idx_account_org_id_handle", vec!["org_id", "handle"]),
            ("idx_account_email", vec!["email"]),
            ("account_score", vec!["score"]),
        ]
    );
}

#[test]
fn test_unsupported_field_type() {
    let err = Registry::new().resolve::<Unsupported>().unwrap_err();
    assert!(
        matches!(
            err,
            SchemaError::UnsupportedType { ref type_name, ref field, .. }
                if type_name == "Unsupported" && field == "tags"
        ),
        "{err:?}"
    );
}

#[test]
fn test_duplicate_column() {
    let err = Registry::new().resolve::<Duplicate>().unwrap_err();
    assert_eq!(
        err,
        SchemaError::DuplicateColumn {
            table: "duplicate".to_string(),
            column: "id".to_string(),
        }
    );
}

#[test]
fn test_unknown_index_column() {
    let err = Registry::new().resolve::<BadIndex>().unwrap_err();
    assert_eq!(
        err,
        SchemaError::UnknownIndexColumn {
            table: "badindex".to_string(),
            index: "idx_badindex_a_missing".to_string(),
            column: "missing".to_string(),
        }
    );
}

#[test]
fn test_no_columns() {
    let err = Registry::new().resolve::<Bare>().unwrap_err();
    assert_eq!(
        err,
        SchemaError::NoColumns {
            type_name: "Bare".to_string(),
        }
    );
}

#[test]
fn test_resolution_is_cached() {
    let registry = Registry::new();
    assert!(registry.is_empty());

    let first = registry.resolve::<User>().unwrap();
    let second = registry.resolve::<User>().unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(registry.len(), 1);

    registry.resolve::<Account>().unwrap();
    assert_eq!(registry.len(), 2);

    registry.clear();
    assert!(registry.is_empty());

    // A fresh derivation is structurally identical.
    let third = registry.resolve::<User>().unwrap();
    assert!(!Arc::ptr_eq(&first, &third));
    assert_eq!(*first, *third);
}

#[test]
fn test_failures_are_not_cached() {
    let registry = Registry::new();
    assert!(registry.resolve::<Bare>().is_err());
    assert!(registry.resolve::<Bare>().is_err());
    assert!(registry.is_empty());
}

#[test]
fn test_concurrent_first_use_has_one_winner() {
    let registry = Registry::new();

    let schemas: Vec<Arc<rowmap::Schema>> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| scope.spawn(|| registry.resolve::<Account>().unwrap()))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(registry.len(), 1);
    let cached = registry.resolve::<Account>().unwrap();
    for schema in &schemas {
        assert!(Arc::ptr_eq(schema, &cached));
    }
}

#[test]
fn test_global_registry() {
    let a = rowmap::schema::<User>().unwrap();
    let b = Registry::global().resolve::<User>().unwrap();
    assert!(Arc::ptr_eq(&a, &b));
}

/// Counts every event that reaches the subscriber.
struct EventCounter(Arc<AtomicUsize>);

impl<S: tracing::Subscriber> Layer<S> for EventCounter {
    fn on_event(&self, _event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

#[test]
fn test_schema_derivation_is_silent() {
    let events = Arc::new(AtomicUsize::new(0));
    let subscriber = tracing_subscriber::registry().with(EventCounter(events.clone()));

    tracing::subscriber::with_default(subscriber, || {
        let registry = Registry::new();
        let schema = registry.resolve::<Account>().unwrap();
        registry.resolve::<Account>().unwrap();
        assert!(registry.resolve::<Bare>().is_err());
        rowmap::statement::create_table(&schema).unwrap();
    });

    assert_eq!(events.load(Ordering::SeqCst), 0);
}
