//! Requires a reachable server: `POSTGRES_URL=postgres://... cargo test --features test-postgres`
#![cfg(feature = "test-postgres")]

use facet::Facet;
use postgres::{Client, NoTls};
use rowmap::{Error, Executor, Placeholder, Traced};

#[derive(Debug, Default, Clone, PartialEq, Facet)]
struct Gadget {
    #[facet(rowmap::pk)]
    id: i64,
    #[facet(rowmap::column)]
    name: String,
    #[facet(rowmap::column)]
    weight: f32,
    #[facet(rowmap::column)]
    price: f64,
    #[facet(rowmap::column)]
    stock: u16,
    #[facet(rowmap::sql_type = "INTEGER")]
    shelf: u8,
    #[facet(rowmap::column)]
    active: bool,
    #[facet(rowmap::column)]
    firmware: Vec<u8>,
    #[facet(rowmap::index)]
    notes: Option<String>,
}

fn connect() -> Client {
    let url = std::env::var("POSTGRES_URL").expect("POSTGRES_URL must be set");
    let mut client = Client::connect(&url, NoTls).unwrap();
    client
        .batch_execute("DROP TABLE IF EXISTS gadget CASCADE")
        .unwrap();
    client
}

fn gadget() -> Gadget {
    Gadget {
        id: 1,
        name: "sprocket".to_string(),
        weight: 1.5,
        price: 9.99,
        stock: 40_000,
        shelf: 12,
        active: true,
        firmware: vec![1, 2, 3],
        notes: None,
    }
}

#[test]
fn test_crud_round_trip() {
    let mut client = connect();
    assert_eq!(client.placeholder(), Placeholder::Dollar);
    rowmap::create_table::<Gadget>(&mut client).unwrap();

    let mut record = gadget();
    assert_eq!(rowmap::insert(&mut client, &record).unwrap(), 1);

    let mut loaded = Gadget {
        id: 1,
        ..Default::default()
    };
    rowmap::query_row(&mut client, &mut loaded).unwrap();
    assert_eq!(loaded, record);

    record.notes = Some("fragile".to_string());
    record.stock = 7;
    assert_eq!(rowmap::update(&mut client, &record).unwrap(), 1);
    rowmap::query_row(&mut client, &mut loaded).unwrap();
    assert_eq!(loaded, record);

    assert_eq!(rowmap::delete(&mut client, &record).unwrap(), 1);
    let err = rowmap::query_row(&mut client, &mut loaded).unwrap_err();
    assert!(matches!(err, Error::NotFound { .. }), "{err:?}");

    // Same flow through the tracing wrapper; driver errors pass through.
    let mut db = Traced::new(client);
    rowmap::insert(&mut db, &record).unwrap();
    let err = rowmap::insert(&mut db, &record).unwrap_err();
    match err {
        Error::Driver(source) => assert!(source.downcast_ref::<postgres::Error>().is_some()),
        other => panic!("expected a driver error, got {other:?}"),
    }
}
