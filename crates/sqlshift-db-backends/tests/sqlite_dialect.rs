//! Runs the SQLite dialect's bookkeeping statements against a real database.
#![cfg(feature = "sqlite")]

use sqlshift_core::{Driver, ShiftError};
use sqlshift_db::dialect::{Dialect, SqlProvider};
use sqlshift_db::Value;
use sqlshift_db_backends::{connect, is_supported, DatabaseBackend, SqliteBackend};

fn at(h: u32, m: u32, s: u32) -> Value {
    Value::DateTime(
        chrono::NaiveDate::from_ymd_opt(2025, 11, 5)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap(),
    )
}

async fn setup() -> (SqliteBackend, Dialect) {
    let db = SqliteBackend::memory().unwrap();
    let dialect = Dialect::new(Driver::Sqlite, "schema_migrations").unwrap();
    db.execute_batch(&dialect.create_schema()).await.unwrap();
    (db, dialect)
}

// ── Connecting ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_connect_sqlite_memory() {
    let backend = connect(Driver::Sqlite, ":memory:").await.unwrap();
    assert_eq!(backend.vendor(), "sqlite");
    assert_eq!(backend.driver(), Driver::Sqlite);
}

#[tokio::test]
async fn test_connect_mssql_has_no_driver() {
    assert!(!is_supported(Driver::MsSql));
    let err = connect(Driver::MsSql, "sqlserver://localhost").await.err().unwrap();
    assert!(matches!(err, ShiftError::Connection(_)));
}

// ── Bookkeeping statements ────────────────────────────────────────────

#[tokio::test]
async fn test_create_schema_is_repeatable() {
    let (db, dialect) = setup().await;
    db.execute_batch(&dialect.create_schema()).await.unwrap();

    let tables = db.query(&dialect.show_tables(), &[]).await.unwrap();
    let names: Vec<String> = tables.iter().map(|r| r.get_by_index(0).unwrap()).collect();
    assert_eq!(names, vec!["schema_migrations".to_string()]);
}

#[tokio::test]
async fn test_insert_exists_update_cycle() {
    let (db, dialect) = setup().await;
    let version = Value::from("20251105-102430-add-age-index.sql");

    let exists = db.query_one(&dialect.query_exists(), &[version.clone()]).await.unwrap();
    assert!(!exists.get_by_index::<bool>(0).unwrap());

    db.execute(
        &dialect.insert_record(),
        &[version.clone(), Value::from("up"), at(10, 0, 0)],
    )
    .await
    .unwrap();

    let exists = db.query_one(&dialect.query_exists(), &[version.clone()]).await.unwrap();
    assert!(exists.get_by_index::<bool>(0).unwrap());

    db.execute(
        &dialect.update_record(),
        &[Value::from("down"), at(11, 0, 0), version.clone()],
    )
    .await
    .unwrap();

    let row = db.query_one(&dialect.query_one(), &[version.clone()]).await.unwrap();
    assert_eq!(row.get::<String>("status").unwrap(), "down");
    assert_eq!(
        row.get::<chrono::NaiveDateTime>("applied_at").unwrap().format("%H").to_string(),
        "11"
    );

    let status = db.query_one(&dialect.query_status(), &[version]).await.unwrap();
    assert_eq!(status.get::<String>("status").unwrap(), "down");
}

#[tokio::test]
async fn test_applied_sorted_by_date_orders_and_limits() {
    let (db, dialect) = setup().await;
    for (version, status, time) in [
        ("a.sql", "up", at(9, 0, 0)),
        ("b.sql", "up", at(12, 0, 0)),
        ("c.sql", "skip", at(13, 0, 0)),
        ("d.sql", "up", at(10, 0, 0)),
    ] {
        db.execute(
            &dialect.insert_record(),
            &[Value::from(version), Value::from(status), time],
        )
        .await
        .unwrap();
    }

    let rows = db
        .query(
            &dialect.applied_sorted_by_date(),
            &[Value::from("up"), Value::Int(2)],
        )
        .await
        .unwrap();
    let versions: Vec<String> = rows.iter().map(|r| r.get("version").unwrap()).collect();
    assert_eq!(versions, vec!["b.sql".to_string(), "d.sql".to_string()]);
}

#[tokio::test]
async fn test_table_schema_and_drop() {
    let (db, dialect) = setup().await;
    let columns = db
        .query(&dialect.query_table_schema("schema_migrations"), &[])
        .await
        .unwrap();
    let names: Vec<String> = columns.iter().map(|r| r.get("name").unwrap()).collect();
    assert_eq!(names, vec!["version", "applied_at", "status"]);

    db.execute_batch(&dialect.drop_schema()).await.unwrap();
    assert!(db.query(&dialect.show_tables(), &[]).await.unwrap().is_empty());
}
