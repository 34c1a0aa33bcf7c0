mod common;

use common::setup;
use memo_schema::catalog;
use memo_schema::db::connect_db;
use memo_schema::schema::{
    detect_variant, init_schema, schema_exists, schema_state, statements, SchemaState,
};
use memo_schema::{AppConfig, SchemaVariant};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, DbBackend, Statement};

async fn pragma(db: &DatabaseConnection, sql: String) -> Vec<sea_orm::QueryResult> {
    db.query_all(Statement::from_string(DbBackend::Sqlite, sql))
        .await
        .unwrap()
}

#[tokio::test]
async fn init_schema_is_idempotent() {
    let t = setup(SchemaVariant::UniqueTagName).await;

    assert!(schema_exists(&t.db).await.unwrap());
    assert!(!init_schema(&t.db, SchemaVariant::UniqueTagName).await.unwrap());

    let reopened = connect_db(&t.config(SchemaVariant::UniqueTagName)).await.unwrap();
    assert!(schema_exists(&reopened).await.unwrap());
}

#[tokio::test]
async fn detects_the_variant_it_was_created_with() {
    let canonical = setup(SchemaVariant::UniqueTagName).await;
    assert_eq!(
        detect_variant(&canonical.db).await.unwrap(),
        SchemaVariant::UniqueTagName
    );

    let basic = setup(SchemaVariant::Basic).await;
    assert_eq!(detect_variant(&basic.db).await.unwrap(), SchemaVariant::Basic);
}

#[tokio::test]
async fn reopening_with_other_variant_leaves_schema_alone() {
    let t = setup(SchemaVariant::Basic).await;

    let reopened = connect_db(&t.config(SchemaVariant::UniqueTagName)).await.unwrap();
    assert_eq!(detect_variant(&reopened).await.unwrap(), SchemaVariant::Basic);
}

#[tokio::test]
async fn tables_without_trigger_are_completed_on_connect() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("memo.sqlite");
    std::fs::File::create(&path).unwrap();

    let raw = Database::connect(format!("sqlite://{}", path.display())).await.unwrap();
    assert_eq!(schema_state(&raw).await.unwrap(), SchemaState::Absent);
    for stmt in statements(DbBackend::Sqlite, SchemaVariant::UniqueTagName)
        .unwrap()
        .iter()
        .filter(|s| s.starts_with("CREATE TABLE"))
    {
        raw.execute_unprepared(stmt).await.unwrap();
    }
    assert_eq!(
        schema_state(&raw).await.unwrap(),
        SchemaState::Partial {
            missing: vec!["memo_touch_updated_at"]
        }
    );
    assert!(!schema_exists(&raw).await.unwrap());
    drop(raw);

    let db = connect_db(&AppConfig::sqlite(path.display().to_string())).await.unwrap();
    assert_eq!(schema_state(&db).await.unwrap(), SchemaState::Complete);
    assert_eq!(detect_variant(&db).await.unwrap(), SchemaVariant::UniqueTagName);
    let triggers = pragma(
        &db,
        "SELECT name FROM sqlite_master WHERE type = 'trigger'".to_string(),
    )
    .await;
    assert_eq!(triggers.len(), 1);
}

#[tokio::test]
async fn catalog_matches_live_columns() {
    let t = setup(SchemaVariant::UniqueTagName).await;

    for table in catalog::tables(SchemaVariant::UniqueTagName) {
        let rows = pragma(&t.db, format!("PRAGMA table_info(\"{}\")", table.name)).await;
        assert_eq!(rows.len(), table.fields.len(), "column count of {}", table.name);

        for (row, field) in rows.iter().zip(&table.fields) {
            let name: String = row.try_get("", "name").unwrap();
            let notnull: i32 = row.try_get("", "notnull").unwrap();
            let pk: i32 = row.try_get("", "pk").unwrap();
            assert_eq!(name, field.name, "column order of {}", table.name);
            assert_eq!(notnull == 0, field.is_null, "{}.{} nullability", table.name, field.name);
            assert_eq!(pk == 1, field.primary_key, "{}.{} primary key", table.name, field.name);
        }
    }
}

#[tokio::test]
async fn catalog_matches_live_foreign_keys() {
    let t = setup(SchemaVariant::UniqueTagName).await;

    for table in catalog::tables(SchemaVariant::UniqueTagName) {
        let rows = pragma(&t.db, format!("PRAGMA foreign_key_list(\"{}\")", table.name)).await;
        let mut live = rows
            .iter()
            .map(|row| {
                let from: String = row.try_get("", "from").unwrap();
                let target: String = row.try_get("", "table").unwrap();
                let on_delete: String = row.try_get("", "on_delete").unwrap();
                (from, target, on_delete)
            })
            .collect::<Vec<_>>();
        live.sort();

        let mut declared = table
            .fields
            .iter()
            .filter_map(|f| {
                f.relation.as_ref().map(|r| {
                    (f.name.to_string(), r.table.to_string(), r.on_delete.to_string())
                })
            })
            .collect::<Vec<_>>();
        declared.sort();

        assert_eq!(live, declared, "foreign keys of {}", table.name);
    }
}
