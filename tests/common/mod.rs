#![allow(dead_code)]

use memo_schema::db::connect_db;
use memo_schema::entity::{memo, memo_tag_relation, tag, user};
use memo_schema::{AppConfig, SchemaVariant};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, PaginatorTrait, Set};
use tempfile::TempDir;

pub struct TestDb {
    pub db: DatabaseConnection,
    pub dir: TempDir,
}

impl TestDb {
    pub fn config(&self, variant: SchemaVariant) -> AppConfig {
        let mut config = AppConfig::sqlite(self.dir.path().join("memo.sqlite").display().to_string());
        config.schema_variant = variant;
        config
    }
}

pub async fn setup(variant: SchemaVariant) -> TestDb {
    let dir = tempfile::tempdir().unwrap();
    let mut config = AppConfig::sqlite(dir.path().join("memo.sqlite").display().to_string());
    config.schema_variant = variant;
    let db = connect_db(&config).await.unwrap();
    TestDb { db, dir }
}

pub async fn insert_user(db: &DatabaseConnection, name: &str, code: &str) -> user::Model {
    user::ActiveModel {
        name: Set(name.to_string()),
        code: Set(code.to_string()),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
}

pub async fn insert_memo(db: &DatabaseConnection, user_id: i32, title: &str) -> memo::Model {
    memo::ActiveModel {
        user_id: Set(user_id),
        title: Set(title.to_string()),
        content: Set(format!("{} body", title)),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
}

pub async fn insert_tag(db: &DatabaseConnection, active: tag::ActiveModel) -> tag::Model {
    active.insert(db).await.unwrap()
}

pub async fn attach(db: &DatabaseConnection, memo_id: i32, tag_id: i32) -> memo_tag_relation::Model {
    memo_tag_relation::ActiveModel {
        memo_id: Set(memo_id),
        tag_id: Set(tag_id),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
}

pub async fn count<E>(db: &DatabaseConnection) -> u64
where
    E: EntityTrait,
    E::Model: Sync,
{
    E::find().count(db).await.unwrap()
}
