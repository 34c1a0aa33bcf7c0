use log::{debug, info, warn};
use sea_orm::{ConnectionTrait, DbBackend, Statement, TransactionTrait};

use crate::error::AppError;

pub const UNIQ_CODE: &str = "uniq_code";
pub const UNIQ_TAG_NAME: &str = "uniq_tag_name";
pub const CHECK_TAG_OWNER: &str = "check_tag_owner";

const MYSQL_CHANGELOG: &str = include_str!("../changelog-mysql.sql");
const SQLITE_CHANGELOG: &str = include_str!("../changelog-sqlite.sql");
const STATEMENT_BREAKPOINT: &str = "--> statement-breakpoint";

const MYSQL_UNIQ_TAG_NAME: &str =
    "CREATE UNIQUE INDEX `uniq_tag_name` ON `tag` (`name`, `is_official`, `user_id`)";
const SQLITE_UNIQ_TAG_NAME: &str =
    "CREATE UNIQUE INDEX IF NOT EXISTS \"uniq_tag_name\" ON \"tag\" (\"name\", \"is_official\", \"user_id\")";

/// Objects every complete schema has, in creation order. The `uniq_tag_name`
/// index is left out since it depends on the variant.
const SQLITE_OBJECTS: &[SchemaObject] = &[
    SchemaObject::table("user"),
    SchemaObject::table("memo"),
    SchemaObject::table("tag"),
    SchemaObject::table("memo_tag_relation"),
    SchemaObject::trigger("memo_touch_updated_at"),
];

const MYSQL_OBJECTS: &[SchemaObject] = &[
    SchemaObject::table("user"),
    SchemaObject::table("memo"),
    SchemaObject::table("tag"),
    SchemaObject::table("memo_tag_relation"),
    SchemaObject::foreign_key("memo_user_id_user_id_fk"),
    SchemaObject::foreign_key("tag_user_id_user_id_fk"),
    SchemaObject::foreign_key("memo_tag_relation_memo_id_memo_id_fk"),
    SchemaObject::foreign_key("memo_tag_relation_tag_id_tag_id_fk"),
    SchemaObject::trigger("check_tag_owner_insert"),
    SchemaObject::trigger("check_tag_owner_update"),
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ObjectKind {
    Table,
    ForeignKey,
    Trigger,
}

#[derive(Clone, Copy, Debug)]
struct SchemaObject {
    kind: ObjectKind,
    name: &'static str,
}

impl SchemaObject {
    const fn table(name: &'static str) -> Self {
        Self { kind: ObjectKind::Table, name }
    }

    const fn foreign_key(name: &'static str) -> Self {
        Self { kind: ObjectKind::ForeignKey, name }
    }

    const fn trigger(name: &'static str) -> Self {
        Self { kind: ObjectKind::Trigger, name }
    }
}

/// How much of the changelog a live database already has.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SchemaState {
    Absent,
    Partial { missing: Vec<&'static str> },
    Complete,
}

/// The two published shapes of the schema. They differ only in whether
/// `tag` carries `uniq_tag_name (name, is_official, user_id)`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SchemaVariant {
    #[default]
    UniqueTagName,
    Basic,
}

impl SchemaVariant {
    pub fn from_flag(unique_tag_name: bool) -> Self {
        if unique_tag_name {
            Self::UniqueTagName
        } else {
            Self::Basic
        }
    }

    pub fn has_unique_tag_name(&self) -> bool {
        matches!(self, Self::UniqueTagName)
    }
}

/// Ordered DDL for `backend`. Only MySQL and SQLite are supported.
pub fn statements(backend: DbBackend, variant: SchemaVariant) -> Result<Vec<String>, AppError> {
    let (changelog, uniq_tag_name) = match backend {
        DbBackend::MySql => (MYSQL_CHANGELOG, MYSQL_UNIQ_TAG_NAME),
        DbBackend::Sqlite => (SQLITE_CHANGELOG, SQLITE_UNIQ_TAG_NAME),
        other => {
            return Err(AppError::Config(format!(
                "unsupported database backend: {:?}",
                other
            )))
        }
    };

    let mut stmts = split_sql(changelog);
    if variant.has_unique_tag_name() {
        stmts.push(uniq_tag_name.to_string());
    }
    Ok(stmts)
}

/// Splits a changelog on `--> statement-breakpoint` lines. Comment-only lines
/// are dropped and the trailing `;` of each statement is removed, so trigger
/// bodies keep their inner terminators.
pub fn split_sql(input: &str) -> Vec<String> {
    let mut stmts = Vec::new();
    let mut buf = String::new();
    for line in input.lines() {
        let trimmed = line.trim();
        if trimmed.starts_with(STATEMENT_BREAKPOINT) {
            flush_statement(&mut buf, &mut stmts);
            continue;
        }
        if trimmed.starts_with("--") || trimmed.is_empty() {
            continue;
        }
        buf.push_str(line);
        buf.push('\n');
    }
    flush_statement(&mut buf, &mut stmts);
    stmts
}

fn flush_statement(buf: &mut String, stmts: &mut Vec<String>) {
    let stmt = buf.trim().trim_end_matches(';').trim_end();
    if !stmt.is_empty() {
        stmts.push(stmt.to_string());
    }
    buf.clear();
}

/// Creates the schema unless it already exists. Returns whether anything ran.
///
/// SQLite applies the changelog in one transaction, and a partly present
/// schema is completed since every SQLite statement is `IF NOT EXISTS`.
/// MySQL commits each DDL statement on its own, so a partial schema there is
/// reported as [`AppError::IncompleteSchema`] and left for an operator.
pub async fn init_schema<C>(db: &C, variant: SchemaVariant) -> Result<bool, AppError>
where
    C: ConnectionTrait + TransactionTrait,
{
    let backend = db.get_database_backend();
    match schema_state(db).await? {
        SchemaState::Complete => {
            debug!("schema already present, skipping changelog");
            return Ok(false);
        }
        SchemaState::Partial { missing } if backend == DbBackend::Sqlite => {
            warn!("schema is incomplete (missing {}), completing it", missing.join(", "));
        }
        SchemaState::Partial { missing } => {
            return Err(AppError::IncompleteSchema {
                missing: missing.iter().map(|name| name.to_string()).collect(),
            });
        }
        SchemaState::Absent => {}
    }

    let stmts = statements(backend, variant)?;
    info!(
        "applying {} schema statements (backend={:?}, variant={:?})",
        stmts.len(),
        backend,
        variant
    );
    if backend == DbBackend::Sqlite {
        let txn = db.begin().await?;
        apply(&txn, &stmts).await?;
        txn.commit().await?;
    } else {
        apply(db, &stmts).await?;
    }
    Ok(true)
}

async fn apply<C: ConnectionTrait>(db: &C, stmts: &[String]) -> Result<(), AppError> {
    for stmt in stmts {
        debug!("schema: {}", stmt.lines().next().unwrap_or_default());
        db.execute_unprepared(stmt).await?;
    }
    Ok(())
}

/// True only when every table, foreign key and trigger of the changelog exists.
pub async fn schema_exists<C: ConnectionTrait>(db: &C) -> Result<bool, AppError> {
    Ok(schema_state(db).await? == SchemaState::Complete)
}

pub async fn schema_state<C: ConnectionTrait>(db: &C) -> Result<SchemaState, AppError> {
    let backend = db.get_database_backend();
    let objects = required_objects(backend)?;
    let mut missing = Vec::new();
    for object in objects {
        if !exists(db, lookup_sql(backend, object.kind), object.name).await? {
            missing.push(object.name);
        }
    }

    Ok(if missing.is_empty() {
        SchemaState::Complete
    } else if missing.len() == objects.len() {
        SchemaState::Absent
    } else {
        SchemaState::Partial { missing }
    })
}

fn required_objects(backend: DbBackend) -> Result<&'static [SchemaObject], AppError> {
    match backend {
        DbBackend::MySql => Ok(MYSQL_OBJECTS),
        DbBackend::Sqlite => Ok(SQLITE_OBJECTS),
        other => Err(AppError::Config(format!(
            "unsupported database backend: {:?}",
            other
        ))),
    }
}

// Only called for backends that passed `required_objects`.
fn lookup_sql(backend: DbBackend, kind: ObjectKind) -> &'static str {
    match (backend, kind) {
        (DbBackend::MySql, ObjectKind::Table) => {
            "SELECT table_name FROM information_schema.tables \
             WHERE table_schema = DATABASE() AND table_name = ? LIMIT 1"
        }
        (DbBackend::MySql, ObjectKind::ForeignKey) => {
            "SELECT constraint_name FROM information_schema.table_constraints \
             WHERE constraint_schema = DATABASE() AND constraint_type = 'FOREIGN KEY' \
             AND constraint_name = ? LIMIT 1"
        }
        (DbBackend::MySql, ObjectKind::Trigger) => {
            "SELECT trigger_name FROM information_schema.triggers \
             WHERE trigger_schema = DATABASE() AND trigger_name = ? LIMIT 1"
        }
        (_, ObjectKind::Trigger) => {
            "SELECT name FROM sqlite_master WHERE type = 'trigger' AND name = ? LIMIT 1"
        }
        // SQLite declares foreign keys inside CREATE TABLE.
        (_, ObjectKind::Table | ObjectKind::ForeignKey) => {
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name = ? LIMIT 1"
        }
    }
}

/// Reads which variant the live database was created with.
pub async fn detect_variant<C: ConnectionTrait>(db: &C) -> Result<SchemaVariant, AppError> {
    let backend = db.get_database_backend();
    let sql = match backend {
        DbBackend::MySql => {
            "SELECT index_name FROM information_schema.statistics \
             WHERE table_schema = DATABASE() AND table_name = 'tag' AND index_name = ? LIMIT 1"
        }
        DbBackend::Sqlite => {
            "SELECT name FROM sqlite_master WHERE type = 'index' AND name = ? LIMIT 1"
        }
        other => {
            return Err(AppError::Config(format!(
                "unsupported database backend: {:?}",
                other
            )))
        }
    };
    let found = exists(db, sql, UNIQ_TAG_NAME).await?;
    Ok(SchemaVariant::from_flag(found))
}

async fn exists<C: ConnectionTrait>(db: &C, sql: &str, name: &str) -> Result<bool, AppError> {
    let backend = db.get_database_backend();
    let stmt = Statement::from_sql_and_values(backend, sql, vec![name.into()]);
    Ok(db.query_one(stmt).await?.is_some())
}
