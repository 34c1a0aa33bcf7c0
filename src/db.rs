use log::{info, warn, LevelFilter};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection};
use std::fs::{self, OpenOptions};
use std::path::Path;

use crate::config::AppConfig;
use crate::error::AppError;
use crate::schema::{detect_variant, init_schema};

/// Connects and makes sure the schema exists in the configured variant.
pub async fn connect_db(config: &AppConfig) -> Result<DatabaseConnection, AppError> {
    let url = config.database_url();
    ensure_sqlite_path(&url)?;

    let mut opts = ConnectOptions::new(url);
    opts.sqlx_logging_level(LevelFilter::Debug);
    if let Some(max) = config.max_connections {
        opts.max_connections(max);
    }
    let db = Database::connect(opts).await?;
    info!("connected to {:?} database", db.get_database_backend());

    if init_schema(&db, config.schema_variant).await? {
        info!("schema created with variant {:?}", config.schema_variant);
    }
    let detected = detect_variant(&db).await?;
    if detected != config.schema_variant {
        warn!(
            "database was created with variant {:?} but {:?} is configured",
            detected, config.schema_variant
        );
    }
    Ok(db)
}

/// SQLite will not create a missing file or directory on its own.
fn ensure_sqlite_path(url: &str) -> Result<(), AppError> {
    let Some(path) = sqlite_file_path(url) else {
        return Ok(());
    };
    let path = Path::new(path);
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    OpenOptions::new().create(true).append(true).open(path)?;
    Ok(())
}

fn sqlite_file_path(url: &str) -> Option<&str> {
    let raw = url
        .strip_prefix("sqlite://")
        .or_else(|| url.strip_prefix("sqlite:"))?;
    let path = raw.split('?').next().unwrap_or_default();
    if path.is_empty() || path == ":memory:" || url.contains("mode=memory") {
        return None;
    }
    Some(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sqlite_file_path_skips_memory_and_other_backends() {
        assert_eq!(sqlite_file_path("sqlite:///opt/db.sqlite"), Some("/opt/db.sqlite"));
        assert_eq!(sqlite_file_path("sqlite:data.db?mode=rwc"), Some("data.db"));
        assert_eq!(sqlite_file_path("sqlite::memory:"), None);
        assert_eq!(sqlite_file_path("sqlite://shared?mode=memory&cache=shared"), None);
        assert_eq!(sqlite_file_path("mysql://root@localhost/memo"), None);
    }

    #[test]
    fn ensure_sqlite_path_creates_parent_and_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("nested/deeper/memo.sqlite");
        let url = format!("sqlite://{}", file.display());
        ensure_sqlite_path(&url).unwrap();
        assert!(file.exists());
    }
}
