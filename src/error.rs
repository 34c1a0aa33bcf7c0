use once_cell::sync::Lazy;
use regex::Regex;
use sea_orm::DbErr;
use thiserror::Error;

use crate::catalog;

static SQLITE_UNIQUE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"UNIQUE constraint failed: (\w+\.\w+(?:, \w+\.\w+)*)").expect("valid regex")
});
static MYSQL_DUPLICATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"Duplicate entry '.*' for key '(?:\w+\.)?(\w+)'").expect("valid regex")
});
static SQLITE_CHECK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"CHECK constraint failed: (\w+)").expect("valid regex"));
static MYSQL_CHECK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Check constraint '(\w+)' is violated").expect("valid regex"));
static MYSQL_FOREIGN_KEY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"foreign key constraint fails \(.*?CONSTRAINT `(\w+)`").expect("valid regex")
});

#[derive(Debug, Error)]
pub enum AppError {
    #[error("unique constraint violated: {constraint}")]
    UniqueViolation { constraint: String },
    #[error("foreign key constraint violated: {}", .constraint.as_deref().unwrap_or("unknown"))]
    ForeignKeyViolation { constraint: Option<String> },
    #[error("check constraint violated: {constraint}")]
    CheckViolation { constraint: String },
    #[error("database error: {0}")]
    Db(#[source] DbErr),
    #[error("schema is incomplete, missing {}", .missing.join(", "))]
    IncompleteSchema { missing: Vec<String> },
    #[error("config error: {0}")]
    Config(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl AppError {
    /// Stable numeric code, used as the process exit status.
    pub fn code(&self) -> i32 {
        match self {
            Self::UniqueViolation { .. } => 10,
            Self::ForeignKeyViolation { .. } => 11,
            Self::CheckViolation { .. } => 12,
            Self::Db(_) => 20,
            Self::Config(_) => 30,
            Self::IncompleteSchema { .. } => 31,
            Self::Io(_) => 40,
            Self::Yaml(_) | Self::Json(_) => 41,
        }
    }
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        classify_message(&err.to_string()).unwrap_or(Self::Db(err))
    }
}

/// Recognises the constraint failures SQLite and MySQL report in their error text.
fn classify_message(msg: &str) -> Option<AppError> {
    if let Some(caps) = SQLITE_UNIQUE.captures(msg) {
        let columns = &caps[1];
        let constraint = sqlite_unique_name(columns).unwrap_or_else(|| columns.to_string());
        return Some(AppError::UniqueViolation { constraint });
    }
    if let Some(caps) = MYSQL_DUPLICATE.captures(msg) {
        return Some(AppError::UniqueViolation {
            constraint: caps[1].to_string(),
        });
    }
    if let Some(caps) = SQLITE_CHECK.captures(msg).or_else(|| MYSQL_CHECK.captures(msg)) {
        return Some(AppError::CheckViolation {
            constraint: caps[1].to_string(),
        });
    }
    if msg.contains("FOREIGN KEY constraint failed") {
        return Some(AppError::ForeignKeyViolation { constraint: None });
    }
    if msg.contains("foreign key constraint fails") {
        let constraint = MYSQL_FOREIGN_KEY.captures(msg).map(|caps| caps[1].to_string());
        return Some(AppError::ForeignKeyViolation { constraint });
    }
    None
}

// SQLite names the columns (`tag.name, tag.is_official`), not the constraint.
fn sqlite_unique_name(columns: &str) -> Option<String> {
    let mut table = None;
    let mut fields = Vec::new();
    for qualified in columns.split(", ") {
        let (t, column) = qualified.split_once('.')?;
        table.get_or_insert(t);
        fields.push(column);
    }
    catalog::unique_constraint_for(table?, &fields).map(str::to_string)
}
