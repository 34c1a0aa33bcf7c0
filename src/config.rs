use std::env;

use log::warn;

use crate::doc::DocFormat;
use crate::schema::SchemaVariant;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub sqlite_path: String,
    pub database_url: Option<String>,
    pub schema_variant: SchemaVariant,
    pub max_connections: Option<u32>,
    pub doc_output_dir: Option<String>,
    pub doc_format: DocFormat,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let sqlite_path = lookup("SQLITE_PATH")
            .unwrap_or_else(|| "/opt/memo-schema/data.sqlite".to_string());
        let database_url = lookup("DATABASE_URL").filter(|v| !v.trim().is_empty());

        let unique_tag_name = match lookup("TAG_NAME_UNIQUE") {
            Some(raw) => parse_flag(&raw).unwrap_or_else(|| {
                warn!("TAG_NAME_UNIQUE={} is not a boolean, keeping the unique index", raw);
                true
            }),
            None => true,
        };

        let max_connections = lookup("DB_MAX_CONNECTIONS").and_then(|raw| {
            match raw.trim().parse::<u32>() {
                Ok(max) if max > 0 => Some(max),
                _ => {
                    warn!("DB_MAX_CONNECTIONS={} is not a positive integer, using the pool default", raw);
                    None
                }
            }
        });
        let doc_output_dir = lookup("SCHEMA_DOC_DIR").filter(|v| !v.trim().is_empty());

        let doc_format = match lookup("SCHEMA_DOC_FORMAT") {
            Some(raw) => raw.parse::<DocFormat>().unwrap_or_else(|_| {
                warn!("unknown SCHEMA_DOC_FORMAT={}, falling back to yaml", raw);
                DocFormat::Yaml
            }),
            None => DocFormat::Yaml,
        };

        Self {
            sqlite_path,
            database_url,
            schema_variant: SchemaVariant::from_flag(unique_tag_name),
            max_connections,
            doc_output_dir,
            doc_format,
        }
    }

    /// Local SQLite file with every other setting at its default.
    pub fn sqlite(path: impl Into<String>) -> Self {
        Self {
            sqlite_path: path.into(),
            database_url: None,
            schema_variant: SchemaVariant::default(),
            max_connections: None,
            doc_output_dir: None,
            doc_format: DocFormat::Yaml,
        }
    }

    pub fn database_url(&self) -> String {
        if let Some(url) = &self.database_url {
            return url.clone();
        }

        let path = self.sqlite_path.trim();
        if path.starts_with("sqlite:") {
            return path.to_string();
        }
        format!("sqlite://{}", path)
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
