//! Schema documentation export: one file describing every table.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use log::info;

use crate::catalog::{self, TableDoc};
use crate::error::AppError;
use crate::schema::SchemaVariant;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DocFormat {
    #[default]
    Yaml,
    Json,
}

impl DocFormat {
    pub fn file_name(&self) -> &'static str {
        match self {
            Self::Yaml => "schema.yml",
            Self::Json => "schema.json",
        }
    }
}

impl FromStr for DocFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "yaml" | "yml" => Ok(Self::Yaml),
            "json" => Ok(Self::Json),
            other => Err(AppError::Config(format!("unknown document format: {}", other))),
        }
    }
}

pub fn render(tables: &[TableDoc], format: DocFormat) -> Result<String, AppError> {
    match format {
        DocFormat::Yaml => Ok(serde_yaml::to_string(tables)?),
        DocFormat::Json => Ok(serde_json::to_string_pretty(tables)?),
    }
}

/// Writes the document for `variant` into `dir`, creating it if needed.
pub async fn write_docs(
    dir: impl AsRef<Path>,
    variant: SchemaVariant,
    format: DocFormat,
) -> Result<PathBuf, AppError> {
    let dir = dir.as_ref();
    tokio::fs::create_dir_all(dir).await?;

    let path = dir.join(format.file_name());
    let body = render(&catalog::tables(variant), format)?;
    tokio::fs::write(&path, body).await?;
    info!("schema document written to {}", path.display());
    Ok(path)
}
