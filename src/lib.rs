pub mod catalog;
pub mod config;
pub mod db;
pub mod doc;
pub mod entity;
pub mod error;
pub mod schema;

pub use config::AppConfig;
pub use error::AppError;
pub use schema::SchemaVariant;
