use log::{error, info};
use memo_schema::db::connect_db;
use memo_schema::doc::write_docs;
use memo_schema::{AppConfig, AppError};

#[actix_rt::main]
async fn main() {
    dotenvy::dotenv().ok();
    env_logger::init();
    let config = AppConfig::from_env();
    if let Err(err) = run(&config).await {
        error!("memo-schema failed: {}", err);
        std::process::exit(err.code());
    }
}

async fn run(config: &AppConfig) -> Result<(), AppError> {
    let _db = connect_db(config).await?;
    info!("schema ready");

    if let Some(dir) = &config.doc_output_dir {
        write_docs(dir, config.schema_variant, config.doc_format).await?;
    }
    Ok(())
}
