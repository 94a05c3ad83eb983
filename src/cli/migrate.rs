use anyhow::{Context, Result};

use crate::core::AppConfig;
use crate::core::db::{async_db, initialize_db};

pub async fn run() -> Result<()> {
    let config = AppConfig::from_env()?;

    println!("Migrating db...");
    let db = async_db(&config.database_url).await?;
    db.call(|conn| {
        initialize_db(conn)?;
        Ok(())
    })
    .await
    .context("DB migration failed")?;
    println!("Finished migrating db");

    Ok(())
}
