use std::time::Duration;

use configs::DatabaseConfig;
use mongodb::{bson::doc, options::ClientOptions, Client, Collection, Database};
use tracing::info;

use crate::song::SongDocument;

/// Build a pooled MongoDB client from config and return the configured database.
///
/// The driver connects lazily; use [`ping`] to check the server is reachable.
pub async fn connect(cfg: &DatabaseConfig) -> anyhow::Result<Database> {
    let mut options = ClientOptions::parse(&cfg.url).await?;
    options.app_name = Some(cfg.app_name.clone());
    options.max_pool_size = Some(cfg.max_pool_size);
    options.min_pool_size = Some(cfg.min_pool_size);
    options.connect_timeout = Some(Duration::from_secs(cfg.connect_timeout_secs));
    options.server_selection_timeout = Some(Duration::from_secs(cfg.server_selection_timeout_secs));

    let client = Client::with_options(options)?;
    info!(database = %cfg.name, app_name = %cfg.app_name, max_pool_size = cfg.max_pool_size, "mongodb client created");
    Ok(client.database(&cfg.name))
}

pub async fn ping(db: &Database) -> anyhow::Result<()> {
    db.run_command(doc! { "ping": 1 }).await?;
    Ok(())
}

pub fn songs_collection(db: &Database, name: &str) -> Collection<SongDocument> {
    db.collection::<SongDocument>(name)
}
