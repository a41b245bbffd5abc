use std::time::Duration;

use anyhow::Result;
use moka::future::Cache;
use sea_orm::Database;

use crate::schemas::AppState;

/// Connects to the given database and assembles the shared application
/// state: the connection plus the dashboard report cache.
pub async fn initialize_app_state_with_url(database_url: &str) -> Result<AppState> {
    tracing::info!("Connecting to database: {}", database_url);
    let db = Database::connect(database_url).await?;

    // Report reads are cached briefly; every ledger write invalidates.
    let cache = Cache::builder()
        .max_capacity(1000)
        .time_to_live(Duration::from_secs(300)) // 5 minutes
        .build();

    Ok(AppState { db, cache })
}
