//! Persistence for the single alert-state record
//!
//! Stores never surface errors. A failed read yields an empty
//! [`AlertState`] and a failed write is logged and dropped, so a broken
//! backend degrades to "no baseline" instead of failing the check.
//! There is no locking or versioning: overlapping checks race and the
//! last writer wins.

use async_trait::async_trait;
use tracing::info;

use crate::config::Config;
use crate::models::AlertState;

pub mod file;
pub mod mysql;
#[cfg(test)]
pub mod memory;

pub use file::FileStateStore;
pub use mysql::MySqlStateStore;

/// Key the state record is stored under
pub const STATE_KEY: &str = "bot_state";

#[async_trait]
pub trait StateStore: Send + Sync {
    /// Load the state, or the empty state when missing or unreadable
    async fn read(&self) -> AlertState;

    /// Persist the state; failures are logged, not returned
    async fn write(&self, state: &AlertState);
}

/// MySQL when `DATABASE_URL` is set, otherwise the JSON state file
pub async fn init_store(config: &Config) -> Result<Box<dyn StateStore>, sqlx::Error> {
    match &config.database_url {
        Some(url) => {
            info!("Using MySQL state store");
            Ok(Box::new(MySqlStateStore::connect(url).await?))
        }
        None => {
            info!("Using state file {}", config.state_file);
            Ok(Box::new(FileStateStore::new(&config.state_file)))
        }
    }
}
