use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, error, warn};

use super::StateStore;
use crate::models::AlertState;

/// JSON file store; writes land in `<file>.tmp` and are renamed over the target
pub struct FileStateStore {
    path: PathBuf,
}

impl FileStateStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".tmp");
        PathBuf::from(name)
    }

    async fn try_write(&self, state: &AlertState) -> Result<(), String> {
        let json = serde_json::to_vec_pretty(state)
            .map_err(|e| format!("Failed to serialize state: {}", e))?;
        let tmp = self.tmp_path();
        tokio::fs::write(&tmp, json)
            .await
            .map_err(|e| format!("Failed to write {}: {}", tmp.display(), e))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| format!("Failed to replace {}: {}", self.path.display(), e))
    }
}

#[async_trait]
impl StateStore for FileStateStore {
    async fn read(&self) -> AlertState {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No state file at {}, starting fresh", self.path.display());
                return AlertState::default();
            }
            Err(e) => {
                error!("Error reading state from {}: {}", self.path.display(), e);
                return AlertState::default();
            }
        };

        serde_json::from_str(&contents).unwrap_or_else(|e| {
            warn!("State file {} is not valid JSON ({}), starting fresh", self.path.display(), e);
            AlertState::default()
        })
    }

    async fn write(&self, state: &AlertState) {
        if let Err(e) = self.try_write(state).await {
            error!("Error saving state: {}", e);
        }
    }
}
