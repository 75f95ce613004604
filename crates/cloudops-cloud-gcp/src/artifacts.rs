//! Intermediate documents written during a run
//!
//! Files are removed by [`ArtifactDir::cleanup`] once a run succeeds. A run
//! that fails leaves them in place for inspection.

use crate::error::{GcpError, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use tokio::fs;

pub struct ArtifactDir {
    dir: PathBuf,
    written: Vec<PathBuf>,
}

impl ArtifactDir {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            written: Vec::new(),
        }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    pub async fn write_json<T: Serialize>(&mut self, name: &str, value: &T) -> Result<PathBuf> {
        if !self.dir.exists() {
            fs::create_dir_all(&self.dir).await?;
            tracing::debug!("Created artifact directory: {}", self.dir.display());
        }

        let path = self.path(name);
        let content = serde_json::to_string_pretty(value)?;
        fs::write(&path, content).await?;
        tracing::debug!("Wrote {}", path.display());

        if !self.written.contains(&path) {
            self.written.push(path.clone());
        }
        Ok(path)
    }

    pub async fn read_json<T: DeserializeOwned>(&self, name: &str) -> Result<T> {
        let path = self.path(name);
        let content = fs::read_to_string(&path)
            .await
            .map_err(|e| GcpError::Artifact {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Remove every file this instance wrote, then the directory if empty
    pub async fn cleanup(&mut self) -> Result<()> {
        for path in self.written.drain(..) {
            if path.exists() {
                fs::remove_file(&path).await?;
                tracing::debug!("Removed {}", path.display());
            }
        }

        // Only succeeds when nothing else lives there.
        if fs::remove_dir(&self.dir).await.is_ok() {
            tracing::debug!("Removed artifact directory: {}", self.dir.display());
        }
        Ok(())
    }
}
