//! Local Shard Persistence
//!
//! [`ShardStore`] owns one node's storage root and implements the four
//! shard-level operations. Concurrent requests for the same shard name are
//! not ordered relative to one another; the last write wins.

use crate::error::{Error, Result};
use crate::protocol::types::DeleteOutcome;
use std::path::{Path, PathBuf};

pub struct ShardStore {
    root: PathBuf,
}

impl ShardStore {
    /// Opens (creating if needed) the port-keyed storage root
    /// `<base>/<port>/`.
    pub async fn open(base: impl AsRef<Path>, port: u16) -> Result<Self> {
        let root = base.as_ref().join(port.to_string());
        tokio::fs::create_dir_all(&root)
            .await
            .map_err(Error::Storage)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Persists a shard, overwriting any existing shard with that exact
    /// name.
    pub async fn store(&self, name: &str, bytes: &[u8]) -> Result<()> {
        let path = self.resolve(name)?;
        tokio::fs::write(&path, bytes).await.map_err(Error::Storage)
    }

    /// Exact-name lookup; no pattern matching.
    pub async fn fetch(&self, name: &str) -> Result<Option<Vec<u8>>> {
        let path = self.resolve(name)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::Storage(e)),
        }
    }

    /// Deletes every stored shard whose name starts with `base`.
    ///
    /// This is a raw prefix match, not a match against the shard-name
    /// template: a name that merely shares the prefix (`report.txt.bak`
    /// for base `report.txt`) is deleted too. An unreadable root degrades
    /// to `NoneFound`.
    pub async fn delete_by_prefix(&self, base: &str) -> DeleteOutcome {
        let mut dir = match tokio::fs::read_dir(&self.root).await {
            Ok(dir) => dir,
            Err(e) => {
                tracing::warn!("cannot list storage root {}: {}", self.root.display(), e);
                return DeleteOutcome::NoneFound;
            }
        };

        let mut found = false;
        let mut failed = false;
        loop {
            let entry = match dir.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(e) => {
                    tracing::warn!("error while scanning {}: {}", self.root.display(), e);
                    break;
                }
            };
            let name = entry.file_name().to_string_lossy().into_owned();
            if !name.starts_with(base) {
                continue;
            }
            found = true;
            match tokio::fs::remove_file(entry.path()).await {
                Ok(()) => tracing::info!("deleted shard {}", name),
                Err(e) => {
                    tracing::error!("failed to delete shard {}: {}", name, e);
                    failed = true;
                }
            }
        }

        match (found, failed) {
            (false, _) => DeleteOutcome::NoneFound,
            (true, false) => DeleteOutcome::AllDeleted,
            (true, true) => DeleteOutcome::PartialFailure,
        }
    }

    /// Raw names of every shard in the root. Callers see `name.partN`
    /// entries, not logical file names. An unreadable root degrades to an
    /// empty listing.
    pub async fn list(&self) -> Vec<String> {
        let mut dir = match tokio::fs::read_dir(&self.root).await {
            Ok(dir) => dir,
            Err(e) => {
                tracing::warn!("cannot list storage root {}: {}", self.root.display(), e);
                return Vec::new();
            }
        };

        let mut names = Vec::new();
        while let Ok(Some(entry)) = dir.next_entry().await {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        names
    }

    // Shard names must stay inside the flat root.
    fn resolve(&self, name: &str) -> Result<PathBuf> {
        if name.is_empty()
            || name.contains('/')
            || name.contains('\\')
            || name.contains("..")
        {
            return Err(Error::Protocol(format!("invalid shard name {:?}", name)));
        }
        Ok(self.root.join(name))
    }
}
