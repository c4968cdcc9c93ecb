use std::path::{Path, PathBuf};

use crate::{
    error::{JukeboxError, Result},
    types::SyncLogEntry,
};

/// Append-only audit trail of playlist mutations, sync runs and token
/// refreshes. Entries are never rewritten or removed by the core.
pub struct SyncLogManager {
    dir: PathBuf,
    entries: Vec<SyncLogEntry>,
}

impl SyncLogManager {
    pub async fn open(dir: &Path) -> Result<Self> {
        let path = dir.join("sync_log.json");
        let entries = match async_fs::read_to_string(&path).await {
            Ok(content) => serde_json::from_str(&content)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(JukeboxError::Storage(e)),
        };

        Ok(SyncLogManager {
            dir: dir.to_path_buf(),
            entries,
        })
    }

    pub async fn append(&mut self, entry: SyncLogEntry) -> Result<()> {
        self.entries.push(entry);
        self.persist().await
    }

    /// Appends a batch of entries with a single write. Used by the sync
    /// engine, which can produce one entry per track in a run.
    pub async fn append_all(&mut self, entries: Vec<SyncLogEntry>) -> Result<()> {
        if entries.is_empty() {
            return Ok(());
        }
        self.entries.extend(entries);
        self.persist().await
    }

    /// The most recent `limit` entries, newest first.
    pub fn recent(&self, limit: usize) -> Vec<SyncLogEntry> {
        self.entries.iter().rev().take(limit).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    async fn persist(&self) -> Result<()> {
        let path = self.get_path();
        if let Some(parent) = path.parent() {
            async_fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_string_pretty(&self.entries)?;
        async_fs::write(path, json).await?;
        Ok(())
    }

    fn get_path(&self) -> PathBuf {
        self.dir.join("sync_log.json")
    }
}
