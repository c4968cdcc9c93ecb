use std::path::{Path, PathBuf};

use base64::{Engine, engine::general_purpose::STANDARD};

use crate::{
    error::{JukeboxError, Result},
    types::StoredAuth,
};

/// File-backed storage for the credential record and the cached account
/// identity.
///
/// The payload is serialized to JSON and base64-encoded before it hits the
/// disk. That is obfuscation against casual inspection, not encryption:
/// anyone who can read the file can decode it. Deployments that need real
/// secrecy should put the data directory on an encrypted volume or swap
/// this for an OS keychain.
pub struct TokenVault {
    dir: PathBuf,
}

impl TokenVault {
    pub fn new(dir: &Path) -> Self {
        TokenVault {
            dir: dir.to_path_buf(),
        }
    }

    /// Reads the stored record, or `None` when nobody has authorized yet.
    pub async fn load(&self) -> Result<Option<StoredAuth>> {
        let path = self.vault_path();
        let encoded = match async_fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(JukeboxError::Storage(e)),
        };

        let bytes = STANDARD.decode(encoded.trim()).map_err(|e| {
            JukeboxError::Storage(std::io::Error::new(std::io::ErrorKind::InvalidData, e))
        })?;
        let auth: StoredAuth = serde_json::from_slice(&bytes)?;
        Ok(Some(auth))
    }

    pub async fn store(&self, auth: &StoredAuth) -> Result<()> {
        let path = self.vault_path();
        if let Some(parent) = path.parent() {
            async_fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_vec(auth)?;
        async_fs::write(&path, STANDARD.encode(json)).await?;
        Ok(())
    }

    /// Removes the stored record. Already-missing files are fine; clearing
    /// is idempotent.
    pub async fn clear(&self) -> Result<()> {
        match async_fs::remove_file(self.vault_path()).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(JukeboxError::Storage(e)),
        }
    }

    fn vault_path(&self) -> PathBuf {
        self.dir.join("cache/auth.dat")
    }
}
