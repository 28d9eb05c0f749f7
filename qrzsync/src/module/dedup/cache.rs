use std::collections::HashSet;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::error::{Result, SyncError};

/// Hex SHA-256 of a raw record line.
pub fn record_digest(raw: &str) -> String {
    hex::encode(Sha256::digest(raw.as_bytes()))
}

/// Append-only cache file with one `digest:raw` line per uploaded record.
///
/// The whole file is read into a digest set on open; inserts append to the
/// file first and only then update the set.
pub struct DedupCache {
    path: PathBuf,
    digests: HashSet<String>,
    read_only: bool,
}

impl DedupCache {
    /// Load the cache at `path`. A missing file is an empty cache.
    ///
    /// With `read_only` set (source truncation mode) lookups still work but
    /// [`insert`](Self::insert) never grows the file.
    pub async fn open<P: AsRef<Path>>(path: P, read_only: bool) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut digests = HashSet::new();

        match fs::read_to_string(&path).await {
            Ok(content) => {
                for line in content.lines() {
                    if let Some((digest, _)) = line.split_once(':') {
                        digests.insert(digest.to_string());
                    }
                }
                debug!("Loaded {} entries from cache {:?}", digests.len(), path);
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("Cache file does not exist: {:?}", path);
            }
            Err(source) => return Err(SyncError::CacheRead { path, source }),
        }

        Ok(Self {
            path,
            digests,
            read_only,
        })
    }

    pub fn contains(&self, raw: &str) -> bool {
        self.digests.contains(&record_digest(raw))
    }

    /// Remember `raw` as uploaded. Returns whether the file grew.
    pub async fn insert(&mut self, raw: &str) -> Result<bool> {
        if self.read_only {
            debug!("Source will be emptied; not caching record");
            return Ok(false);
        }

        let digest = record_digest(raw);
        if self.digests.contains(&digest) {
            return Ok(false);
        }

        self.append_line(&format!("{}:{}\n", digest, raw))
            .await
            .map_err(|source| SyncError::CacheWrite {
                path: self.path.clone(),
                source,
            })?;

        self.digests.insert(digest);
        Ok(true)
    }

    async fn append_line(&self, line: &str) -> std::io::Result<()> {
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        file.sync_data().await?;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.digests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.digests.is_empty()
    }

    pub fn log_summary(&self) {
        info!("Dedup cache {:?} holds {} records", self.path, self.len());
    }
}
