// Copyright 2026 Boundless Foundation, Inc.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! File-based cache storage implementation.

use std::{
    io::Write as _,
    path::{Path, PathBuf},
};

use async_trait::async_trait;

use super::{generate_cache_key, CacheKey, CacheStorage, CacheStorageError};

#[derive(thiserror::Error, Debug)]
pub enum FileCacheStorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cache writer task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// File-based cache storage that stores each serialized result as a JSON file.
#[derive(Clone, Debug)]
pub struct FileCacheStorage {
    base_path: PathBuf,
}

impl FileCacheStorage {
    /// Create a new file cache storage with the given base path.
    pub fn new(path: impl AsRef<Path>) -> Result<Self, FileCacheStorageError> {
        let base_path = path.as_ref().join("ledger-metrics-cache");
        Ok(Self { base_path })
    }

    /// Get the full path for a cache entry.
    fn entry_path(&self, key: &str) -> PathBuf {
        self.base_path.join(format!("{}.json", key))
    }

    /// Ensure the directory for a cache file exists.
    async fn ensure_dir(&self, path: &Path) -> Result<(), FileCacheStorageError> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl CacheStorage for FileCacheStorage {
    async fn get(&self, key: &CacheKey) -> Result<Option<Vec<u8>>, CacheStorageError> {
        let path = self.entry_path(&generate_cache_key(key));
        tracing::debug!("Getting cached result from {}", path.display());

        match tokio::fs::read(&path).await {
            Ok(data) => Ok(Some(data)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(FileCacheStorageError::from(err).into()),
        }
    }

    async fn put(&self, key: &CacheKey, value: &[u8]) -> Result<(), CacheStorageError> {
        let path = self.entry_path(&generate_cache_key(key));
        if tokio::fs::try_exists(&path).await.map_err(FileCacheStorageError::from)? {
            return Ok(());
        }
        self.ensure_dir(&path).await?;

        let value = value.to_vec();
        let entry_path = path.clone();
        let written = tokio::task::spawn_blocking(move || persist_new(&entry_path, &value))
            .await
            .map_err(FileCacheStorageError::from)??;

        if written {
            tracing::debug!("Cached entry to {}", path.display());
        }
        Ok(())
    }
}

/// Writes `value` to a private temporary file next to `path` and links it into
/// place only if `path` does not exist yet. Returns whether this call created
/// the entry.
fn persist_new(path: &Path, value: &[u8]) -> Result<bool, FileCacheStorageError> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut tmp = tempfile::Builder::new().prefix(".entry-").suffix(".tmp").tempfile_in(dir)?;
    tmp.write_all(value)?;

    match tmp.persist_noclobber(path) {
        Ok(_) => Ok(true),
        Err(err) if err.error.kind() == std::io::ErrorKind::AlreadyExists => Ok(false),
        Err(err) => Err(err.error.into()),
    }
}
