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

//! Caching layer for computed metric results.
//!
//! Entries are keyed by `(operation, granularity, start_date, end_date, filters)`
//! and are immutable once written. A storage may drop entries at any time;
//! callers recompute on a miss.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use sha2::{Digest as _, Sha256};

use crate::{db::FilterSet, time_boundaries::Granularity};

mod file;
mod memory;

pub use file::{FileCacheStorage, FileCacheStorageError};
pub use memory::MemoryCacheStorage;

#[derive(thiserror::Error, Debug)]
pub enum CacheStorageError {
    #[error("File cache error: {0}")]
    FileError(#[from] FileCacheStorageError),

    #[error("Invalid cache URI: {0}")]
    InvalidUri(String),

    #[error("Unsupported cache URI scheme: {0}")]
    UnsupportedScheme(String),
}

/// Identity of a cached result.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub operation: &'static str,
    pub granularity: Option<Granularity>,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub filters: FilterSet,
}

impl CacheKey {
    pub fn new(operation: &'static str, start: NaiveDate, end: NaiveDate) -> Self {
        Self { operation, granularity: None, start, end, filters: FilterSet::default() }
    }

    pub fn with_granularity(mut self, granularity: Granularity) -> Self {
        self.granularity = Some(granularity);
        self
    }

    pub fn with_filters(mut self, filters: FilterSet) -> Self {
        self.filters = filters;
        self
    }
}

/// Trait for caching serialized metric results.
#[async_trait]
pub trait CacheStorage: Send + Sync {
    /// Get the cached bytes for a key, if present.
    async fn get(&self, key: &CacheKey) -> Result<Option<Vec<u8>>, CacheStorageError>;

    /// Store bytes for a key. An existing entry is left untouched.
    async fn put(&self, key: &CacheKey, value: &[u8]) -> Result<(), CacheStorageError>;
}

/// Generate a storage key string from a cache key.
pub fn generate_cache_key(key: &CacheKey) -> String {
    let granularity = key.granularity.map_or_else(|| "all".to_string(), |g| g.to_string());

    let mut hasher = Sha256::new();
    match key.filters.succeeded {
        None => hasher.update(b"succeeded=*"),
        Some(true) => hasher.update(b"succeeded=true"),
        Some(false) => hasher.update(b"succeeded=false"),
    }
    let filters_hash = hex::encode(hasher.finalize());

    format!("{}/{}_{}_{}_{}", key.operation, granularity, key.start, key.end, filters_hash)
}

/// Create a cache storage instance from a URI.
///
/// Supported URI schemes:
/// - `memory://` - Process local in-memory cache
/// - `file://path/to/cache` - Local file system cache
pub fn cache_storage_from_uri(uri: &str) -> Result<Arc<dyn CacheStorage>, CacheStorageError> {
    let url = uri.parse::<url::Url>().map_err(|e| {
        CacheStorageError::InvalidUri(format!("Failed to parse URI '{}': {}", uri, e))
    })?;

    match url.scheme() {
        "memory" => Ok(Arc::new(MemoryCacheStorage::new())),
        "file" => {
            let storage = FileCacheStorage::new(url.path())?;
            Ok(Arc::new(storage))
        }
        scheme => Err(CacheStorageError::UnsupportedScheme(scheme.to_string())),
    }
}
