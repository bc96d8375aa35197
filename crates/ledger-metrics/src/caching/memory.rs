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

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{generate_cache_key, CacheKey, CacheStorage, CacheStorageError};

/// Process local cache storage.
#[derive(Debug, Default)]
pub struct MemoryCacheStorage {
    entries: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryCacheStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CacheStorage for MemoryCacheStorage {
    async fn get(&self, key: &CacheKey) -> Result<Option<Vec<u8>>, CacheStorageError> {
        Ok(self.entries.read().await.get(&generate_cache_key(key)).cloned())
    }

    async fn put(&self, key: &CacheKey, value: &[u8]) -> Result<(), CacheStorageError> {
        self.entries.write().await.entry(generate_cache_key(key)).or_insert_with(|| value.to_vec());
        Ok(())
    }
}
